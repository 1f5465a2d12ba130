use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

pub const DAMPING_EPSILON: f64 = 0.001;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawSpringParameters")]
pub struct SpringParameters {
    damping: f64,
    stiffness: f64,
    mass: f64,
    initial_velocity: f64,
    tolerance: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSpringParameters {
    damping: f64,
    stiffness: f64,
    mass: f64,
    #[serde(default)]
    initial_velocity: f64,
    #[serde(default = "default_tolerance")]
    tolerance: f64,
}

fn default_tolerance() -> f64 {
    SpringParameters::DEFAULT.tolerance
}

impl TryFrom<RawSpringParameters> for SpringParameters {
    type Error = SpringError;

    fn try_from(raw: RawSpringParameters) -> Result<Self, Self::Error> {
        Self::new(
            raw.damping,
            raw.stiffness,
            raw.mass,
            raw.initial_velocity,
            raw.tolerance,
        )
    }
}

impl SpringParameters {
    pub const DEFAULT: Self = Self::preset_triple(26.0, 160.0, 1.0);
    pub const BOUNCY: Self = Self::preset_triple(10.0, 100.0, 1.0);
    pub const GENTLE: Self = Self::preset_triple(30.0, 120.0, 1.0);
    pub const WOBBLY: Self = Self::preset_triple(8.0, 180.0, 1.0);
    pub const STIFF: Self = Self::preset_triple(26.0, 210.0, 1.0);
    pub const SLOW: Self = Self::preset_triple(28.0, 80.0, 1.0);

    const fn preset_triple(damping: f64, stiffness: f64, mass: f64) -> Self {
        Self {
            damping,
            stiffness,
            mass,
            initial_velocity: 0.0,
            tolerance: 0.01,
        }
    }

    pub fn new(
        damping: f64,
        stiffness: f64,
        mass: f64,
        initial_velocity: f64,
        tolerance: f64,
    ) -> Result<Self, SpringError> {
        if !(damping.is_finite() && damping >= 0.0) {
            return Err(SpringError::validation(
                "damping",
                format!("must be a finite value >= 0, got {damping}"),
            ));
        }
        if !(stiffness.is_finite() && stiffness > 0.0) {
            return Err(SpringError::validation(
                "stiffness",
                format!("must be a finite value > 0, got {stiffness}"),
            ));
        }
        if !(mass.is_finite() && mass > 0.0) {
            return Err(SpringError::validation(
                "mass",
                format!("must be a finite value > 0, got {mass}"),
            ));
        }
        if !initial_velocity.is_finite() {
            return Err(SpringError::validation(
                "initialVelocity",
                format!("must be finite, got {initial_velocity}"),
            ));
        }
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(SpringError::validation(
                "tolerance",
                format!("must be a finite value > 0, got {tolerance}"),
            ));
        }
        Ok(Self {
            damping,
            stiffness,
            mass,
            initial_velocity,
            tolerance,
        })
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn initial_velocity(&self) -> f64 {
        self.initial_velocity
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn with_overrides(&self, patch: &ParametersPatch) -> Result<Self, SpringError> {
        Self::new(
            patch.damping.unwrap_or(self.damping),
            patch.stiffness.unwrap_or(self.stiffness),
            patch.mass.unwrap_or(self.mass),
            patch.initial_velocity.unwrap_or(self.initial_velocity),
            patch.tolerance.unwrap_or(self.tolerance),
        )
    }

    pub fn with_initial_velocity(&self, initial_velocity: f64) -> Result<Self, SpringError> {
        self.with_overrides(&ParametersPatch {
            initial_velocity: Some(initial_velocity),
            ..ParametersPatch::default()
        })
    }

    pub fn with_tolerance(&self, tolerance: f64) -> Result<Self, SpringError> {
        self.with_overrides(&ParametersPatch {
            tolerance: Some(tolerance),
            ..ParametersPatch::default()
        })
    }

    pub fn critical_damping(&self) -> f64 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    pub fn natural_frequency(&self) -> f64 {
        (self.stiffness / self.mass).sqrt()
    }

    pub fn damping_ratio(&self) -> f64 {
        self.damping / self.critical_damping()
    }

    pub fn damping_kind(&self) -> DampingKind {
        let critical = self.critical_damping();
        if (self.damping - critical).abs() <= DAMPING_EPSILON {
            DampingKind::Critical
        } else if self.damping > critical {
            DampingKind::Over
        } else {
            DampingKind::Under
        }
    }

    pub fn is_critically_damped(&self) -> bool {
        self.damping_kind() == DampingKind::Critical
    }

    pub fn is_overdamped(&self) -> bool {
        self.damping_kind() == DampingKind::Over
    }

    pub fn is_underdamped(&self) -> bool {
        self.damping_kind() == DampingKind::Under
    }

    fn bits(&self) -> [u64; 5] {
        [
            self.damping.to_bits(),
            self.stiffness.to_bits(),
            self.mass.to_bits(),
            self.initial_velocity.to_bits(),
            self.tolerance.to_bits(),
        ]
    }
}

impl Default for SpringParameters {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// Compared by representation so equal values always hash equally.
impl PartialEq for SpringParameters {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for SpringParameters {}

impl Hash for SpringParameters {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DampingKind {
    Critical,
    Over,
    Under,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpringPreset {
    Bouncy,
    Gentle,
    Wobbly,
    Stiff,
    Slow,
}

impl SpringPreset {
    pub const ALL: [SpringPreset; 5] = [
        SpringPreset::Bouncy,
        SpringPreset::Gentle,
        SpringPreset::Wobbly,
        SpringPreset::Stiff,
        SpringPreset::Slow,
    ];

    pub fn parameters(self) -> SpringParameters {
        match self {
            SpringPreset::Bouncy => SpringParameters::BOUNCY,
            SpringPreset::Gentle => SpringParameters::GENTLE,
            SpringPreset::Wobbly => SpringParameters::WOBBLY,
            SpringPreset::Stiff => SpringParameters::STIFF,
            SpringPreset::Slow => SpringParameters::SLOW,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpringPreset::Bouncy => "bouncy",
            SpringPreset::Gentle => "gentle",
            SpringPreset::Wobbly => "wobbly",
            SpringPreset::Stiff => "stiff",
            SpringPreset::Slow => "slow",
        }
    }
}

impl fmt::Display for SpringPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpringPreset {
    type Err = SpringError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                SpringError::validation("preset", format!("unknown spring preset `{wanted}`"))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParametersPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damping: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stiffness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_velocity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
}

impl ParametersPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpringError {
    #[error("invalid spring parameter `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("animation controller was disposed, `{operation}` is not allowed")]
    Disposed { operation: &'static str },
}

impl SpringError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn disposed(operation: &'static str) -> Self {
        Self::Disposed { operation }
    }

    pub fn code(&self) -> &'static str {
        match self {
            SpringError::Validation { .. } => "INVALID_SPRING_PARAMETERS",
            SpringError::Disposed { .. } => "CONTROLLER_DISPOSED",
        }
    }

    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            SpringError::Validation { .. } => Some(
                "use damping >= 0 and positive stiffness, mass and tolerance",
            ),
            SpringError::Disposed { .. } => {
                Some("create a new controller instead of reusing a disposed one")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DampingKind, ParametersPatch, SpringError, SpringParameters, SpringPreset};
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(params: &SpringParameters) -> u64 {
        let mut hasher = DefaultHasher::new();
        params.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn default_parameters_match_documented_constants() {
        let params = SpringParameters::default();
        assert_eq!(params.damping(), 26.0);
        assert_eq!(params.stiffness(), 160.0);
        assert_eq!(params.mass(), 1.0);
        assert_eq!(params.initial_velocity(), 0.0);
        assert_eq!(params.tolerance(), 0.01);
    }

    #[test]
    fn presets_match_literal_table() {
        let expected = [
            (SpringPreset::Bouncy, 10.0, 100.0),
            (SpringPreset::Gentle, 30.0, 120.0),
            (SpringPreset::Wobbly, 8.0, 180.0),
            (SpringPreset::Stiff, 26.0, 210.0),
            (SpringPreset::Slow, 28.0, 80.0),
        ];
        for (preset, damping, stiffness) in expected {
            let params = preset.parameters();
            assert_eq!(params.damping(), damping, "{preset}");
            assert_eq!(params.stiffness(), stiffness, "{preset}");
            assert_eq!(params.mass(), 1.0, "{preset}");
            assert_eq!(params.tolerance(), 0.01, "{preset}");
        }
    }

    #[test]
    fn construction_rejects_out_of_range_values() {
        assert!(SpringParameters::new(-0.1, 100.0, 1.0, 0.0, 0.01).is_err());
        assert!(SpringParameters::new(10.0, 0.0, 1.0, 0.0, 0.01).is_err());
        assert!(SpringParameters::new(10.0, 100.0, 0.0, 0.0, 0.01).is_err());
        assert!(SpringParameters::new(10.0, 100.0, 1.0, 0.0, 0.0).is_err());
        assert!(SpringParameters::new(10.0, 100.0, 1.0, f64::NAN, 0.01).is_err());
        assert!(SpringParameters::new(f64::NAN, 100.0, 1.0, 0.0, 0.01).is_err());
        assert!(SpringParameters::new(0.0, 100.0, 1.0, -5.0, 0.01).is_ok());
    }

    #[test]
    fn validation_error_names_the_field() {
        let error = SpringParameters::new(10.0, -1.0, 1.0, 0.0, 0.01).unwrap_err();
        match &error {
            SpringError::Validation { field, .. } => assert_eq!(*field, "stiffness"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(error.code(), "INVALID_SPRING_PARAMETERS");
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn overrides_return_new_instance_and_keep_original() {
        let base = SpringParameters::BOUNCY;
        let patched = base
            .with_overrides(&ParametersPatch {
                stiffness: Some(300.0),
                ..ParametersPatch::default()
            })
            .unwrap();
        assert_eq!(patched.stiffness(), 300.0);
        assert_eq!(patched.damping(), 10.0);
        assert_eq!(base.stiffness(), 100.0);

        let invalid = base.with_overrides(&ParametersPatch {
            mass: Some(-2.0),
            ..ParametersPatch::default()
        });
        assert!(invalid.is_err());
    }

    #[test]
    fn equality_and_hash_are_structural() {
        let a = SpringParameters::new(10.0, 100.0, 1.0, 0.0, 0.01).unwrap();
        let b = SpringParameters::new(10.0, 100.0, 1.0, 0.0, 0.01).unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(a, SpringParameters::BOUNCY);

        let variants = [
            a.with_overrides(&ParametersPatch {
                damping: Some(11.0),
                ..ParametersPatch::default()
            }),
            a.with_overrides(&ParametersPatch {
                stiffness: Some(101.0),
                ..ParametersPatch::default()
            }),
            a.with_overrides(&ParametersPatch {
                mass: Some(2.0),
                ..ParametersPatch::default()
            }),
            a.with_initial_velocity(1.0),
            a.with_tolerance(0.02),
        ];
        for variant in variants {
            assert_ne!(a, variant.unwrap());
        }
    }

    #[test]
    fn damping_classification_is_exclusive() {
        for preset in SpringPreset::ALL {
            let params = preset.parameters();
            let flags = [
                params.is_critically_damped(),
                params.is_overdamped(),
                params.is_underdamped(),
            ];
            assert_eq!(flags.iter().filter(|flag| **flag).count(), 1, "{preset}");
        }
        assert_eq!(SpringParameters::BOUNCY.damping_kind(), DampingKind::Under);
    }

    #[test]
    fn damping_classification_boundaries() {
        // stiffness 100, mass 1 -> critical damping 20
        let critical = SpringParameters::new(20.0, 100.0, 1.0, 0.0, 0.01).unwrap();
        assert!(critical.is_critically_damped());
        let near = SpringParameters::new(20.0005, 100.0, 1.0, 0.0, 0.01).unwrap();
        assert!(near.is_critically_damped());
        let over = SpringParameters::new(20.01, 100.0, 1.0, 0.0, 0.01).unwrap();
        assert!(over.is_overdamped());
        let under = SpringParameters::new(19.99, 100.0, 1.0, 0.0, 0.01).unwrap();
        assert!(under.is_underdamped());
    }

    #[test]
    fn derived_diagnostics() {
        let params = SpringParameters::new(10.0, 100.0, 4.0, 0.0, 0.01).unwrap();
        assert!((params.critical_damping() - 40.0).abs() < 1e-12);
        assert!((params.natural_frequency() - 5.0).abs() < 1e-12);
        assert!((params.damping_ratio() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn preset_parses_from_name() {
        assert_eq!("wobbly".parse::<SpringPreset>().unwrap(), SpringPreset::Wobbly);
        assert_eq!(" Stiff ".parse::<SpringPreset>().unwrap(), SpringPreset::Stiff);
        assert!("jelly".parse::<SpringPreset>().is_err());
    }

    #[test]
    fn deserialization_validates_and_fills_defaults() {
        let params: SpringParameters =
            serde_json::from_str(r#"{"damping":8.0,"stiffness":180.0,"mass":1.0}"#).unwrap();
        assert_eq!(params, SpringParameters::WOBBLY);

        let invalid = serde_json::from_str::<SpringParameters>(
            r#"{"damping":8.0,"stiffness":-1.0,"mass":1.0}"#,
        );
        assert!(invalid.is_err());

        let raw = serde_json::to_value(SpringParameters::GENTLE).unwrap();
        assert_eq!(raw["initialVelocity"], 0.0);
    }
}
