use crate::domain::models::{ParametersPatch, SpringError, SpringParameters, SpringPreset};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

pub const SETTINGS_PATH_ENV: &str = "SPRING_MOTION_SETTINGS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionSettings {
    #[serde(default = "current_schema_version")]
    pub schema_version: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<SpringPreset>,
    #[serde(default, skip_serializing_if = "ParametersPatch::is_empty")]
    pub overrides: ParametersPatch,
}

fn current_schema_version() -> u8 {
    CURRENT_SCHEMA_VERSION
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            preset: None,
            overrides: ParametersPatch::default(),
        }
    }
}

impl MotionSettings {
    pub fn from_preset(preset: SpringPreset) -> Self {
        Self {
            preset: Some(preset),
            ..Self::default()
        }
    }

    pub fn resolve(&self) -> Result<SpringParameters, SpringError> {
        let base = self
            .preset
            .map(SpringPreset::parameters)
            .unwrap_or_default();
        base.with_overrides(&self.overrides)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read motion settings {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write motion settings {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse motion settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("schemaVersion {found} is newer than supported {supported}")]
    UnsupportedSchema { found: u64, supported: u8 },
    #[error(transparent)]
    Invalid(#[from] SpringError),
}

impl SettingsError {
    pub fn code(&self) -> &'static str {
        match self {
            SettingsError::Read { .. } => "SETTINGS_READ_FAIL",
            SettingsError::Write { .. } => "SETTINGS_WRITE_FAIL",
            SettingsError::Parse(_) => "SETTINGS_PARSE_FAIL",
            SettingsError::UnsupportedSchema { .. } => "UNSUPPORTED_SCHEMA",
            SettingsError::Invalid(error) => error.code(),
        }
    }
}

pub fn load_motion_settings(path: &Path) -> Result<MotionSettings, SettingsError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&raw)?;
    let schema_version = value
        .get("schemaVersion")
        .and_then(Value::as_u64)
        .unwrap_or(u64::from(CURRENT_SCHEMA_VERSION));
    if schema_version > u64::from(CURRENT_SCHEMA_VERSION) {
        return Err(SettingsError::UnsupportedSchema {
            found: schema_version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }

    let mut settings: MotionSettings = serde_json::from_value(value)?;
    settings.schema_version = CURRENT_SCHEMA_VERSION;
    settings.resolve()?;
    Ok(settings)
}

pub fn save_motion_settings(path: &Path, settings: &MotionSettings) -> Result<(), SettingsError> {
    settings.resolve()?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let raw = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, raw).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_or_default_settings(path: &Path) -> Result<MotionSettings, SettingsError> {
    if !path.exists() {
        let settings = MotionSettings::default();
        save_motion_settings(path, &settings)?;
        tracing::info!(path = %path.display(), "wrote default motion settings");
        return Ok(settings);
    }
    load_motion_settings(path)
}

#[cfg(test)]
mod tests {
    use super::{
        load_motion_settings, load_or_default_settings, save_motion_settings, MotionSettings,
        SettingsError, CURRENT_SCHEMA_VERSION,
    };
    use crate::domain::models::{ParametersPatch, SpringParameters, SpringPreset};
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn preset_with_overrides_resolves() {
        let settings = MotionSettings {
            overrides: ParametersPatch {
                tolerance: Some(0.001),
                ..ParametersPatch::default()
            },
            ..MotionSettings::from_preset(SpringPreset::Gentle)
        };
        let params = settings.resolve().unwrap();
        assert_eq!(params.damping(), 30.0);
        assert_eq!(params.stiffness(), 120.0);
        assert_eq!(params.tolerance(), 0.001);
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("motion.json");
        let settings = MotionSettings::from_preset(SpringPreset::Wobbly);
        save_motion_settings(&path, &settings).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"preset\": \"wobbly\""));
        assert_eq!(load_motion_settings(&path).unwrap(), settings);
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("motion.json");
        let settings = load_or_default_settings(&path).unwrap();
        assert!(path.exists());
        assert_eq!(settings.resolve().unwrap(), SpringParameters::default());
    }

    #[test]
    fn reject_future_schema() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("motion.json");
        let content = json!({ "schemaVersion": CURRENT_SCHEMA_VERSION + 1 });
        std::fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();
        let error = load_motion_settings(&path).unwrap_err();
        assert_eq!(error.code(), "UNSUPPORTED_SCHEMA");
    }

    #[test]
    fn reject_invalid_overrides() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("motion.json");
        let content = json!({ "preset": "stiff", "overrides": { "mass": 0.0 } });
        std::fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();
        let error = load_motion_settings(&path).unwrap_err();
        assert!(matches!(error, SettingsError::Invalid(_)));
        assert_eq!(error.code(), "INVALID_SPRING_PARAMETERS");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("motion.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(
            load_motion_settings(&path).unwrap_err().code(),
            "SETTINGS_PARSE_FAIL"
        );
    }
}
