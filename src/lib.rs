pub mod core;
pub mod domain;
pub mod infra;

pub use crate::core::motion::controller::{AnimationController, AnimationHandle, AnimationOutcome};
pub use crate::core::motion::driver::{FrameDriver, HeadlessDriver, ManualDriver};
pub use crate::core::motion::integrator::{FrameOutcome, SpringIntegrator, MAX_FRAME_DELTA};
pub use crate::core::motion::listeners::ListenerId;
pub use crate::domain::models::{
    DampingKind, ParametersPatch, SpringError, SpringParameters, SpringPreset,
};
pub use crate::domain::state_machine::ControllerState;

use crate::core::motion::pump::{drive_until_idle, FRAME_INTERVAL};
use crate::infra::logging::init_tracing;
use crate::infra::storage::settings_store::{load_or_default_settings, SETTINGS_PATH_ENV};
use std::path::PathBuf;

/// Demo entry: springs 0 -> 1 with the configured parameters and logs every value.
pub async fn run(preset_arg: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let parameters = match preset_arg {
        Some(name) => name.parse::<SpringPreset>()?.parameters(),
        None => match std::env::var_os(SETTINGS_PATH_ENV) {
            Some(path) => load_or_default_settings(&PathBuf::from(path))?.resolve()?,
            None => SpringParameters::default(),
        },
    };
    tracing::info!(
        damping = parameters.damping(),
        stiffness = parameters.stiffness(),
        mass = parameters.mass(),
        kind = ?parameters.damping_kind(),
        "spring parameters"
    );

    let mut controller = AnimationController::new(parameters, 0.0, ManualDriver::new());
    controller.add_listener(|value| tracing::info!(value, "value changed"));
    let handle = controller.animate_to(1.0)?;
    let frames = drive_until_idle(&mut controller, FRAME_INTERVAL).await;
    let outcome = handle.finished().await;
    tracing::info!(frames, ?outcome, "animation finished");
    controller.dispose();
    Ok(())
}
