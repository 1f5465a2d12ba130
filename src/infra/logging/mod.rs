use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "spring_motion=info,warn";

pub fn motion_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(motion_filter())
        .with_target(true)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(default_filter = DEFAULT_FILTER, "tracing initialized");
    }
}
