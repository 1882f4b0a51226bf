//! Logging setup for the access-control service.
//!
//! # Notes
//! Initialization is guarded by `OnceLock` to keep startup idempotent in tests.
//! Metrics go through the `metrics` facade; the embedding process installs the
//! recorder.
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static OBS_INIT: OnceLock<()> = OnceLock::new();

pub fn init_observability(service_name: &str) {
    OBS_INIT.get_or_init(|| {
        let registry = tracing_subscriber::registry()
            .with(env_filter())
            .with(tracing_subscriber::fmt::layer());
        // Another subscriber may already be installed by the embedder.
        let _ = registry.try_init();
    });
    tracing::debug!(service = service_name, "observability initialized");
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
