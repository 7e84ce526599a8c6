use tracing_subscriber::{layer::SubscriberExt, util::{SubscriberInitExt, TryInitError}, EnvFilter};

use crate::settings::AppConfig;

/// Pretty output at `debug` in development, JSON lines at `info` elsewhere.
/// `RUST_LOG` overrides the level in every environment.
pub fn init_tracing(config: &AppConfig) -> Result<(), TryInitError> {
    let default_level = if config.is_development() { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},actix_server=info", default_level)));

    if config.is_development() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .try_init()
    }
}
