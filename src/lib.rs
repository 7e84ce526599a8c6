use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod telemetry;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases, validation};
pub use interfaces::{handlers, middlewares, notifiers, routes};
pub use infrastructure::{email, limiter, utils};

use email::{log::LogMailer, smtp::SmtpMailer};
use errors::EmailError;
use handlers::system::HealthCache;
use limiter::rate_limiter::RateLimiterStore;
use notifiers::email::EmailProvider;
use use_cases::forms::FormSubmissionHandler;

pub struct AppState {
    pub config: settings::AppConfig,
    pub forms: FormSubmissionHandler,
    pub health: HealthCache,
}

impl AppState {
    pub fn new(
        config: &settings::AppConfig,
        mailer: Arc<dyn EmailProvider>,
        limiter: RateLimiterStore,
    ) -> Self {
        AppState {
            config: config.clone(),
            forms: FormSubmissionHandler::new(config, mailer, limiter),
            health: HealthCache::default(),
        }
    }

    /// SMTP when credentials are configured, otherwise the log transport.
    pub fn from_config(config: &settings::AppConfig) -> Result<Self, EmailError> {
        let mailer: Arc<dyn EmailProvider> = if config.smtp_configured() {
            Arc::new(SmtpMailer::new(config)?)
        } else {
            tracing::warn!("SMTP credentials not configured, emails will only be logged");
            Arc::new(LogMailer)
        };

        Ok(AppState::new(config, mailer, RateLimiterStore::new()))
    }
}
