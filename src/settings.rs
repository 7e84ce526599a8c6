use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};
use zeroize::Zeroizing;

use crate::entities::submission::FormKind;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

/// Settings for a single form kind, mirroring the CMS form configuration document.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FormSettings {
    #[serde(default = "default_true")]
    pub active: bool,

    /// Overrides `form_recipients` for this form when non-empty.
    #[serde(default)]
    pub recipients: Option<String>,

    /// Supports `{formName}` and `{name}` placeholders.
    #[serde(default)]
    pub email_subject: Option<String>,

    #[serde(default)]
    pub success_message: Option<String>,
}

impl Default for FormSettings {
    fn default() -> Self {
        FormSettings {
            active: true,
            recipients: None,
            email_subject: None,
            success_message: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct FormsSettings {
    #[serde(default)]
    pub contact: FormSettings,

    #[serde(default)]
    pub donate_car: FormSettings,
}

impl FormsSettings {
    pub fn for_kind(&self, kind: FormKind) -> &FormSettings {
        match kind {
            FormKind::Contact => &self.contact,
            FormKind::VehicleDonation => &self.donate_car,
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Comma separated admin addresses notified of every accepted submission.
    #[serde(default)]
    pub form_recipients: String,

    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_username: String,

    /// Wiped from memory when the config is dropped.
    #[serde(default)]
    pub smtp_password: Zeroizing<String>,

    #[serde(default = "default_mail_from_name")]
    pub mail_from_name: String,

    #[serde(default = "default_email_timeout")]
    pub email_timeout_secs: u64,

    #[serde(default)]
    pub forms: FormsSettings,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "MercyHouse-Forms".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_allowed_origin() -> String {
    "http://localhost:3000".to_string()
}
fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}
fn default_smtp_port() -> u16 {
    587
}
fn default_mail_from_name() -> String {
    "Mercy House ATC".to_string()
}
fn default_email_timeout() -> u64 {
    10
}
fn default_true() -> bool {
    true
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // Variable names used by the existing website deployment
        config.form_recipients = fill_from_env(config.form_recipients, "FORM_RECIPIENTS");
        config.smtp_username = fill_from_env(config.smtp_username, "GMAIL_USER");
        let password = std::mem::take(&mut *config.smtp_password);
        config.smtp_password = Zeroizing::new(fill_from_env(password, "GMAIL_APP_PASSWORD"));
        if let Ok(origin) = env::var("NEXT_PUBLIC_APP_URL") {
            if env::var("APP_ALLOWED_ORIGIN").is_err() && !origin.trim().is_empty() {
                config.allowed_origin = origin;
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("PORT must be greater than zero");
        }
        if self.allowed_origin.trim().is_empty() {
            errors.push("ALLOWED_ORIGIN cannot be empty");
        }
        if self.is_production() && self.allowed_origin.trim() == "*" {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }
        if self.is_production() && !self.smtp_configured() {
            errors.push("SMTP_USERNAME and SMTP_PASSWORD must be set in production");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn is_development(&self) -> bool {
        self.env == AppEnvironment::Development
    }

    pub fn smtp_configured(&self) -> bool {
        !self.smtp_username.trim().is_empty() && !self.smtp_password.is_empty()
    }

    pub fn email_timeout(&self) -> Duration {
        Duration::from_secs(self.email_timeout_secs.max(1))
    }

    /// Admin recipients for a form: the per-form override when present, else the global list.
    pub fn recipients_for(&self, kind: FormKind) -> Vec<String> {
        match self.forms.for_kind(kind).recipients.as_deref() {
            Some(list) if !split_addresses(list).is_empty() => split_addresses(list),
            _ => split_addresses(&self.form_recipients),
        }
    }
}

pub fn split_addresses(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn fill_from_env(current: String, env_key: &str) -> String {
    if current.trim().is_empty() {
        env::var(env_key).unwrap_or_default()
    } else {
        current
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            form_recipients: String::new(),
            allowed_origin: default_allowed_origin(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: Zeroizing::default(),
            mail_from_name: default_mail_from_name(),
            email_timeout_secs: default_email_timeout(),
            forms: FormsSettings::default(),
        }
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("form_recipients", &split_addresses(&self.form_recipients).len())
            .field("allowed_origin", &self.allowed_origin)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &self.smtp_password.redact())
            .field("mail_from_name", &self.mail_from_name)
            .field("email_timeout_secs", &self.email_timeout_secs)
            .field("forms", &self.forms)
            .finish()
    }
}
