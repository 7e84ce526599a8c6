use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use async_trait::async_trait;
use mercyhouse_forms::{
    entities::email::{EmailMessage, EmailResult},
    limiter::rate_limiter::RateLimiterStore,
    middlewares::rate_limit::ReadRateLimit,
    notifiers::email::EmailProvider,
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment},
    AppState,
};
use reqwest::Client;
use serde_json::Value;
use std::{
    net::TcpListener,
    sync::{Arc, Mutex},
    time::Duration,
};

pub const ADMIN_ADDRESS: &str = "office@mercyhouse.test";
pub const ALLOWED_ORIGIN: &str = "https://mercyhouse.test";

/// Captures every message instead of sending it. Optionally reports failure.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        RecordingMailer {
            fail: true,
            ..Default::default()
        }
    }

    pub fn messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailProvider for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> EmailResult {
        self.sent.lock().unwrap().push(message.clone());
        if self.fail {
            EmailResult::failed("SMTP transport error: connection refused")
        } else {
            EmailResult::sent(format!("<{}@mercyhouse.test>", self.sent.lock().unwrap().len()))
        }
    }

    async fn verify(&self) -> bool {
        !self.fail
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mailer: RecordingMailer,
    pub config: AppConfig,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config(), RecordingMailer::default()).await
    }

    pub async fn spawn_with(config: AppConfig, mailer: RecordingMailer) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let state = web::Data::new(AppState::new(
            &config,
            Arc::new(mailer.clone()),
            RateLimiterStore::new(),
        ));

        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .wrap(NormalizePath::trim())
                .wrap(ReadRateLimit)
                .configure(configure_routes)
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(config.worker_count)
        .run();

        tokio::spawn(server);

        let client = Client::new();
        while client.get(&format!("{}/", address)).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            address,
            client,
            mailer,
            config,
        }
    }

    /// Posts `body` as JSON from the given client address.
    pub async fn post_form(&self, path: &str, ip: &str, body: &Value) -> reqwest::Response {
        self.post_raw(path, ip, body.to_string()).await
    }

    pub async fn post_raw(&self, path: &str, ip: &str, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", self.address, path))
            .header("Content-Type", "application/json")
            .header("X-Forwarded-For", ip)
            .body(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn preflight(&self, path: &str) -> reqwest::Response {
        self.client
            .request(reqwest::Method::OPTIONS, &format!("{}{}", self.address, path))
            .header("Origin", ALLOWED_ORIGIN)
            .header("Access-Control-Request-Method", "POST")
            .send()
            .await
            .expect("Failed to execute request")
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "MercyHouse-Forms Test".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        worker_count: 1,
        form_recipients: ADMIN_ADDRESS.to_string(),
        allowed_origin: ALLOWED_ORIGIN.to_string(),
        ..AppConfig::default()
    }
}
