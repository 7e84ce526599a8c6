use actix_web::{get, web, HttpResponse, Responder};
use humantime::format_duration;
use chrono::Utc;
use std::{
    time::Duration,
    sync::{atomic::{AtomicI64, Ordering}, RwLock},
};
use serde::Serialize;

use crate::{constants::START_TIME, AppState};

/// Seconds a health report is served from cache before the transport is probed again.
const HEALTH_CACHE_SECS: i64 = 5;

#[derive(Serialize, Clone)]
struct HealthCheckResponse {
    status: String,
    uptime: String,
    timestamp: String,
    start_at: String,
    version: String,
    environment: String,
    email_transport: String,
    email_status: String,
    rate_limited_clients: usize,
}

/// Last health report of one application instance.
#[derive(Default)]
pub struct HealthCache {
    last_check: AtomicI64,
    report: RwLock<Option<HealthCheckResponse>>,
}

async fn build_health_response(state: &AppState) -> HealthCheckResponse {
    let now_utc = Utc::now();
    let uptime_secs = now_utc.signed_duration_since(*START_TIME).num_seconds().max(0) as u64;
    let human_uptime = format_duration(Duration::from_secs(uptime_secs));

    let mailer = state.forms.mailer();
    let email_ok = mailer.verify().await;

    HealthCheckResponse {
        status: if email_ok { "healthy" } else { "degraded" }.to_string(),
        uptime: human_uptime.to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.env.to_string(),
        email_transport: mailer.name().to_string(),
        email_status: if email_ok { "OK" } else { "Unavailable" }.to_string(),
        rate_limited_clients: state.forms.limiter().tracked_clients(),
    }
}

/// Always 200. A failing transport only marks the report `degraded`.
#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let cache = &state.health;
    let now = Utc::now().timestamp();
    let last = cache.last_check.load(Ordering::Relaxed);

    if now - last <= HEALTH_CACHE_SECS {
        match cache.report.read() {
            Ok(report) => {
                if let Some(report) = report.as_ref() {
                    return HttpResponse::Ok().json(report.clone());
                }
            }
            Err(e) => tracing::warn!("HealthCheck cache lock poisoned: {}", e),
        }
    }

    let response = build_health_response(&state).await;

    if let Ok(mut report) = cache.report.write() {
        *report = Some(response.clone());
        cache.last_check.store(now, Ordering::Relaxed);
    }

    HttpResponse::Ok().json(response)
}
