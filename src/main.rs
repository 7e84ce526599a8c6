use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use mercyhouse_forms::{
    background_task::{spawn_rate_limit_sweep, RATE_LIMIT_SWEEP_INTERVAL},
    entities::submission::FormKind,
    graceful_shutdown::shutdown_signal,
    middlewares::rate_limit::ReadRateLimit,
    routes::configure_routes,
    settings::AppConfig,
    telemetry::init_tracing,
    AppState,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_tracing(&config) {
        eprintln!("Failed to initialise logging: {}", e);
    }
    tracing::info!("Loaded configuration: {:?}", config);

    for kind in [FormKind::Contact, FormKind::VehicleDonation] {
        if config.recipients_for(kind).is_empty() {
            tracing::error!(form = %kind, "No notification recipients configured; submissions will fail");
        }
    }

    let app_state = match AppState::from_config(&config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            tracing::error!("Email transport error: {}", e);
            std::process::exit(1);
        }
    };

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "🚀 Starting {} v{} on {} (email transport: {})",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr,
        app_state.forms.mailer().name()
    );

    let sweep = spawn_rate_limit_sweep(app_state.forms.limiter().clone(), RATE_LIMIT_SWEEP_INTERVAL);

    let server = HttpServer::new({
        let app_state = app_state.clone();
        move || {
            App::new()
                .app_data(app_state.clone())
                .wrap(NormalizePath::trim())
                .wrap(ReadRateLimit)
                .wrap(TracingLogger::default())
                .configure(configure_routes)
        }
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    let result = tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    };

    sweep.abort();
    tracing::info!("Form service stopped");
    result
}
