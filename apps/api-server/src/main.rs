//! # Techlog API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod background;
mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    tracing::info!(
        "Starting Techlog API Server on {}:{}",
        config.host,
        config.port
    );

    let app_state = AppState::from_config(&config)
        .await
        .map_err(std::io::Error::other)?;

    let mut scheduler = background::start_background(&app_state).await;

    let state = app_state.clone();
    let server = HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .app_data(web::Data::new(state.clone()))
            .configure(move |cfg| handlers::configure_routes(cfg, &state))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!(error = %e, "Scheduler shutdown failed");
        }
    }

    server
}
