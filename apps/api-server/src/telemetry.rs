//! Tracing and alert wiring.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::observability::AlertLayer;

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// JSON log lines instead of the pretty format. Production wants this.
    pub json_logs: bool,
    /// Forward ERROR events to an alert sink.
    pub alerts_enabled: bool,
    /// Webhook the alerts go to; stderr when unset.
    pub alert_webhook_url: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json_logs: false,
            alerts_enabled: true,
            alert_webhook_url: None,
        }
    }
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        Self {
            json_logs: std::env::var("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
            alerts_enabled: std::env::var("ALERTS_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            alert_webhook_url: std::env::var("ALERT_WEBHOOK_URL").ok(),
        }
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_telemetry(config: &TelemetryConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,api_server=debug,techlog_infra=debug"));

    let alert_layer = if config.alerts_enabled {
        let layer = match &config.alert_webhook_url {
            Some(webhook_url) => AlertLayer::webhook(webhook_url.clone()),
            None => AlertLayer::console(),
        };
        Some(layer)
    } else {
        None
    };

    if config.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .with(alert_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .with(alert_layer)
            .init();
    }

    tracing::info!(
        json_logs = config.json_logs,
        alerts_enabled = config.alerts_enabled,
        "Telemetry initialized"
    );
}
