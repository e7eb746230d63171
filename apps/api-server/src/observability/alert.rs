//! Error alerting.
//!
//! A `tracing` layer that forwards ERROR-level events to an alert sink,
//! either the console or a webhook (Slack-compatible `{"text": ...}`
//! payload). Delivery is decoupled from the logging hot path through a
//! bounded channel; when the channel is full, alerts are dropped rather
//! than blocking the caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::layer::{Context, Layer};

const ALERT_BUFFER: usize = 100;

#[derive(Debug, Clone)]
pub struct AlertMessage {
    pub message: String,
    pub target: String,
    pub timestamp: DateTime<Utc>,
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("alert delivery failed: {0}")]
    Send(String),
}

#[async_trait]
pub trait AlertSender: Send + Sync {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError>;
}

/// Writes alerts to stderr. The default sink for local development.
pub struct ConsoleAlertSender;

#[async_trait]
impl AlertSender for ConsoleAlertSender {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
        eprintln!("{}", format_alert(&alert));
        Ok(())
    }
}

/// Posts alerts to a webhook URL.
pub struct WebhookAlertSender {
    url: String,
    client: reqwest::Client,
}

impl WebhookAlertSender {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AlertSender for WebhookAlertSender {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
        self.client
            .post(&self.url)
            .json(&serde_json::json!({ "text": format_alert(&alert) }))
            .send()
            .await
            .map_err(|e| AlertError::Send(e.to_string()))?
            .error_for_status()
            .map_err(|e| AlertError::Send(e.to_string()))?;
        Ok(())
    }
}

fn format_alert(alert: &AlertMessage) -> String {
    let mut text = format!(
        "[ERROR] {} ({} at {})",
        alert.message,
        alert.target,
        alert.timestamp.to_rfc3339()
    );
    for (name, value) in &alert.fields {
        text.push_str(&format!("\n  {name}: {value}"));
    }
    text
}

/// Subscriber layer that captures ERROR events and hands them to a sender.
pub struct AlertLayer {
    tx: mpsc::Sender<AlertMessage>,
}

impl AlertLayer {
    pub fn new(sender: Arc<dyn AlertSender>) -> Self {
        let (tx, mut rx) = mpsc::channel::<AlertMessage>(ALERT_BUFFER);

        tokio::spawn(async move {
            while let Some(alert) = rx.recv().await {
                // Tracing inside the forward loop would re-enter this layer.
                if let Err(e) = sender.send(alert).await {
                    eprintln!("{e}");
                }
            }
        });

        Self { tx }
    }

    pub fn console() -> Self {
        Self::new(Arc::new(ConsoleAlertSender))
    }

    pub fn webhook(url: impl Into<String>) -> Self {
        Self::new(Arc::new(WebhookAlertSender::new(url)))
    }
}

impl<S: Subscriber> Layer<S> for AlertLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::ERROR {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let alert = AlertMessage {
            message: visitor.message,
            target: event.metadata().target().to_string(),
            timestamp: Utc::now(),
            fields: visitor.fields,
        };

        let _ = self.tx.try_send(alert);
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push((field.name().to_string(), format!("{value:?}")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tracing_subscriber::layer::SubscriberExt;

    struct CapturingSender {
        alerts: Arc<Mutex<Vec<AlertMessage>>>,
    }

    #[async_trait]
    impl AlertSender for CapturingSender {
        async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
            self.alerts.lock().unwrap().push(alert);
            Ok(())
        }
    }

    #[tokio::test]
    async fn error_events_reach_the_sender() {
        let alerts = Arc::new(Mutex::new(Vec::new()));
        let layer = AlertLayer::new(Arc::new(CapturingSender {
            alerts: alerts.clone(),
        }));
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(code = 7, "fan-out failed");
            tracing::info!("routine noise");
        });

        // Delivery hops through the channel and a spawned task.
        for _ in 0..50 {
            if !alerts.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        let captured = alerts.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].message, "fan-out failed");
        assert!(
            captured[0]
                .fields
                .contains(&("code".to_string(), "7".to_string()))
        );
    }
}
