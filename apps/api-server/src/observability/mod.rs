//! Observability: request IDs and error alerting.

mod alert;
mod request_id;

pub use alert::{AlertLayer, AlertMessage, AlertSender};
pub use request_id::RequestIdMiddleware;
