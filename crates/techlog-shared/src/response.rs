//! The error envelope every failing endpoint returns.

use serde::{Deserialize, Serialize};

/// Body of a 4xx/5xx response: `{ "error": <summary>, "details": ... }`.
///
/// `error` is a short, user-safe summary; `details` is optional extra
/// context (validation messages and the like). Internal error detail is
/// logged server-side and never serialized here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Common constructors

    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::new("Bad request").with_details(details)
    }

    pub fn unauthorized() -> Self {
        Self::new("Authentication required")
    }

    pub fn forbidden() -> Self {
        Self::new("Forbidden")
    }

    pub fn not_found(details: impl Into<String>) -> Self {
        Self::new("Not found").with_details(details)
    }

    pub fn conflict(details: impl Into<String>) -> Self {
        Self::new("Conflict").with_details(details)
    }

    pub fn too_many_requests(details: impl Into<String>) -> Self {
        Self::new("Too many requests").with_details(details)
    }

    pub fn internal_error() -> Self {
        Self::new("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_are_omitted_when_absent() {
        let json = serde_json::to_value(ErrorResponse::unauthorized()).unwrap();
        assert_eq!(json["error"], "Authentication required");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn details_serialize_when_present() {
        let json = serde_json::to_value(ErrorResponse::bad_request("postId is required")).unwrap();
        assert_eq!(json["details"], "postId is required");
    }
}
