use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account created from an OAuth sign-in.
///
/// `(provider, provider_subject)` identifies the account at the external
/// provider; the pair is unique and is what the callback upserts on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub provider: String,
    pub provider_subject: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user from an OAuth profile with generated ID and timestamps.
    pub fn from_oauth(
        provider: String,
        provider_subject: String,
        email: Option<String>,
        display_name: Option<String>,
        avatar_url: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            provider,
            provider_subject,
            email,
            display_name,
            avatar_url,
            created_at: now,
            updated_at: now,
        }
    }
}
