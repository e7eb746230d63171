use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-saved reference to a post. `(user_id, post_id)` is the primary
/// key, so a user can bookmark a post at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn new(user_id: Uuid, post_id: Uuid) -> Self {
        Self {
            user_id,
            post_id,
            created_at: Utc::now(),
        }
    }
}
