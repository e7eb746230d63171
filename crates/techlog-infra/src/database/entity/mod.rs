//! SeaORM entities mirroring the techlog schema.
//!
//! `companies`, `posts`, and `post_tags` are written by the external
//! scraper and only read here; the remaining tables are owned by this
//! service.

pub mod announcement;
pub mod bookmark;
pub mod company;
pub mod notification_preference;
pub mod post;
pub mod post_tag;
pub mod push_subscription;
pub mod recent_view;
pub mod user;
