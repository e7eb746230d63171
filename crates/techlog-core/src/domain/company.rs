use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A company whose engineering blog is aggregated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    /// Korean display name.
    pub name: String,
    pub name_en: String,
    pub logo_url: Option<String>,
    pub blog_url: String,
    pub rss_url: Option<String>,
    /// Inactive companies are hidden from the default listing but their
    /// posts remain readable.
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which slice of companies a listing should return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompanyScope {
    /// Active companies only - the default listing.
    #[default]
    Active,
    /// Active and featured.
    Featured,
    /// Everything, including inactive companies.
    All,
}
