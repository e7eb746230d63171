use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A blog post aggregated from a company engineering blog.
///
/// Rows are written by the external scraper; this service only reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub url: String,
    pub summary: Option<String>,
    pub author: Option<String>,
    /// Deduplicated, stored relationally as one row per (post, tag).
    pub tags: Vec<String>,
    pub published_at: DateTime<Utc>,
    pub scraped_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter for the post listing. Conditions compose conjunctively; an empty
/// filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Case-insensitive substring match against title or summary.
    pub search: Option<String>,
    /// Posts carrying at least one of these tags.
    pub tags: Vec<String>,
    /// Posts from any of these companies.
    pub company_ids: Vec<Uuid>,
}

impl PostFilter {
    /// Canonicalize the filter: trim the search term (dropping it when
    /// empty), lowercase + sort + dedupe tags, sort + dedupe company ids.
    ///
    /// Two requests that mean the same thing normalize to the same value,
    /// which is what makes [`PostFilter::cache_key`] usable as a cache key.
    pub fn normalize(mut self) -> Self {
        self.search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        self.tags = self
            .tags
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        self.tags.sort();
        self.tags.dedup();

        self.company_ids.sort();
        self.company_ids.dedup();

        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.tags.is_empty() && self.company_ids.is_empty()
    }

    /// True when the filter contains a free-text search term. Search
    /// results are not cached.
    pub fn has_search(&self) -> bool {
        self.search.is_some()
    }

    /// Stable cache key fragment for a normalized filter.
    pub fn cache_key(&self) -> String {
        let companies: Vec<String> = self.company_ids.iter().map(Uuid::to_string).collect();
        format!("t={};c={}", self.tags.join(","), companies.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_drops_empty_search() {
        let filter = PostFilter {
            search: Some("  rust  ".into()),
            ..Default::default()
        }
        .normalize();
        assert_eq!(filter.search.as_deref(), Some("rust"));

        let blank = PostFilter {
            search: Some("   ".into()),
            ..Default::default()
        }
        .normalize();
        assert!(blank.search.is_none());
        assert!(blank.is_empty());
    }

    #[test]
    fn normalize_canonicalizes_tags() {
        let filter = PostFilter {
            tags: vec!["Rust".into(), "kafka".into(), "rust".into(), " ".into()],
            ..Default::default()
        }
        .normalize();
        assert_eq!(filter.tags, vec!["kafka", "rust"]);
    }

    #[test]
    fn equivalent_filters_share_a_cache_key() {
        let a = PostFilter {
            tags: vec!["B".into(), "a".into()],
            company_ids: vec![Uuid::nil()],
            ..Default::default()
        }
        .normalize();
        let b = PostFilter {
            tags: vec!["a".into(), "b".into(), "b".into()],
            company_ids: vec![Uuid::nil(), Uuid::nil()],
            ..Default::default()
        }
        .normalize();
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn search_filters_are_flagged_uncacheable() {
        let filter = PostFilter {
            search: Some("proxy".into()),
            ..Default::default()
        }
        .normalize();
        assert!(filter.has_search());
    }
}
