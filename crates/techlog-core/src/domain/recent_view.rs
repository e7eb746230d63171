//! Recently viewed posts.
//!
//! Logged-out clients keep their own capped mirror in local storage; on
//! login that mirror is merged into the server-side list. Both sides obey
//! the same invariants: at most [`RECENT_VIEW_CAP`] entries, no duplicate
//! post ids, most recent first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum entries kept per user; older entries are evicted.
pub const RECENT_VIEW_CAP: usize = 20;

/// One "the user opened this post" record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentView {
    pub post_id: Uuid,
    pub viewed_at: DateTime<Utc>,
}

impl RecentView {
    pub fn new(post_id: Uuid) -> Self {
        Self {
            post_id,
            viewed_at: Utc::now(),
        }
    }
}

/// Merge the server-side list with a client-submitted mirror.
///
/// Duplicate post ids collapse to the entry with the latest `viewed_at`;
/// the result is ordered most-recent-first and truncated to the cap. Both
/// inputs may be unsorted and may contain duplicates.
pub fn merge_recent_views(server: Vec<RecentView>, client: Vec<RecentView>) -> Vec<RecentView> {
    let mut merged: Vec<RecentView> = Vec::with_capacity(server.len() + client.len());

    for view in server.into_iter().chain(client) {
        match merged.iter_mut().find(|v| v.post_id == view.post_id) {
            Some(existing) => {
                if view.viewed_at > existing.viewed_at {
                    existing.viewed_at = view.viewed_at;
                }
            }
            None => merged.push(view),
        }
    }

    merged.sort_by(|a, b| b.viewed_at.cmp(&a.viewed_at));
    merged.truncate(RECENT_VIEW_CAP);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn view(post: u128, minutes_ago: i64) -> RecentView {
        RecentView {
            post_id: Uuid::from_u128(post),
            viewed_at: Utc::now() - TimeDelta::minutes(minutes_ago),
        }
    }

    #[test]
    fn merge_orders_most_recent_first() {
        let merged = merge_recent_views(vec![view(1, 30), view(2, 5)], vec![view(3, 10)]);
        let ids: Vec<Uuid> = merged.iter().map(|v| v.post_id).collect();
        assert_eq!(
            ids,
            vec![Uuid::from_u128(2), Uuid::from_u128(3), Uuid::from_u128(1)]
        );
    }

    #[test]
    fn merge_dedupes_by_post_keeping_latest() {
        let merged = merge_recent_views(vec![view(1, 30)], vec![view(1, 2), view(1, 60)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].post_id, Uuid::from_u128(1));
        // Latest timestamp won, regardless of which side it came from.
        assert!(merged[0].viewed_at > Utc::now() - TimeDelta::minutes(3));
    }

    #[test]
    fn merge_never_exceeds_the_cap() {
        let server: Vec<_> = (0..15).map(|i| view(i, i as i64)).collect();
        let client: Vec<_> = (100..115).map(|i| view(i, i as i64)).collect();
        let merged = merge_recent_views(server, client);
        assert_eq!(merged.len(), RECENT_VIEW_CAP);
        // The newest entries survive eviction.
        assert_eq!(merged[0].post_id, Uuid::from_u128(0));
    }

    #[test]
    fn merge_of_empty_inputs_is_empty() {
        assert!(merge_recent_views(vec![], vec![]).is_empty());
    }

    #[test]
    fn client_only_merge_matches_local_mirror_rules() {
        // A fresh login with no server rows keeps exactly the client
        // mirror, deduped and capped.
        let client: Vec<_> = (0..25).map(|i| view(i, i as i64)).collect();
        let merged = merge_recent_views(vec![], client);
        assert_eq!(merged.len(), RECENT_VIEW_CAP);
        let mut ids: Vec<_> = merged.iter().map(|v| v.post_id).collect();
        ids.dedup();
        assert_eq!(ids.len(), RECENT_VIEW_CAP);
    }
}
