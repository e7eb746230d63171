use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A site announcement shown to all users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    /// Display order: pinned announcements first, then newest first.
    pub fn display_order(a: &Announcement, b: &Announcement) -> Ordering {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then_with(|| b.created_at.cmp(&a.created_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn announcement(title: &str, pinned: bool, days_ago: i64) -> Announcement {
        let at = Utc::now() - TimeDelta::days(days_ago);
        Announcement {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: String::new(),
            is_pinned: pinned,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn pinned_sorts_before_newer_unpinned() {
        let mut list = vec![
            announcement("new", false, 0),
            announcement("old-pinned", true, 30),
            announcement("mid", false, 7),
        ];
        list.sort_by(Announcement::display_order);
        let titles: Vec<&str> = list.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["old-pinned", "new", "mid"]);
    }

    #[test]
    fn pinned_group_is_newest_first_too() {
        let mut list = vec![
            announcement("pin-old", true, 10),
            announcement("pin-new", true, 1),
        ];
        list.sort_by(Announcement::display_order);
        assert_eq!(list[0].title, "pin-new");
    }
}
