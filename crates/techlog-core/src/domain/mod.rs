//! Domain entities - the core business objects.

mod announcement;
mod bookmark;
mod company;
mod notification;
mod post;
mod recent_view;
mod user;

pub use announcement::Announcement;
pub use bookmark::Bookmark;
pub use company::{Company, CompanyScope};
pub use notification::{DeviceOs, NotificationPreference, PushSubscription};
pub use post::{Post, PostFilter};
pub use recent_view::{RECENT_VIEW_CAP, RecentView, merge_recent_views};
pub use user::User;
