//! PostgreSQL repository implementations. One repository per aggregate,
//! each holding a clone of the shared connection pool.

use sea_orm::DbErr;

use techlog_core::error::RepoError;

mod announcements;
mod bookmarks;
mod companies;
mod notifications;
mod posts;
mod recent_views;
mod users;

pub use announcements::PostgresAnnouncementRepository;
pub use bookmarks::PostgresBookmarkRepository;
pub use companies::PostgresCompanyRepository;
pub use notifications::PostgresNotificationRepository;
pub use posts::PostgresPostRepository;
pub use recent_views::PostgresRecentViewRepository;
pub use users::PostgresUserRepository;

pub(crate) fn map_db_err(err: DbErr) -> RepoError {
    match err {
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        DbErr::Exec(e) | DbErr::Query(e) => {
            let message = e.to_string();
            if message.contains("duplicate key") || message.contains("violates") {
                RepoError::Constraint(message)
            } else {
                RepoError::Query(message)
            }
        }
        other => RepoError::Query(other.to_string()),
    }
}
