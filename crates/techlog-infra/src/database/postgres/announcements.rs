//! Announcement queries.

use async_trait::async_trait;
use sea_orm::{DbConn, EntityTrait, QueryOrder};

use techlog_core::domain::Announcement;
use techlog_core::error::RepoError;
use techlog_core::ports::AnnouncementRepository;

use crate::database::entity::announcement;

use super::map_db_err;

pub struct PostgresAnnouncementRepository {
    db: DbConn,
}

impl PostgresAnnouncementRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AnnouncementRepository for PostgresAnnouncementRepository {
    async fn list(&self) -> Result<Vec<Announcement>, RepoError> {
        // Same ordering as Announcement::display_order
        let models = announcement::Entity::find()
            .order_by_desc(announcement::Column::IsPinned)
            .order_by_desc(announcement::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Announcement::from).collect())
    }
}
