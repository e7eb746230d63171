//! Bookmark queries.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DbConn, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use techlog_core::domain::Bookmark;
use techlog_core::error::RepoError;
use techlog_core::ports::BookmarkRepository;

use crate::database::entity::bookmark;

use super::map_db_err;

pub struct PostgresBookmarkRepository {
    db: DbConn,
}

impl PostgresBookmarkRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookmarkRepository for PostgresBookmarkRepository {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Bookmark>, RepoError> {
        let models = bookmark::Entity::find()
            .filter(bookmark::Column::UserId.eq(user_id))
            .order_by_desc(bookmark::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Bookmark::from).collect())
    }

    async fn add(&self, bookmark: Bookmark) -> Result<bool, RepoError> {
        // DO NOTHING on the duplicate pair; zero rows affected means the
        // bookmark already existed.
        let rows = bookmark::Entity::insert(bookmark::ActiveModel::from(bookmark))
            .on_conflict(
                OnConflict::columns([bookmark::Column::UserId, bookmark::Column::PostId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows > 0)
    }

    async fn remove(&self, user_id: Uuid, post_id: Uuid) -> Result<(), RepoError> {
        let result = bookmark::Entity::delete_many()
            .filter(bookmark::Column::UserId.eq(user_id))
            .filter(bookmark::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
