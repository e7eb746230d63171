//! Recent view queries: the capped per-user view history.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DbConn, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use techlog_core::domain::{RECENT_VIEW_CAP, RecentView};
use techlog_core::error::RepoError;
use techlog_core::ports::RecentViewRepository;

use crate::database::entity::recent_view;

use super::map_db_err;

pub struct PostgresRecentViewRepository {
    db: DbConn,
}

impl PostgresRecentViewRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Delete rows beyond the cap, oldest first.
    async fn evict_beyond_cap(&self, user_id: Uuid) -> Result<(), RepoError> {
        let stale: Vec<Uuid> = recent_view::Entity::find()
            .filter(recent_view::Column::UserId.eq(user_id))
            .order_by_desc(recent_view::Column::ViewedAt)
            .offset(RECENT_VIEW_CAP as u64)
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|model| model.post_id)
            .collect();

        if stale.is_empty() {
            return Ok(());
        }

        recent_view::Entity::delete_many()
            .filter(recent_view::Column::UserId.eq(user_id))
            .filter(recent_view::Column::PostId.is_in(stale))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }
}

#[async_trait]
impl RecentViewRepository for PostgresRecentViewRepository {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<RecentView>, RepoError> {
        let models = recent_view::Entity::find()
            .filter(recent_view::Column::UserId.eq(user_id))
            .order_by_desc(recent_view::Column::ViewedAt)
            .limit(RECENT_VIEW_CAP as u64)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(RecentView::from).collect())
    }

    async fn record(&self, user_id: Uuid, view: RecentView) -> Result<(), RepoError> {
        recent_view::Entity::insert(recent_view::ActiveModel {
            user_id: Set(user_id),
            post_id: Set(view.post_id),
            viewed_at: Set(view.viewed_at.into()),
        })
        .on_conflict(
            OnConflict::columns([recent_view::Column::UserId, recent_view::Column::PostId])
                .update_columns([recent_view::Column::ViewedAt])
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .map_err(map_db_err)?;

        self.evict_beyond_cap(user_id).await
    }

    async fn replace_all(&self, user_id: Uuid, views: &[RecentView]) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        recent_view::Entity::delete_many()
            .filter(recent_view::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        if !views.is_empty() {
            let rows = views.iter().map(|view| recent_view::ActiveModel {
                user_id: Set(user_id),
                post_id: Set(view.post_id),
                viewed_at: Set(view.viewed_at.into()),
            });

            recent_view::Entity::insert_many(rows)
                .exec_without_returning(&txn)
                .await
                .map_err(map_db_err)?;
        }

        txn.commit().await.map_err(map_db_err)
    }
}
