//! Notification preference and push subscription queries.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, Condition, DbConn, EntityTrait, JoinType, QueryFilter, QuerySelect, RelationTrait,
};
use uuid::Uuid;

use techlog_core::domain::{NotificationPreference, PushSubscription};
use techlog_core::error::RepoError;
use techlog_core::ports::NotificationRepository;

use crate::database::entity::{notification_preference, push_subscription};

use super::map_db_err;

pub struct PostgresNotificationRepository {
    db: DbConn,
}

impl PostgresNotificationRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn find_preference(
        &self,
        user_id: Uuid,
    ) -> Result<Option<NotificationPreference>, RepoError> {
        let model = notification_preference::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.map(NotificationPreference::from))
    }

    async fn upsert_preference(
        &self,
        preference: NotificationPreference,
    ) -> Result<NotificationPreference, RepoError> {
        // Every non-key column is written, so the input is the stored row.
        notification_preference::Entity::insert(notification_preference::ActiveModel::from(
            preference.clone(),
        ))
        .on_conflict(
            OnConflict::column(notification_preference::Column::UserId)
                .update_columns([
                    notification_preference::Column::NewPosts,
                    notification_preference::Column::Announcements,
                    notification_preference::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .map_err(map_db_err)?;

        Ok(preference)
    }

    async fn upsert_subscription(
        &self,
        subscription: PushSubscription,
    ) -> Result<PushSubscription, RepoError> {
        let endpoint = subscription.endpoint.clone();

        // A re-registered endpoint keeps its row id; re-select to return
        // the stored row.
        push_subscription::Entity::insert(push_subscription::ActiveModel::from(subscription))
            .on_conflict(
                OnConflict::column(push_subscription::Column::Endpoint)
                    .update_columns([
                        push_subscription::Column::UserId,
                        push_subscription::Column::P256dh,
                        push_subscription::Column::Auth,
                        push_subscription::Column::DeviceOs,
                        push_subscription::Column::Enabled,
                        push_subscription::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        let stored = push_subscription::Entity::find()
            .filter(push_subscription::Column::Endpoint.eq(endpoint))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        stored
            .map(PushSubscription::from)
            .ok_or_else(|| RepoError::Query("upserted subscription row missing".to_string()))
    }

    async fn set_subscription_enabled(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
        enabled: bool,
    ) -> Result<(), RepoError> {
        let result = push_subscription::Entity::update_many()
            .col_expr(push_subscription::Column::Enabled, Expr::value(enabled))
            .col_expr(
                push_subscription::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(Utc::now())),
            )
            .filter(push_subscription::Column::Id.eq(subscription_id))
            .filter(push_subscription::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn delete_subscription(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
    ) -> Result<(), RepoError> {
        let result = push_subscription::Entity::delete_many()
            .filter(push_subscription::Column::Id.eq(subscription_id))
            .filter(push_subscription::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn find_new_post_targets(&self) -> Result<Vec<PushSubscription>, RepoError> {
        // Missing preference rows count as opted in, hence the left join
        // and the IS NULL arm.
        let models = push_subscription::Entity::find()
            .filter(push_subscription::Column::Enabled.eq(true))
            .join(
                JoinType::LeftJoin,
                push_subscription::Relation::Preference.def(),
            )
            .filter(
                Condition::any()
                    .add(notification_preference::Column::NewPosts.is_null())
                    .add(notification_preference::Column::NewPosts.eq(true)),
            )
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(PushSubscription::from).collect())
    }

    async fn disable_by_endpoint(&self, endpoint: &str) -> Result<(), RepoError> {
        // Idempotent; the row may already be gone.
        push_subscription::Entity::update_many()
            .col_expr(push_subscription::Column::Enabled, Expr::value(false))
            .col_expr(
                push_subscription::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(Utc::now())),
            )
            .filter(push_subscription::Column::Endpoint.eq(endpoint))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }
}
