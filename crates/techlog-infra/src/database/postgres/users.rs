//! User queries. The OAuth callback upserts on `(provider, subject)`.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DbConn, EntityTrait, QueryFilter};
use uuid::Uuid;

use techlog_core::domain::User;
use techlog_core::error::RepoError;
use techlog_core::ports::UserRepository;

use crate::database::entity::user;

use super::map_db_err;

pub struct PostgresUserRepository {
    db: DbConn,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.map(User::from))
    }

    async fn upsert_by_provider(&self, user: User) -> Result<User, RepoError> {
        let provider = user.provider.clone();
        let subject = user.provider_subject.clone();

        // On a repeat sign-in only the profile fields move; the existing
        // row keeps its id and created_at.
        user::Entity::insert(user::ActiveModel::from(user))
            .on_conflict(
                OnConflict::columns([user::Column::Provider, user::Column::ProviderSubject])
                    .update_columns([
                        user::Column::Email,
                        user::Column::DisplayName,
                        user::Column::AvatarUrl,
                        user::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        let stored = user::Entity::find()
            .filter(user::Column::Provider.eq(provider))
            .filter(user::Column::ProviderSubject.eq(subject))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        stored
            .map(User::from)
            .ok_or_else(|| RepoError::Query("upserted user row missing".to_string()))
    }
}
