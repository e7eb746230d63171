//! User entity for SeaORM.
//!
//! `(provider, provider_subject)` is unique; the index lives in the
//! migration since SeaORM's `unique` attribute is single-column.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub provider: String,
    pub provider_subject: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bookmark::Entity")]
    Bookmark,
    #[sea_orm(has_many = "super::recent_view::Entity")]
    RecentView,
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain User.
impl From<Model> for techlog_core::domain::User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            provider: model.provider,
            provider_subject: model.provider_subject,
            email: model.email,
            display_name: model.display_name,
            avatar_url: model.avatar_url,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain User to SeaORM ActiveModel.
impl From<techlog_core::domain::User> for ActiveModel {
    fn from(user: techlog_core::domain::User) -> Self {
        Self {
            id: Set(user.id),
            provider: Set(user.provider),
            provider_subject: Set(user.provider_subject),
            email: Set(user.email),
            display_name: Set(user.display_name),
            avatar_url: Set(user.avatar_url),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
        }
    }
}
