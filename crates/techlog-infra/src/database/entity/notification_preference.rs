//! Notification preference entity for SeaORM. One row per user; users
//! without a row get the defaults.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notification_preferences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub new_posts: bool,
    pub announcements: bool,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain NotificationPreference.
impl From<Model> for techlog_core::domain::NotificationPreference {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            new_posts: model.new_posts,
            announcements: model.announcements,
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain NotificationPreference to SeaORM ActiveModel.
impl From<techlog_core::domain::NotificationPreference> for ActiveModel {
    fn from(preference: techlog_core::domain::NotificationPreference) -> Self {
        Self {
            user_id: Set(preference.user_id),
            new_posts: Set(preference.new_posts),
            announcements: Set(preference.announcements),
            updated_at: Set(preference.updated_at.into()),
        }
    }
}
