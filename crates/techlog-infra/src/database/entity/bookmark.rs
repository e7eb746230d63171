//! Bookmark entity for SeaORM. `(user_id, post_id)` is the primary key.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bookmarks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub post_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
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
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Bookmark.
impl From<Model> for techlog_core::domain::Bookmark {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            post_id: model.post_id,
            created_at: model.created_at.into(),
        }
    }
}

/// Conversion from Domain Bookmark to SeaORM ActiveModel.
impl From<techlog_core::domain::Bookmark> for ActiveModel {
    fn from(bookmark: techlog_core::domain::Bookmark) -> Self {
        Self {
            user_id: Set(bookmark.user_id),
            post_id: Set(bookmark.post_id),
            created_at: Set(bookmark.created_at.into()),
        }
    }
}
