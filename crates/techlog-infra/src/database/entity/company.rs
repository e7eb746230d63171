//! Company entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub name_en: String,
    pub logo_url: Option<String>,
    pub blog_url: String,
    pub rss_url: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Company.
impl From<Model> for techlog_core::domain::Company {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            name_en: model.name_en,
            logo_url: model.logo_url,
            blog_url: model.blog_url,
            rss_url: model.rss_url,
            is_active: model.is_active,
            is_featured: model.is_featured,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}
