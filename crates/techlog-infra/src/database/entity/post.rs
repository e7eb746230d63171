//! Post entity for SeaORM.
//!
//! Tags live in `post_tags`; [`Model::into_post`] attaches them.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub url: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,
    pub author: Option<String>,
    pub published_at: DateTimeWithTimeZone,
    pub scraped_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Company,
    #[sea_orm(has_many = "super::post_tag::Entity")]
    PostTag,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::post_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostTag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Conversion to Domain Post, with tags fetched separately.
    pub fn into_post(self, tags: Vec<String>) -> techlog_core::domain::Post {
        techlog_core::domain::Post {
            id: self.id,
            company_id: self.company_id,
            title: self.title,
            url: self.url,
            summary: self.summary,
            author: self.author,
            tags,
            published_at: self.published_at.into(),
            scraped_at: self.scraped_at.into(),
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        }
    }
}
