//! Post queries: the filtered listing, id expansion for bookmark and
//! recent-view responses, and the notifier's new-post scan.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ColumnTrait, Condition, DbConn, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use techlog_core::domain::{Post, PostFilter};
use techlog_core::error::RepoError;
use techlog_core::pagination::{Page, PageRequest};
use techlog_core::ports::PostRepository;

use crate::database::entity::{post, post_tag};

use super::map_db_err;

pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// WHERE clause for a normalized filter. Conditions compose
    /// conjunctively; an empty filter yields an empty condition.
    fn filter_condition(filter: &PostFilter) -> Condition {
        let mut condition = Condition::all();

        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            condition = condition.add(
                Condition::any()
                    .add(Expr::col((post::Entity, post::Column::Title)).ilike(pattern.clone()))
                    .add(Expr::col((post::Entity, post::Column::Summary)).ilike(pattern)),
            );
        }

        if !filter.tags.is_empty() {
            condition = condition.add(
                post::Column::Id.in_subquery(
                    Query::select()
                        .column(post_tag::Column::PostId)
                        .from(post_tag::Entity)
                        .and_where(post_tag::Column::Tag.is_in(filter.tags.clone()))
                        .to_owned(),
                ),
            );
        }

        if !filter.company_ids.is_empty() {
            condition =
                condition.add(post::Column::CompanyId.is_in(filter.company_ids.iter().copied()));
        }

        condition
    }

    /// Attach each post's tags, sorted for stable responses.
    async fn with_tags(&self, models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let rows = post_tag::Entity::find()
            .filter(post_tag::Column::PostId.is_in(ids))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let mut tags_by_post: HashMap<Uuid, Vec<String>> = HashMap::new();
        for row in rows {
            tags_by_post.entry(row.post_id).or_default().push(row.tag);
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let mut tags = tags_by_post.remove(&model.id).unwrap_or_default();
                tags.sort();
                model.into_post(tags)
            })
            .collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let model = post::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        match model {
            Some(model) => Ok(self.with_tags(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let condition = Self::filter_condition(filter);

        let total = post::Entity::find()
            .filter(condition.clone())
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        let models = post::Entity::find()
            .filter(condition)
            .order_by_desc(post::Column::PublishedAt)
            .offset(page.offset())
            .limit(page.per_page())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let posts = self.with_tags(models).await?;
        Ok(Page::new(posts, total, page))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = post::Entity::find()
            .filter(post::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        self.with_tags(models).await
    }

    async fn find_scraped_after(&self, since: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let models = post::Entity::find()
            .filter(post::Column::ScrapedAt.gt(since))
            .order_by_asc(post::Column::ScrapedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        self.with_tags(models).await
    }
}
