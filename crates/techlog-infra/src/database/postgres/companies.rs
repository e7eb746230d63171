//! Company queries.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DbConn, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use techlog_core::domain::{Company, CompanyScope};
use techlog_core::error::RepoError;
use techlog_core::ports::CompanyRepository;

use crate::database::entity::company;

use super::map_db_err;

pub struct PostgresCompanyRepository {
    db: DbConn,
}

impl PostgresCompanyRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CompanyRepository for PostgresCompanyRepository {
    async fn list(&self, scope: CompanyScope) -> Result<Vec<Company>, RepoError> {
        let mut query = company::Entity::find();

        query = match scope {
            CompanyScope::Active => query.filter(company::Column::IsActive.eq(true)),
            CompanyScope::Featured => query
                .filter(company::Column::IsActive.eq(true))
                .filter(company::Column::IsFeatured.eq(true)),
            CompanyScope::All => query,
        };

        let models = query
            .order_by_asc(company::Column::NameEn)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Company::from).collect())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Company>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = company::Entity::find()
            .filter(company::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Company::from).collect())
    }
}
