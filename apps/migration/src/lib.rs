//! Schema migrations for the techlog database.
//!
//! `companies`, `posts` and `post_tags` are written by the scraper
//! pipeline; the remaining tables belong to the API service.

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_companies_posts;
mod m20250301_000002_create_users_activity;
mod m20250301_000003_create_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_companies_posts::Migration),
            Box::new(m20250301_000002_create_users_activity::Migration),
            Box::new(m20250301_000003_create_notifications::Migration),
        ]
    }
}
