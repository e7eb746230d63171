//! Migration CLI. `cargo run -p migration -- up` against DATABASE_URL.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    cli::run_cli(migration::Migrator).await;
}
