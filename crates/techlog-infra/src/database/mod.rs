//! PostgreSQL persistence: connection management, entities, and the
//! repository implementations.

mod connections;

pub mod entity;
pub mod postgres;

pub use connections::{DatabaseConfig, connect};
pub use sea_orm::{DbConn, DbErr};

#[cfg(test)]
mod tests;
