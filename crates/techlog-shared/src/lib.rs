//! # Techlog Shared
//!
//! Wire types shared between the API server and frontends. Response JSON
//! is camelCase; failures use the `{ "error": ..., "details": ... }`
//! envelope.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
