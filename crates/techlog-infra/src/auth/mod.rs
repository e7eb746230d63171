//! Authentication implementations: session JWTs and the OAuth exchange.

mod jwt;
mod oauth;

pub use jwt::{JwtConfig, JwtTokenService};
pub use oauth::{HttpOAuthClient, OAuthConfig};
