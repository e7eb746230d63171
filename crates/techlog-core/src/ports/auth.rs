//! Authentication ports: session tokens and the OAuth code exchange.

use async_trait::async_trait;
use uuid::Uuid;

/// Claims stored in session JWTs.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub exp: i64,
}

/// Token service trait for session JWT operations.
pub trait TokenService: Send + Sync {
    /// Mint a session token for a user.
    fn generate_token(&self, user_id: Uuid, email: Option<&str>) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of freshly minted tokens, in seconds.
    fn expiration_seconds(&self) -> i64;
}

/// Profile returned by the OAuth provider after a successful exchange.
#[derive(Debug, Clone)]
pub struct OAuthProfile {
    /// Stable subject identifier at the provider.
    pub subject: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// OAuth client trait - exchanges an authorization code for the user's
/// profile at the external provider.
#[async_trait]
pub trait OAuthClient: Send + Sync {
    /// Provider label stored on the user row (e.g. "github", "google").
    fn provider(&self) -> &str;

    /// Redeem `code` at the token endpoint and fetch the profile.
    async fn exchange_code(&self, code: &str) -> Result<OAuthProfile, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization")]
    MissingAuth,

    #[error("Code exchange failed: {0}")]
    Exchange(String),
}
