//! OAuth code exchange against the configured provider.
//!
//! The callback handler redeems the authorization code at the token
//! endpoint, then fetches the user profile from the userinfo endpoint.
//! Endpoint URLs come from the environment so the same client serves
//! GitHub, Google, or any OIDC-style provider.

use async_trait::async_trait;
use serde::Deserialize;

use techlog_core::ports::{AuthError, OAuthClient, OAuthProfile};

/// OAuth provider configuration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Provider label stored on user rows (e.g. "github").
    pub provider: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            provider: "github".to_string(),
            token_url: String::new(),
            userinfo_url: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: String::new(),
        }
    }
}

impl OAuthConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` unless both provider endpoints are set; the server
    /// still starts without them, but logins fail.
    pub fn from_env() -> Option<Self> {
        let token_url = std::env::var("OAUTH_TOKEN_URL").ok()?;
        let userinfo_url = std::env::var("OAUTH_USERINFO_URL").ok()?;

        Some(Self {
            provider: std::env::var("OAUTH_PROVIDER").unwrap_or_else(|_| "github".to_string()),
            token_url,
            userinfo_url,
            client_id: std::env::var("OAUTH_CLIENT_ID").unwrap_or_default(),
            client_secret: std::env::var("OAUTH_CLIENT_SECRET").unwrap_or_default(),
            redirect_url: std::env::var("OAUTH_REDIRECT_URL").unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// HTTP OAuth client backed by reqwest.
pub struct HttpOAuthClient {
    config: OAuthConfig,
    http: reqwest::Client,
}

impl HttpOAuthClient {
    pub fn new(config: OAuthConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self { config, http }
    }
}

#[async_trait]
impl OAuthClient for HttpOAuthClient {
    fn provider(&self) -> &str {
        &self.config.provider
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthProfile, AuthError> {
        let token: TokenResponse = self
            .http
            .post(&self.config.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_url.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Exchange(format!("token request failed: {e}")))?
            .error_for_status()
            .map_err(|e| AuthError::Exchange(format!("token endpoint rejected the code: {e}")))?
            .json()
            .await
            .map_err(|e| AuthError::Exchange(format!("malformed token response: {e}")))?;

        let userinfo: serde_json::Value = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(&token.access_token)
            .header(reqwest::header::USER_AGENT, "techlog-api")
            .send()
            .await
            .map_err(|e| AuthError::Exchange(format!("userinfo request failed: {e}")))?
            .error_for_status()
            .map_err(|e| AuthError::Exchange(format!("userinfo rejected the token: {e}")))?
            .json()
            .await
            .map_err(|e| AuthError::Exchange(format!("malformed userinfo response: {e}")))?;

        profile_from_json(&userinfo)
    }
}

/// Map a provider userinfo document onto the profile fields we keep.
/// Providers disagree on field names; accept the common spellings
/// (OIDC `sub`/`name`/`picture`, GitHub `id`/`login`/`avatar_url`).
fn profile_from_json(value: &serde_json::Value) -> Result<OAuthProfile, AuthError> {
    let subject = value
        .get("sub")
        .and_then(json_string)
        .or_else(|| value.get("id").and_then(json_string))
        .ok_or_else(|| AuthError::Exchange("userinfo carries no subject".to_string()))?;

    let display_name = value
        .get("name")
        .and_then(json_string)
        .or_else(|| value.get("login").and_then(json_string));

    let avatar_url = value
        .get("avatar_url")
        .and_then(json_string)
        .or_else(|| value.get("picture").and_then(json_string));

    Ok(OAuthProfile {
        subject,
        email: value.get("email").and_then(json_string),
        display_name,
        avatar_url,
    })
}

/// GitHub sends numeric ids; OIDC subjects are strings. Treat both as
/// strings.
fn json_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_github_style_userinfo() {
        let profile = profile_from_json(&json!({
            "id": 583231,
            "login": "octocat",
            "avatar_url": "https://avatars.githubusercontent.com/u/583231",
            "email": "octocat@github.com",
        }))
        .unwrap();

        assert_eq!(profile.subject, "583231");
        assert_eq!(profile.display_name.as_deref(), Some("octocat"));
        assert_eq!(profile.email.as_deref(), Some("octocat@github.com"));
        assert!(profile.avatar_url.is_some());
    }

    #[test]
    fn parses_oidc_style_userinfo() {
        let profile = profile_from_json(&json!({
            "sub": "1089-4412",
            "name": "Kim Jiyoung",
            "picture": "https://lh3.example.com/photo.jpg",
        }))
        .unwrap();

        assert_eq!(profile.subject, "1089-4412");
        assert_eq!(profile.display_name.as_deref(), Some("Kim Jiyoung"));
        assert_eq!(
            profile.avatar_url.as_deref(),
            Some("https://lh3.example.com/photo.jpg")
        );
        assert!(profile.email.is_none());
    }

    #[test]
    fn prefers_full_name_over_login() {
        let profile = profile_from_json(&json!({
            "id": 1,
            "login": "octocat",
            "name": "The Octocat",
        }))
        .unwrap();

        assert_eq!(profile.display_name.as_deref(), Some("The Octocat"));
    }

    #[test]
    fn rejects_userinfo_without_subject() {
        let result = profile_from_json(&json!({"name": "nobody"}));
        assert!(matches!(result, Err(AuthError::Exchange(_))));
    }
}
