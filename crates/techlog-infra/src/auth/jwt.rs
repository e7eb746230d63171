//! JWT session token service.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use techlog_core::ports::{AuthError, TokenClaims, TokenService};

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            expiration_hours: 24 * 14,
            issuer: "techlog-api".to_string(),
        }
    }
}

/// Internal JWT claims structure for serialization.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    exp: i64,    // expiration timestamp
    iat: i64,    // issued at
    iss: String, // issuer
}

/// JWT-based session token service. Tokens travel either in the session
/// cookie or in an `Authorization: Bearer` header.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            encoding_key,
            decoding_key,
            config,
        }
    }

    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-me-in-production".to_string());

        if secret == "change-me-in-production" {
            tracing::warn!("JWT_SECRET is unset; sessions are signed with the placeholder secret");
        }

        let config = JwtConfig {
            secret,
            expiration_hours: std::env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(24 * 14),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "techlog-api".to_string()),
        };
        Self::new(config)
    }
}

impl TokenService for JwtTokenService {
    fn generate_token(&self, user_id: Uuid, email: Option<&str>) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + TimeDelta::hours(self.config.expiration_hours);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.map(String::from),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let user_id = Uuid::parse_str(&token_data.claims.sub)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(TokenClaims {
            user_id,
            email: token_data.claims.email,
            exp: token_data.claims.exp,
        })
    }

    fn expiration_seconds(&self) -> i64 {
        self.config.expiration_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key".to_string(),
            expiration_hours: 1,
            issuer: "test-issuer".to_string(),
        }
    }

    #[test]
    fn generates_a_token() {
        let service = JwtTokenService::new(test_config());
        let token = service
            .generate_token(Uuid::new_v4(), Some("user@example.com"))
            .unwrap();
        assert!(!token.is_empty());
    }

    #[test]
    fn round_trips_claims() {
        let service = JwtTokenService::new(test_config());
        let user_id = Uuid::new_v4();

        let token = service
            .generate_token(user_id, Some("user@example.com"))
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.email.as_deref(), Some("user@example.com"));
    }

    #[test]
    fn round_trips_without_email() {
        let service = JwtTokenService::new(test_config());
        let token = service.generate_token(Uuid::new_v4(), None).unwrap();
        assert!(service.validate_token(&token).unwrap().email.is_none());
    }

    #[test]
    fn rejects_garbage_tokens() {
        let service = JwtTokenService::new(test_config());
        let result = service.validate_token("not-a-token");
        assert!(matches!(result.unwrap_err(), AuthError::InvalidToken(_)));
    }

    #[test]
    fn expired_tokens_are_rejected_as_expired() {
        // An hour in the past is well outside the default decode leeway.
        let service = JwtTokenService::new(JwtConfig {
            expiration_hours: -1,
            ..test_config()
        });

        let token = service.generate_token(Uuid::new_v4(), None).unwrap();
        let result = service.validate_token(&token);
        assert!(matches!(result.unwrap_err(), AuthError::TokenExpired));
    }

    #[test]
    fn rejects_tokens_from_another_issuer() {
        let issue = |issuer: &str| {
            JwtTokenService::new(JwtConfig {
                secret: "same-secret".to_string(),
                expiration_hours: 1,
                issuer: issuer.to_string(),
            })
        };

        let token = issue("issuer1")
            .generate_token(Uuid::new_v4(), None)
            .unwrap();
        assert!(issue("issuer2").validate_token(&token).is_err());
    }

    #[test]
    fn expiration_seconds_matches_config() {
        let service = JwtTokenService::new(JwtConfig {
            secret: "test".to_string(),
            expiration_hours: 24,
            issuer: "test".to_string(),
        });
        assert_eq!(service.expiration_seconds(), 86400);
    }
}
