//! Session extraction: the `Identity` extractor and its optional variant.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::{Ready, ready};
use uuid::Uuid;

use techlog_core::ports::{AuthError, TokenClaims, TokenService};
use techlog_shared::ErrorResponse;

use crate::state::AppState;

/// Cookie the session JWT travels in. A `Bearer` header works too.
pub const SESSION_COOKIE: &str = "techlog_session";

/// The authenticated caller. Extracting it rejects anonymous requests
/// with a 401; use [`OptionalIdentity`] where anonymous is allowed.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: Option<String>,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
        }
    }
}

/// Session token from the cookie, falling back to the Authorization
/// header.
fn token_from_request(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(String::from)
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match &self.0 {
            AuthError::Exchange(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            _ => actix_web::http::StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        let error = match &self.0 {
            AuthError::TokenExpired => {
                ErrorResponse::new("Session expired").with_details("Log in again")
            }
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new("Invalid session").with_details(msg.clone())
            }
            AuthError::MissingAuth | AuthError::InvalidCredentials => {
                ErrorResponse::unauthorized()
            }
            AuthError::Exchange(_) => ErrorResponse::internal_error(),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            tracing::error!("AppState missing from app data");
            return ready(Err(AuthenticationError(AuthError::InvalidToken(
                "server configuration error".to_string(),
            ))));
        };

        let Some(token) = token_from_request(req) else {
            return ready(Err(AuthenticationError(AuthError::MissingAuth)));
        };

        match state.tokens.validate_token(&token) {
            Ok(claims) => ready(Ok(Identity::from(claims))),
            Err(e) => ready(Err(AuthenticationError(e))),
        }
    }
}

/// Optional identity extractor. Anonymous callers yield `None` instead
/// of a 401; GET collection endpoints use this to serve empty lists.
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        match Identity::from_request(req, payload).into_inner() {
            Ok(identity) => ready(Ok(OptionalIdentity(Some(identity)))),
            Err(_) => ready(Ok(OptionalIdentity(None))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_state() -> AppState {
        AppState::for_tests(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn extract(req: &HttpRequest) -> Result<Identity, AuthenticationError> {
        Identity::from_request(req, &mut Payload::None).into_inner()
    }

    #[actix_rt::test]
    async fn cookie_session_is_accepted() {
        let state = test_state();
        let user_id = Uuid::new_v4();
        let token = state
            .tokens
            .generate_token(user_id, Some("dev@techlog.kr"))
            .unwrap();

        let req = TestRequest::default()
            .app_data(web::Data::new(state))
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .to_http_request();

        let identity = extract(&req).unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.email.as_deref(), Some("dev@techlog.kr"));
    }

    #[actix_rt::test]
    async fn bearer_header_is_accepted() {
        let state = test_state();
        let user_id = Uuid::new_v4();
        let token = state.tokens.generate_token(user_id, None).unwrap();

        let req = TestRequest::default()
            .app_data(web::Data::new(state))
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_http_request();

        assert_eq!(extract(&req).unwrap().user_id, user_id);
    }

    #[actix_rt::test]
    async fn anonymous_requests_are_rejected() {
        let req = TestRequest::default()
            .app_data(web::Data::new(test_state()))
            .to_http_request();

        let err = extract(&req).unwrap_err();
        assert!(matches!(err.0, AuthError::MissingAuth));
    }

    #[actix_rt::test]
    async fn garbage_tokens_are_rejected() {
        let req = TestRequest::default()
            .app_data(web::Data::new(test_state()))
            .cookie(Cookie::new(SESSION_COOKIE, "not-a-jwt"))
            .to_http_request();

        let err = extract(&req).unwrap_err();
        assert!(matches!(err.0, AuthError::InvalidToken(_)));
    }

    #[actix_rt::test]
    async fn optional_identity_defaults_to_none() {
        let req = TestRequest::default()
            .app_data(web::Data::new(test_state()))
            .to_http_request();

        let optional = OptionalIdentity::from_request(&req, &mut Payload::None)
            .into_inner()
            .unwrap();
        assert!(optional.0.is_none());
    }
}
