//! OAuth login, session info, and logout.
//!
//! Login is redirect-based: the frontend sends the user to the provider,
//! the provider redirects back to `/auth/callback?code=...`, and the
//! callback answers with a redirect to the frontend carrying either a
//! session cookie or an error marker in the query string.

use actix_web::{
    HttpResponse,
    cookie::{Cookie, SameSite},
    http::header,
    web,
};

use techlog_core::domain::User;
use techlog_core::ports::{OAuthClient, TokenService, UserRepository};
use techlog_shared::dto::{AuthCallbackQuery, UserResponse};

use crate::middleware::auth::{Identity, SESSION_COOKIE};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// OAuth redirect target.
///
/// GET /auth/callback?code=...&state=...
///
/// Always responds with a 302 to the frontend; failures are reported as
/// `?error=auth_failed` in the redirect rather than an error page,
/// since the browser is mid-navigation here.
pub async fn callback(
    state: web::Data<AppState>,
    query: web::Query<AuthCallbackQuery>,
) -> HttpResponse {
    let code = match &query.code {
        Some(code) if !code.trim().is_empty() => code.trim().to_owned(),
        _ => {
            tracing::warn!("OAuth callback without a code");
            return failure_redirect(&state);
        }
    };

    match login_with_code(&state, &code).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "OAuth login failed");
            failure_redirect(&state)
        }
    }
}

async fn login_with_code(state: &AppState, code: &str) -> Result<HttpResponse, AppError> {
    let profile = state.oauth.exchange_code(code).await?;

    let user = state
        .users
        .upsert_by_provider(User::from_oauth(
            state.oauth.provider().to_owned(),
            profile.subject,
            profile.email,
            profile.display_name,
            profile.avatar_url,
        ))
        .await?;

    let token = state
        .tokens
        .generate_token(user.id, user.email.as_deref())?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(HttpResponse::Found()
        .insert_header((
            header::LOCATION,
            format!("{}?login=success", state.settings.frontend_url),
        ))
        .cookie(session_cookie(state, &token))
        .finish())
}

fn session_cookie(state: &AppState, token: &str) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token.to_owned())
        .path("/")
        .http_only(true)
        .secure(state.settings.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(actix_web::cookie::time::Duration::seconds(
            state.tokens.expiration_seconds(),
        ))
        .finish()
}

fn failure_redirect(state: &AppState) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((
            header::LOCATION,
            format!("{}?error=auth_failed", state.settings.frontend_url),
        ))
        .finish()
}

/// The logged-in user's profile.
///
/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Clear the session cookie.
///
/// POST /api/auth/logout
pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .finish();
    cookie.make_removal();

    HttpResponse::NoContent().cookie(cookie).finish()
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test, web};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::handlers::configure_routes;
    use crate::state::AppState;

    #[actix_rt::test]
    async fn callback_without_a_code_redirects_with_an_error_marker() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = AppState::for_tests(db);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(|cfg| configure_routes(cfg, &state)),
        )
        .await;

        let req = test::TestRequest::get().uri("/auth/callback").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FOUND);

        let location = res.headers().get("location").unwrap().to_str().unwrap();
        assert!(location.ends_with("error=auth_failed"));
    }

    #[actix_rt::test]
    async fn logout_clears_the_session_cookie() {
        let res = super::logout().await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let cookie = res.cookies().next().unwrap();
        assert_eq!(cookie.name(), super::SESSION_COOKIE);
        assert!(cookie.value().is_empty());
    }
}
