//! Bookmark endpoints.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use techlog_core::domain::Bookmark;
use techlog_core::ports::{BookmarkRepository, PostRepository};
use techlog_shared::dto::{BookmarkResponse, CreateBookmarkRequest};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::posts::response_map;

/// List the caller's bookmarks, newest first, hydrated into post entries.
///
/// GET /api/bookmarks
///
/// Anonymous callers get an empty list rather than a 401; the frontend
/// renders the same page either way.
pub async fn list_bookmarks(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let Some(identity) = identity.0 else {
        return Ok(HttpResponse::Ok().json(Vec::<BookmarkResponse>::new()));
    };

    let bookmarks = state.bookmarks.list_for_user(identity.user_id).await?;
    let ids: Vec<Uuid> = bookmarks.iter().map(|b| b.post_id).collect();
    let mut posts = response_map(&state, &ids).await?;

    // Bookmarks whose post has since been deleted are dropped.
    let response: Vec<BookmarkResponse> = bookmarks
        .into_iter()
        .filter_map(|bookmark| {
            posts.remove(&bookmark.post_id).map(|post| BookmarkResponse {
                post,
                created_at: bookmark.created_at,
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Bookmark a post.
///
/// POST /api/bookmarks
///
/// 201 on a new bookmark, 200 when the pair already existed, 404 when
/// the post does not exist.
pub async fn create_bookmark(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateBookmarkRequest>,
) -> AppResult<HttpResponse> {
    let post_id = body.post_id;

    if state.posts.find_by_id(post_id).await?.is_none() {
        return Err(AppError::NotFound("post not found".to_owned()));
    }

    let created = state
        .bookmarks
        .add(Bookmark::new(identity.user_id, post_id))
        .await?;

    if created {
        Ok(HttpResponse::Created().finish())
    } else {
        Ok(HttpResponse::Ok().finish())
    }
}

/// Remove a bookmark.
///
/// DELETE /api/bookmarks/{post_id}
pub async fn delete_bookmark(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .bookmarks
        .remove(identity.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::{App, cookie::Cookie, http::StatusCode, test, web};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::handlers::configure_routes;
    use crate::middleware::auth::SESSION_COOKIE;
    use crate::state::AppState;
    use techlog_core::ports::TokenService;
    use techlog_infra::database::entity::post;

    #[actix_rt::test]
    async fn anonymous_listing_is_empty_not_unauthorized() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = AppState::for_tests(db);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(|cfg| configure_routes(cfg, &state)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/bookmarks").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn bookmarking_a_missing_post_is_a_404() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();
        let state = AppState::for_tests(db);
        let token = state
            .tokens
            .generate_token(Uuid::new_v4(), None)
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(|cfg| configure_routes(cfg, &state)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/bookmarks")
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .set_json(serde_json::json!({ "postId": Uuid::new_v4() }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
