//! Recent view endpoints.
//!
//! The frontend keeps a local mirror of recently opened posts for
//! logged-out readers; `/sync` folds that mirror into the server-side
//! history on login.

use actix_web::{HttpResponse, web};
use std::collections::HashSet;
use uuid::Uuid;

use techlog_core::domain::{RecentView, merge_recent_views};
use techlog_core::ports::{PostRepository, RecentViewRepository};
use techlog_shared::dto::{
    RecentViewEntry, RecentViewResponse, RecordViewRequest, SyncRecentViewsRequest,
    SyncRecentViewsResponse,
};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::posts::response_map;

/// List the caller's recently viewed posts, most recent first.
///
/// GET /api/recent-views
pub async fn list_recent_views(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let Some(identity) = identity.0 else {
        return Ok(HttpResponse::Ok().json(Vec::<RecentViewResponse>::new()));
    };

    let views = state.recent_views.list_for_user(identity.user_id).await?;
    let ids: Vec<Uuid> = views.iter().map(|v| v.post_id).collect();
    let mut posts = response_map(&state, &ids).await?;

    let response: Vec<RecentViewResponse> = views
        .into_iter()
        .filter_map(|view| {
            posts.remove(&view.post_id).map(|post| RecentViewResponse {
                post,
                viewed_at: view.viewed_at,
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Record that the caller opened a post.
///
/// POST /api/recent-views
pub async fn record_view(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<RecordViewRequest>,
) -> AppResult<HttpResponse> {
    let post_id = body.post_id;

    if state.posts.find_by_id(post_id).await?.is_none() {
        return Err(AppError::NotFound("post not found".to_owned()));
    }

    state
        .recent_views
        .record(identity.user_id, RecentView::new(post_id))
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Merge the client's local view history into the server's.
///
/// POST /api/recent-views/sync
///
/// Entries pointing at unknown posts are discarded. The response carries
/// the merged history the client should keep from now on.
pub async fn sync_recent_views(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<SyncRecentViewsRequest>,
) -> AppResult<HttpResponse> {
    let client: Vec<RecentView> = body
        .into_inner()
        .entries
        .into_iter()
        .map(RecentView::from)
        .collect();

    let ids: Vec<Uuid> = client.iter().map(|v| v.post_id).collect();
    let known: HashSet<Uuid> = state
        .posts
        .find_by_ids(&ids)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();
    let client: Vec<RecentView> = client
        .into_iter()
        .filter(|v| known.contains(&v.post_id))
        .collect();

    let server = state.recent_views.list_for_user(identity.user_id).await?;
    let merged = merge_recent_views(server, client);

    state
        .recent_views
        .replace_all(identity.user_id, &merged)
        .await?;

    let entries: Vec<RecentViewEntry> = merged.into_iter().map(RecentViewEntry::from).collect();
    Ok(HttpResponse::Ok().json(SyncRecentViewsResponse { entries }))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test, web};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::handlers::configure_routes;
    use crate::state::AppState;

    #[actix_rt::test]
    async fn recording_a_view_requires_a_session() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = AppState::for_tests(db);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(|cfg| configure_routes(cfg, &state)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/recent-views")
            .set_json(serde_json::json!({ "postId": uuid::Uuid::new_v4() }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
