//! Post listing endpoint.

use actix_web::{HttpResponse, http::header::ContentType, web};
use std::collections::HashMap;
use uuid::Uuid;

use techlog_core::domain::Company;
use techlog_core::ports::{Cache, CompanyRepository, PostRepository};
use techlog_shared::dto::{PostListQuery, PostListResponse, PostResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// List posts with optional search, tag, and company filters.
///
/// GET /api/posts?page=&limit=&q=&tags=&companies=
///
/// Responses without a search term are cached per page/filter combination.
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let (filter, page) = query.into_inner().into_parts()?;

    // Search phrases are too varied for the cache to earn its keep.
    let cache_key = (!filter.has_search()).then(|| {
        format!(
            "posts:p={}:pp={}:{}",
            page.page(),
            page.per_page(),
            filter.cache_key()
        )
    });

    if let Some(key) = &cache_key {
        if let Some(cached) = state.cache.get(key).await {
            return Ok(HttpResponse::Ok()
                .content_type(ContentType::json())
                .body(cached));
        }
    }

    let posts = state.posts.list(&filter, page).await?;
    let companies = companies_by_id(&state, posts.items.iter().map(|p| p.company_id)).await?;

    let response = PostListResponse::from_page(posts.map(|post| {
        let company = companies.get(&post.company_id);
        PostResponse::from_post(post, company)
    }));

    if let Some(key) = cache_key {
        let body =
            serde_json::to_string(&response).map_err(|e| AppError::Internal(e.to_string()))?;
        if let Err(e) = state
            .cache
            .set(&key, &body, Some(state.settings.posts_cache_ttl))
            .await
        {
            tracing::warn!(error = %e, "Failed to cache post listing");
        }
        return Ok(HttpResponse::Ok()
            .content_type(ContentType::json())
            .body(body));
    }

    Ok(HttpResponse::Ok().json(response))
}

/// Fetch posts by id and build their listing entries, keyed by post id.
///
/// Shared by the bookmark and recent-view handlers, which store post ids
/// and hydrate them at read time. Ids whose post has been deleted are
/// silently absent from the map.
pub(super) async fn response_map(
    state: &AppState,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, PostResponse>, AppError> {
    let posts = state.posts.find_by_ids(ids).await?;
    let companies = companies_by_id(state, posts.iter().map(|p| p.company_id)).await?;

    Ok(posts
        .into_iter()
        .map(|post| {
            let company = companies.get(&post.company_id);
            (post.id, PostResponse::from_post(post, company))
        })
        .collect())
}

async fn companies_by_id(
    state: &AppState,
    ids: impl Iterator<Item = Uuid>,
) -> Result<HashMap<Uuid, Company>, AppError> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort_unstable();
    ids.dedup();

    let companies = state.companies.find_by_ids(&ids).await?;
    Ok(companies.into_iter().map(|c| (c.id, c)).collect())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use actix_web::{App, http::StatusCode, test, web};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use uuid::Uuid;

    use crate::handlers::configure_routes;
    use crate::state::AppState;
    use techlog_infra::database::entity::{company, post, post_tag};

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    #[actix_rt::test]
    async fn listing_hydrates_companies_and_reports_totals() {
        let company_id = Uuid::new_v4();
        let post_id = Uuid::new_v4();
        let now = Utc::now();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(41)]])
            .append_query_results([vec![post::Model {
                id: post_id,
                company_id,
                title: "HTTP/3 살펴보기".to_owned(),
                url: "https://techblog.woowahan.com/http3".to_owned(),
                summary: None,
                author: None,
                published_at: now.into(),
                scraped_at: now.into(),
                created_at: now.into(),
                updated_at: now.into(),
            }]])
            .append_query_results([vec![post_tag::Model {
                post_id,
                tag: "network".to_owned(),
            }]])
            .append_query_results([vec![company::Model {
                id: company_id,
                name: "우아한형제들".to_owned(),
                name_en: "woowahan".to_owned(),
                logo_url: None,
                blog_url: "https://techblog.woowahan.com".to_owned(),
                rss_url: None,
                is_active: true,
                is_featured: true,
                created_at: now.into(),
                updated_at: now.into(),
            }]])
            .into_connection();

        let state = AppState::for_tests(db);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(|cfg| configure_routes(cfg, &state)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/posts?page=2")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["total"], 41);
        assert_eq!(body["totalPages"], 3);
        assert_eq!(body["posts"][0]["tags"][0], "network");
        assert_eq!(body["posts"][0]["company"]["name"], "우아한형제들");
    }

    #[actix_rt::test]
    async fn malformed_company_filter_is_a_bad_request() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = AppState::for_tests(db);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(|cfg| configure_routes(cfg, &state)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/posts?companies=not-a-uuid")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
