//! Company listing endpoint.

use actix_web::{HttpResponse, http::header::ContentType, web};

use techlog_core::domain::CompanyScope;
use techlog_core::ports::{Cache, CompanyRepository};
use techlog_shared::dto::{CompanyListQuery, CompanyResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// List blog companies.
///
/// GET /api/companies?featured=&all=
///
/// `featured=true` narrows to the featured set, `all=true` includes
/// inactive companies, and the default is active companies only.
/// `featured` wins when both flags are given.
pub async fn list_companies(
    state: web::Data<AppState>,
    query: web::Query<CompanyListQuery>,
) -> AppResult<HttpResponse> {
    let (scope, cache_key) = if query.featured.unwrap_or(false) {
        (CompanyScope::Featured, Some("companies:featured"))
    } else if query.all.unwrap_or(false) {
        (CompanyScope::All, None)
    } else {
        (CompanyScope::Active, Some("companies:active"))
    };

    if let Some(key) = cache_key {
        if let Some(cached) = state.cache.get(key).await {
            return Ok(HttpResponse::Ok()
                .content_type(ContentType::json())
                .body(cached));
        }
    }

    let companies = state.companies.list(scope).await?;
    let response: Vec<CompanyResponse> =
        companies.into_iter().map(CompanyResponse::from).collect();

    if let Some(key) = cache_key {
        let body =
            serde_json::to_string(&response).map_err(|e| AppError::Internal(e.to_string()))?;
        if let Err(e) = state
            .cache
            .set(key, &body, Some(state.settings.companies_cache_ttl))
            .await
        {
            tracing::warn!(error = %e, "Failed to cache company listing");
        }
        return Ok(HttpResponse::Ok()
            .content_type(ContentType::json())
            .body(body));
    }

    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test, web};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::handlers::configure_routes;
    use crate::state::AppState;
    use techlog_infra::database::entity::company;

    #[actix_rt::test]
    async fn active_listing_is_served_from_cache_after_the_first_hit() {
        let now = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![company::Model {
                id: Uuid::new_v4(),
                name: "카카오".to_owned(),
                name_en: "kakao".to_owned(),
                logo_url: None,
                blog_url: "https://tech.kakao.com".to_owned(),
                rss_url: None,
                is_active: true,
                is_featured: false,
                created_at: now.into(),
                updated_at: now.into(),
            }]])
            .into_connection();
        let db_handle = db.clone();

        let state = AppState::for_tests(db);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(|cfg| configure_routes(cfg, &state)),
        )
        .await;

        for _ in 0..2 {
            let req = test::TestRequest::get().uri("/api/companies").to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::OK);

            let body: serde_json::Value = test::read_body_json(res).await;
            assert_eq!(body[0]["name"], "카카오");
        }

        // The second response came out of the cache.
        assert_eq!(db_handle.into_transaction_log().len(), 1);
    }
}
