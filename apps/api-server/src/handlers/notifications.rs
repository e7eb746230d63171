//! Notification preference and push subscription endpoints.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use techlog_core::domain::{DeviceOs, NotificationPreference, PushSubscription};
use techlog_core::ports::NotificationRepository;
use techlog_shared::dto::{
    PreferencesResponse, RegisterSubscriptionRequest, SubscriptionResponse,
    UpdatePreferencesRequest, UpdateSubscriptionRequest,
};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// The caller's notification toggles.
///
/// GET /api/notifications/preferences
///
/// Anonymous callers and users without a stored row both get the
/// defaults (everything on).
pub async fn get_preferences(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let Some(identity) = identity.0 else {
        return Ok(HttpResponse::Ok().json(PreferencesResponse {
            new_posts: true,
            announcements: true,
        }));
    };

    let preference = state
        .notifications
        .find_preference(identity.user_id)
        .await?
        .unwrap_or_else(|| NotificationPreference::default_for(identity.user_id));

    Ok(HttpResponse::Ok().json(PreferencesResponse::from(preference)))
}

/// Replace the caller's notification toggles.
///
/// POST /api/notifications/preferences
pub async fn update_preferences(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdatePreferencesRequest>,
) -> AppResult<HttpResponse> {
    let preference = NotificationPreference {
        user_id: identity.user_id,
        new_posts: body.new_posts,
        announcements: body.announcements,
        updated_at: Utc::now(),
    };

    let stored = state.notifications.upsert_preference(preference).await?;
    Ok(HttpResponse::Ok().json(PreferencesResponse::from(stored)))
}

/// Register a Web Push subscription for this browser/device.
///
/// POST /api/notifications/subscriptions
///
/// Re-registering a known endpoint refreshes its keys and re-enables it.
pub async fn register_subscription(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<RegisterSubscriptionRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    if body.endpoint.trim().is_empty() {
        return Err(AppError::BadRequest("endpoint is required".to_owned()));
    }

    let subscription = PushSubscription::new(
        identity.user_id,
        body.endpoint,
        body.keys.p256dh,
        body.keys.auth,
        DeviceOs::parse(&body.device_os),
    );

    let stored = state.notifications.upsert_subscription(subscription).await?;
    Ok(HttpResponse::Created().json(SubscriptionResponse::from(stored)))
}

/// Enable or disable one subscription.
///
/// PUT /api/notifications/subscriptions/{subscription_id}
pub async fn update_subscription(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateSubscriptionRequest>,
) -> AppResult<HttpResponse> {
    state
        .notifications
        .set_subscription_enabled(identity.user_id, path.into_inner(), body.enabled)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Drop one subscription.
///
/// DELETE /api/notifications/subscriptions/{subscription_id}
pub async fn delete_subscription(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .notifications
        .delete_subscription(identity.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test, web};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::handlers::configure_routes;
    use crate::state::AppState;

    #[actix_rt::test]
    async fn anonymous_preferences_are_the_defaults() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = AppState::for_tests(db);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(|cfg| configure_routes(cfg, &state)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/notifications/preferences")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["newPosts"], true);
        assert_eq!(body["announcements"], true);
    }
}
