//! HTTP handlers and route configuration.

mod announcements;
mod auth;
mod bookmarks;
mod companies;
mod health;
mod notifications;
mod posts;
mod recent_views;

use actix_web::web;

use crate::middleware::rate_limit::RateLimitMiddleware;
use crate::state::AppState;

/// Configure all application routes.
///
/// Authenticated scopes are registered before the public catch-all scope;
/// actix matches scopes in registration order.
pub fn configure_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    let public = RateLimitMiddleware::new(state.public_limiter.clone(), "public");
    let authed = RateLimitMiddleware::new(state.authed_limiter.clone(), "authed");

    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/bookmarks")
                    .wrap(authed.clone())
                    .route("", web::get().to(bookmarks::list_bookmarks))
                    .route("", web::post().to(bookmarks::create_bookmark))
                    .route("/{post_id}", web::delete().to(bookmarks::delete_bookmark)),
            )
            .service(
                web::scope("/recent-views")
                    .wrap(authed.clone())
                    .route("", web::get().to(recent_views::list_recent_views))
                    .route("", web::post().to(recent_views::record_view))
                    .route("/sync", web::post().to(recent_views::sync_recent_views)),
            )
            .service(
                web::scope("/notifications")
                    .wrap(authed.clone())
                    .route(
                        "/preferences",
                        web::get().to(notifications::get_preferences),
                    )
                    .route(
                        "/preferences",
                        web::post().to(notifications::update_preferences),
                    )
                    .route(
                        "/subscriptions",
                        web::post().to(notifications::register_subscription),
                    )
                    .route(
                        "/subscriptions/{subscription_id}",
                        web::put().to(notifications::update_subscription),
                    )
                    .route(
                        "/subscriptions/{subscription_id}",
                        web::delete().to(notifications::delete_subscription),
                    ),
            )
            .service(
                web::scope("/auth")
                    .wrap(authed)
                    .route("/me", web::get().to(auth::me))
                    .route("/logout", web::post().to(auth::logout)),
            )
            .service(
                web::scope("")
                    .wrap(public.clone())
                    .route("/health", web::get().to(health::health_check))
                    .route("/posts", web::get().to(posts::list_posts))
                    .route("/companies", web::get().to(companies::list_companies))
                    .route(
                        "/announcements",
                        web::get().to(announcements::list_announcements),
                    ),
            ),
    )
    .service(
        web::scope("/auth")
            .wrap(public)
            .route("/callback", web::get().to(auth::callback)),
    );
}
