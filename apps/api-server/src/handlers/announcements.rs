//! Announcement listing endpoint.

use actix_web::{HttpResponse, web};

use techlog_core::ports::AnnouncementRepository;
use techlog_shared::dto::AnnouncementResponse;

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// List service announcements, pinned first.
///
/// GET /api/announcements
pub async fn list_announcements(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let announcements = state.announcements.list().await?;
    let response: Vec<AnnouncementResponse> = announcements
        .into_iter()
        .map(AnnouncementResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(response))
}
