use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Teacher Router Module
///
/// Announcement management. Every handler here forwards `teacher_username` to the service,
/// which checks it against the teacher directory before doing anything else.
pub fn teacher_routes() -> Router<AppState> {
    Router::new()
        // GET /announcements/all?teacher_username=...
        // Every announcement, including expired and scheduled ones.
        // PUT/DELETE here treat "all" as an announcement id.
        .route(
            "/announcements/all",
            get(handlers::get_all_announcements)
                .put(handlers::update_announcement_all)
                .delete(handlers::delete_announcement_all),
        )
        // POST /announcements?message=...&expiration_date=...&start_date=...&teacher_username=...
        .route("/announcements", post(handlers::create_announcement))
        .route("/announcements/", post(handlers::create_announcement))
        // PUT/DELETE /announcements/{id}
        // The id is resolved by the service so malformed ids yield 400, unknown ids 404.
        .route(
            "/announcements/{id}",
            put(handlers::update_announcement).delete(handlers::delete_announcement),
        )
}
