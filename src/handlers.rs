use crate::{
    AnnouncementService,
    error::{AnnouncementError, ErrorResponse},
    models::{Announcement, AnnouncementParams, DeleteConfirmation, TeacherParams},
};
use axum::{
    Json,
    extract::{Path, Query, State},
};

// --- Handlers ---
//
// Handlers only translate HTTP into service calls. Every rule (authentication, identifier
// resolution, date validation, visibility) is enforced by `AnnouncementService`, and
// `AnnouncementError` renders itself into the matching status code.

/// get_active_announcements
///
/// [Public Route] Lists announcements that are visible today: not expired, and either without
/// a start date or already started. Newest first.
#[utoipa::path(
    get,
    path = "/announcements",
    responses((status = 200, description = "Active announcements", body = [Announcement]))
)]
pub async fn get_active_announcements(
    State(service): State<AnnouncementService>,
) -> Result<Json<Vec<Announcement>>, AnnouncementError> {
    let announcements = service.list_active().await?;
    Ok(Json(announcements))
}

/// get_all_announcements
///
/// [Teacher Route] Lists every announcement, including expired and scheduled ones.
#[utoipa::path(
    get,
    path = "/announcements/all",
    params(TeacherParams),
    responses(
        (status = 200, description = "All announcements", body = [Announcement]),
        (status = 401, description = "Unknown teacher", body = ErrorResponse)
    )
)]
pub async fn get_all_announcements(
    State(service): State<AnnouncementService>,
    Query(params): Query<TeacherParams>,
) -> Result<Json<Vec<Announcement>>, AnnouncementError> {
    let announcements = service.list_all(&params.teacher_username).await?;
    Ok(Json(announcements))
}

/// create_announcement
///
/// [Teacher Route] Creates an announcement authored by `teacher_username`.
#[utoipa::path(
    post,
    path = "/announcements",
    params(AnnouncementParams),
    responses(
        (status = 200, description = "Created", body = Announcement),
        (status = 400, description = "Malformed date or empty message", body = ErrorResponse),
        (status = 401, description = "Unknown teacher", body = ErrorResponse)
    )
)]
pub async fn create_announcement(
    State(service): State<AnnouncementService>,
    Query(params): Query<AnnouncementParams>,
) -> Result<Json<Announcement>, AnnouncementError> {
    let teacher_username = params.teacher_username.clone();
    let announcement = service
        .create(params.into(), &teacher_username)
        .await?;
    Ok(Json(announcement))
}

/// update_announcement
///
/// [Teacher Route] Replaces message and dates of an existing announcement.
///
/// The path segment is taken as a raw string so a malformed identifier reaches the service
/// and is reported as `Invalid announcement ID` rather than as an extractor rejection.
#[utoipa::path(
    put,
    path = "/announcements/{id}",
    params(("id" = String, Path, description = "Announcement ID"), AnnouncementParams),
    responses(
        (status = 200, description = "Updated", body = Announcement),
        (status = 400, description = "Invalid ID, malformed date or empty message", body = ErrorResponse),
        (status = 401, description = "Unknown teacher", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn update_announcement(
    State(service): State<AnnouncementService>,
    Path(id): Path<String>,
    Query(params): Query<AnnouncementParams>,
) -> Result<Json<Announcement>, AnnouncementError> {
    let teacher_username = params.teacher_username.clone();
    let announcement = service
        .update(&id, params.into(), &teacher_username)
        .await?;
    Ok(Json(announcement))
}

/// delete_announcement
///
/// [Teacher Route] Permanently removes an announcement.
#[utoipa::path(
    delete,
    path = "/announcements/{id}",
    params(("id" = String, Path, description = "Announcement ID"), TeacherParams),
    responses(
        (status = 200, description = "Deleted", body = DeleteConfirmation),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 401, description = "Unknown teacher", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn delete_announcement(
    State(service): State<AnnouncementService>,
    Path(id): Path<String>,
    Query(params): Query<TeacherParams>,
) -> Result<Json<DeleteConfirmation>, AnnouncementError> {
    let confirmation = service
        .delete(&id, &params.teacher_username)
        .await?;
    Ok(Json(confirmation))
}

// The static `/announcements/all` segment outranks `{id}`, so PUT and DELETE on it land here.
// "all" then goes through the service like any other identifier and is rejected as malformed.
const ALL_SEGMENT: &str = "all";

pub async fn update_announcement_all(
    State(service): State<AnnouncementService>,
    Query(params): Query<AnnouncementParams>,
) -> Result<Json<Announcement>, AnnouncementError> {
    update_announcement(State(service), Path(ALL_SEGMENT.to_string()), Query(params)).await
}

pub async fn delete_announcement_all(
    State(service): State<AnnouncementService>,
    Query(params): Query<TeacherParams>,
) -> Result<Json<DeleteConfirmation>, AnnouncementError> {
    delete_announcement(State(service), Path(ALL_SEGMENT.to_string()), Query(params)).await
}
