use async_trait::async_trait;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use school_announcements::{
    AnnouncementError, AnnouncementService, InMemoryAnnouncementStore, InMemoryTeacherDirectory,
    error::{ErrorResponse, StoreError},
    handlers,
    models::{
        Announcement, AnnouncementFields, AnnouncementParams, NewAnnouncement, TeacherParams,
    },
    repository::{AnnouncementFilter, AnnouncementStore},
};
use std::sync::Arc;
use tokio::test;
use uuid::Uuid;

// --- MOCK STORE IMPLEMENTATION ---

/// A store whose backend is unreachable: every call fails.
struct FailingStore;

#[async_trait]
impl AnnouncementStore for FailingStore {
    async fn find(&self, _filter: AnnouncementFilter) -> Result<Vec<Announcement>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
    async fn find_one(&self, _id: Uuid) -> Result<Option<Announcement>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
    async fn insert(&self, _announcement: NewAnnouncement) -> Result<Uuid, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
    async fn update(&self, _id: Uuid, _fields: AnnouncementFields) -> Result<(), StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
    async fn delete(&self, _id: Uuid) -> Result<u64, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
}

// --- TEST UTILITIES ---

const TEACHER: &str = "mrodriguez";

fn create_test_state(store: Arc<dyn AnnouncementStore>) -> AnnouncementService {
    AnnouncementService::new(store, Arc::new(InMemoryTeacherDirectory::new([TEACHER])))
}

fn memory_state() -> AnnouncementService {
    create_test_state(Arc::new(InMemoryAnnouncementStore::new()))
}

fn params(message: &str, expiration_date: &str, teacher: &str) -> AnnouncementParams {
    AnnouncementParams {
        message: message.to_string(),
        expiration_date: expiration_date.to_string(),
        start_date: None,
        teacher_username: teacher.to_string(),
    }
}

fn teacher(username: &str) -> TeacherParams {
    TeacherParams {
        teacher_username: username.to_string(),
    }
}

async fn error_body(response: axum::response::Response) -> (StatusCode, ErrorResponse) {
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    (parts.status, serde_json::from_slice(&bytes).unwrap())
}

// --- HANDLER TESTS ---

#[test]
async fn test_create_then_list_active() {
    let state = memory_state();

    let Json(created) = handlers::create_announcement(
        State(state.clone()),
        Query(params("Assembly at 9", "2099-01-01", TEACHER)),
    )
    .await
    .unwrap();

    assert_eq!(created.created_by, TEACHER);

    let Json(active) = handlers::get_active_announcements(State(state)).await.unwrap();
    assert_eq!(active, vec![created]);
}

#[test]
async fn test_create_unknown_teacher_is_unauthorized() {
    let state = memory_state();

    let result = handlers::create_announcement(
        State(state),
        Query(params("Nope", "2099-01-01", "ghost")),
    )
    .await;

    let (status, body) = error_body(result.into_response()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body.detail, "Authentication required");
}

#[test]
async fn test_create_bad_date_is_bad_request_naming_field() {
    let state = memory_state();

    let result = handlers::create_announcement(
        State(state),
        Query(params("Soon", "31-12-2099", TEACHER)),
    )
    .await;

    let (status, body) = error_body(result.into_response()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.detail, "Invalid expiration_date format. Use YYYY-MM-DD.");
}

#[test]
async fn test_get_all_announcements_requires_teacher() {
    let state = memory_state();

    let result = handlers::get_all_announcements(State(state), Query(teacher("ghost"))).await;

    assert!(matches!(result, Err(AnnouncementError::AuthenticationRequired)));
}

#[test]
async fn test_update_invalid_id_is_bad_request() {
    let state = memory_state();

    let result = handlers::update_announcement(
        State(state),
        Path("not-a-valid-key".to_string()),
        Query(params("x", "2099-01-01", TEACHER)),
    )
    .await;

    let (status, body) = error_body(result.into_response()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.detail, "Invalid announcement ID");
}

#[test]
async fn test_update_unknown_id_is_not_found() {
    let state = memory_state();

    let result = handlers::update_announcement(
        State(state),
        Path(Uuid::new_v4().to_string()),
        Query(params("x", "2099-01-01", TEACHER)),
    )
    .await;

    let (status, body) = error_body(result.into_response()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.detail, "Announcement not found");
}

#[test]
async fn test_delete_success_and_repeat() {
    let state = memory_state();
    let Json(created) = handlers::create_announcement(
        State(state.clone()),
        Query(params("Temp", "2099-01-01", TEACHER)),
    )
    .await
    .unwrap();

    let Json(confirmation) = handlers::delete_announcement(
        State(state.clone()),
        Path(created.id.to_string()),
        Query(teacher(TEACHER)),
    )
    .await
    .unwrap();
    assert_eq!(confirmation.message, "Announcement deleted successfully");

    let again = handlers::delete_announcement(
        State(state),
        Path(created.id.to_string()),
        Query(teacher(TEACHER)),
    )
    .await;
    assert_eq!(again.into_response().status(), StatusCode::NOT_FOUND);
}

#[test]
async fn test_store_failure_is_internal_error_without_details() {
    let state = create_test_state(Arc::new(FailingStore));

    let result = handlers::get_active_announcements(State(state)).await;

    let (status, body) = error_body(result.into_response()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.detail, "Internal server error");
}

#[test]
async fn test_store_failure_after_auth_on_create() {
    let state = create_test_state(Arc::new(FailingStore));

    let unknown = handlers::create_announcement(
        State(state.clone()),
        Query(params("x", "2099-01-01", "ghost")),
    )
    .await;
    assert_eq!(unknown.into_response().status(), StatusCode::UNAUTHORIZED);

    let known = handlers::create_announcement(
        State(state),
        Query(params("x", "2099-01-01", TEACHER)),
    )
    .await;
    assert_eq!(known.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
async fn test_all_segment_is_an_invalid_id_for_update_and_delete() {
    let state = memory_state();

    let updated = handlers::update_announcement_all(
        State(state.clone()),
        Query(params("x", "2099-01-01", TEACHER)),
    )
    .await;
    assert!(matches!(updated, Err(AnnouncementError::InvalidIdentifier)));

    let deleted = handlers::delete_announcement_all(State(state), Query(teacher(TEACHER))).await;
    assert!(matches!(deleted, Err(AnnouncementError::InvalidIdentifier)));
}
