use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

// Public (anonymous) and teacher-only route groups.
pub mod routes;
use routes::{public, teacher};

// --- Public Re-exports ---

pub use auth::{InMemoryTeacherDirectory, PostgresTeacherDirectory, TeacherDirectoryState};
pub use config::AppConfig;
pub use error::AnnouncementError;
pub use repository::{AnnouncementStoreState, InMemoryAnnouncementStore, PostgresAnnouncementStore};
pub use service::AnnouncementService;

/// ApiDoc
///
/// OpenAPI document generated from the `#[utoipa::path]` handlers and `ToSchema` models,
/// served at `/api-docs/openapi.json` and browsable under `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_active_announcements, handlers::get_all_announcements,
        handlers::create_announcement, handlers::update_announcement,
        handlers::delete_announcement
    ),
    components(
        schemas(models::Announcement, models::DeleteConfirmation, error::ErrorResponse)
    ),
    tags(
        (name = "announcements", description = "School Announcements API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared state handed to every request. Collaborators are injected once at
/// startup through [`AnnouncementService::new`]; nothing is reached through globals.
/// Handlers extract the service through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub service: AnnouncementService,
}

impl AppState {
    pub fn new(store: AnnouncementStoreState, directory: TeacherDirectoryState) -> Self {
        Self {
            service: AnnouncementService::new(store, directory),
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AnnouncementService {
    fn from_ref(app_state: &AppState) -> AnnouncementService {
        app_state.service.clone()
    }
}

/// create_router
///
/// Assembles the routing tree, registers the shared state and wraps everything in the
/// request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // Teacher routes carry `teacher_username`; the service performs the directory check.
        .merge(teacher::teacher_routes())
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span so every log line of a request carries its `x-request-id`.
/// The URI path is recorded without the query string, which holds teacher usernames.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        path = %request.uri().path(),
        req_id = %request_id,
    )
}
