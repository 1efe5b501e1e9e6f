use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// StoreError
///
/// Failure raised by a persistence collaborator (announcement store or teacher directory).
/// These are never caused by client input and surface as a 500.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// AnnouncementError
///
/// The full error taxonomy of the announcement service. Every client-facing variant
/// is detected before the store is mutated, so a failed request never leaves a partial write.
#[derive(Debug, Error)]
pub enum AnnouncementError {
    /// `teacher_username` does not resolve to a teacher record.
    #[error("Authentication required")]
    AuthenticationRequired,
    /// The path identifier is not a well-formed UUID.
    #[error("Invalid announcement ID")]
    InvalidIdentifier,
    /// The identifier is well-formed but no record carries it.
    #[error("Announcement not found")]
    NotFound,
    /// A date field did not parse as `YYYY-MM-DD`.
    #[error("Invalid {field} format. Use YYYY-MM-DD.")]
    InvalidDate { field: &'static str },
    #[error("Announcement message must not be empty")]
    EmptyMessage,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AnnouncementError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::InvalidIdentifier | Self::InvalidDate { .. } | Self::EmptyMessage => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// ErrorResponse
///
/// JSON body returned with every non-2xx answer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for AnnouncementError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match &self {
            Self::Store(e) => {
                // Collaborator faults are logged in full but never echoed to the client.
                tracing::error!(error = %e, "announcement store failure");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
