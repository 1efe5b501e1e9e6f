use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Wire format for every calendar date accepted or emitted by the API.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// --- Core Application Schemas (Mapped to Database) ---

/// Announcement
///
/// A school announcement as stored in the `announcements` table.
/// `start_date` is `None` when the announcement is eligible from the moment it is created;
/// on the wire that case is rendered as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Announcement {
    pub id: Uuid,
    pub message: String,
    #[ts(type = "string")]
    #[schema(value_type = String, example = "2099-01-01")]
    pub expiration_date: NaiveDate,
    #[serde(with = "optional_date")]
    #[ts(type = "string")]
    #[schema(value_type = String, example = "")]
    pub start_date: Option<NaiveDate>,
    pub created_by: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl Announcement {
    /// True when the announcement should be shown publicly on `today`:
    /// not yet expired, and either without a start date or already started.
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.expiration_date >= today && self.start_date.is_none_or(|start| start <= today)
    }
}

/// Teacher
///
/// A row of the `teachers` table. Only the existence of `username` matters for authentication.
#[derive(Debug, Clone, FromRow)]
pub struct Teacher {
    pub username: String,
    pub display_name: String,
}

impl Teacher {
    /// A teacher whose display name defaults to the username.
    pub fn with_username(username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            display_name: username.clone(),
            username,
        }
    }
}

// --- Store Inputs ---

/// NewAnnouncement
///
/// A fully validated record waiting for the store to assign its identifier.
#[derive(Debug, Clone)]
pub struct NewAnnouncement {
    pub message: String,
    pub expiration_date: NaiveDate,
    pub start_date: Option<NaiveDate>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl NewAnnouncement {
    pub fn with_id(self, id: Uuid) -> Announcement {
        Announcement {
            id,
            message: self.message,
            expiration_date: self.expiration_date,
            start_date: self.start_date,
            created_by: self.created_by,
            created_at: self.created_at,
        }
    }
}

/// AnnouncementFields
///
/// The mutable subset of an announcement, replaced wholesale on update.
/// `id`, `created_by` and `created_at` are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementFields {
    pub message: String,
    pub expiration_date: NaiveDate,
    pub start_date: Option<NaiveDate>,
}

// --- Request Payloads (Query Strings) ---

/// AnnouncementParams
///
/// Query parameters accepted by create (POST /announcements) and update (PUT /announcements/{id}).
/// Dates arrive as raw strings so that malformed values are reported per field by the service.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnnouncementParams {
    /// Announcement text.
    pub message: String,
    /// Expiration date (YYYY-MM-DD).
    pub expiration_date: String,
    /// Optional start date (YYYY-MM-DD). Empty or absent means "immediately".
    #[serde(default)]
    pub start_date: Option<String>,
    /// Username of the teacher performing the change.
    pub teacher_username: String,
}

/// TeacherParams
///
/// Query parameters for endpoints that only need the authenticating teacher.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TeacherParams {
    /// Username of the teacher performing the request.
    pub teacher_username: String,
}

// --- Responses ---

/// DeleteConfirmation
///
/// Body returned by a successful DELETE /announcements/{id}.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DeleteConfirmation {
    pub message: String,
}

impl DeleteConfirmation {
    pub fn deleted() -> Self {
        Self {
            message: "Announcement deleted successfully".to_string(),
        }
    }
}

/// optional_date
///
/// Serde adapter rendering `None` as `""` and accepting `""` (or null) back as `None`.
pub mod optional_date {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.collect_str(&d.format(DATE_FORMAT)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => NaiveDate::parse_from_str(&s, DATE_FORMAT)
                .map(Some)
                .map_err(D::Error::custom),
        }
    }
}
