use chrono::{Local, NaiveDate, SubsecRound, Utc};
use uuid::Uuid;

use crate::{
    auth::{self, AuthenticatedTeacher, TeacherDirectoryState},
    error::AnnouncementError,
    models::{
        Announcement, AnnouncementFields, AnnouncementParams, DATE_FORMAT, DeleteConfirmation,
        NewAnnouncement,
    },
    repository::{AnnouncementFilter, AnnouncementStoreState},
};

/// AnnouncementService
///
/// All announcement business rules live here: the teacher gate, identifier resolution,
/// date and message validation, and the visibility window. The service holds no state of its
/// own beyond its two collaborators, so cloning it is cheap and every request is independent.
///
/// Ordering of checks for mutating calls: authentication, then identifier (update/delete),
/// then existence (update), then input validation. Nothing is written until all pass.
#[derive(Clone)]
pub struct AnnouncementService {
    store: AnnouncementStoreState,
    directory: TeacherDirectoryState,
}

/// AnnouncementInput
///
/// Unvalidated create/update input as it arrives from the caller.
#[derive(Debug, Clone, Default)]
pub struct AnnouncementInput {
    pub message: String,
    pub expiration_date: String,
    pub start_date: Option<String>,
}

impl From<AnnouncementParams> for AnnouncementInput {
    fn from(params: AnnouncementParams) -> Self {
        Self {
            message: params.message,
            expiration_date: params.expiration_date,
            start_date: params.start_date,
        }
    }
}

impl AnnouncementService {
    pub fn new(store: AnnouncementStoreState, directory: TeacherDirectoryState) -> Self {
        Self { store, directory }
    }

    /// list_active
    ///
    /// Public listing: announcements visible on the current local calendar date.
    pub async fn list_active(&self) -> Result<Vec<Announcement>, AnnouncementError> {
        self.list_active_on(Local::now().date_naive()).await
    }

    /// list_active_on
    ///
    /// Announcements with `expiration_date >= today` and no start date or `start_date <= today`,
    /// newest first.
    pub async fn list_active_on(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<Announcement>, AnnouncementError> {
        Ok(self.store.find(AnnouncementFilter::ActiveOn(today)).await?)
    }

    /// list_all
    ///
    /// Management listing including expired and not-yet-started announcements.
    pub async fn list_all(
        &self,
        teacher_username: &str,
    ) -> Result<Vec<Announcement>, AnnouncementError> {
        self.authenticate(teacher_username).await?;
        Ok(self.store.find(AnnouncementFilter::All).await?)
    }

    /// create
    ///
    /// Stores a new announcement authored by `teacher_username` and returns it with its id.
    pub async fn create(
        &self,
        input: AnnouncementInput,
        teacher_username: &str,
    ) -> Result<Announcement, AnnouncementError> {
        let teacher = self.authenticate(teacher_username).await?;
        let fields = validate(input)?;

        let draft = NewAnnouncement {
            message: fields.message,
            expiration_date: fields.expiration_date,
            start_date: fields.start_date,
            created_by: teacher.username().to_string(),
            // Postgres keeps microseconds; truncating keeps the returned record equal to the stored one.
            created_at: Utc::now().trunc_subsecs(6),
        };
        let id = self.store.insert(draft.clone()).await?;

        tracing::info!(%id, teacher = %teacher.username(), "announcement created");
        Ok(draft.with_id(id))
    }

    /// update
    ///
    /// Replaces `message`, `expiration_date` and `start_date` of an existing announcement.
    /// Applying the same update twice leaves the record exactly as applying it once.
    pub async fn update(
        &self,
        id: &str,
        input: AnnouncementInput,
        teacher_username: &str,
    ) -> Result<Announcement, AnnouncementError> {
        let teacher = self.authenticate(teacher_username).await?;
        let id = resolve_id(id)?;

        if self.store.find_one(id).await?.is_none() {
            return Err(AnnouncementError::NotFound);
        }

        let fields = validate(input)?;
        self.store.update(id, fields).await?;

        tracing::info!(%id, teacher = %teacher.username(), "announcement updated");
        // A concurrent delete between the write and this read wins.
        self.store
            .find_one(id)
            .await?
            .ok_or(AnnouncementError::NotFound)
    }

    /// delete
    ///
    /// Permanently removes an announcement. A valid id with no record is `NotFound`.
    pub async fn delete(
        &self,
        id: &str,
        teacher_username: &str,
    ) -> Result<DeleteConfirmation, AnnouncementError> {
        let teacher = self.authenticate(teacher_username).await?;
        let id = resolve_id(id)?;

        if self.store.delete(id).await? == 0 {
            return Err(AnnouncementError::NotFound);
        }

        tracing::info!(%id, teacher = %teacher.username(), "announcement deleted");
        Ok(DeleteConfirmation::deleted())
    }

    async fn authenticate(
        &self,
        teacher_username: &str,
    ) -> Result<AuthenticatedTeacher, AnnouncementError> {
        auth::authenticate(self.directory.as_ref(), teacher_username).await
    }
}

/// resolve_id
///
/// Structural check only: any UUID is a valid key, whether or not a record exists.
pub fn resolve_id(id: &str) -> Result<Uuid, AnnouncementError> {
    Uuid::parse_str(id).map_err(|_| AnnouncementError::InvalidIdentifier)
}

/// parse_date
///
/// Parses a `YYYY-MM-DD` calendar date, naming `field` on failure.
///
/// chrono also accepts signs, padding and short years (`"99-01-01"` is year 99), so the
/// value must render back to exactly the input.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, AnnouncementError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .filter(|date| date.format(DATE_FORMAT).to_string() == value)
        .ok_or(AnnouncementError::InvalidDate { field })
}

/// An absent start date and an empty one mean the same thing.
fn parse_start_date(value: Option<&str>) -> Result<Option<NaiveDate>, AnnouncementError> {
    match value {
        None | Some("") => Ok(None),
        Some(s) => parse_date("start_date", s).map(Some),
    }
}

fn validate(input: AnnouncementInput) -> Result<AnnouncementFields, AnnouncementError> {
    let expiration_date = parse_date("expiration_date", &input.expiration_date)?;
    let start_date = parse_start_date(input.start_date.as_deref())?;

    if input.message.trim().is_empty() {
        return Err(AnnouncementError::EmptyMessage);
    }

    Ok(AnnouncementFields {
        message: input.message,
        expiration_date,
        start_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_date_absent_and_empty_are_equivalent() {
        assert_eq!(parse_start_date(None).unwrap(), None);
        assert_eq!(parse_start_date(Some("")).unwrap(), None);
    }

    #[test]
    fn malformed_dates_name_their_field() {
        let err = parse_date("expiration_date", "01/02/2099").unwrap_err();
        assert!(matches!(
            err,
            AnnouncementError::InvalidDate {
                field: "expiration_date"
            }
        ));

        let err = parse_start_date(Some("2099-02-30")).unwrap_err();
        assert!(matches!(
            err,
            AnnouncementError::InvalidDate { field: "start_date" }
        ));
    }

    #[test]
    fn loosely_shaped_dates_are_rejected() {
        for value in ["+2099-01-01", " 2099-01-01", "2099-1-1", "99-01-01", "2099-01-01 "] {
            assert!(
                matches!(
                    parse_date("expiration_date", value),
                    Err(AnnouncementError::InvalidDate { field: "expiration_date" })
                ),
                "accepted {value:?}"
            );
        }
        assert_eq!(
            parse_date("expiration_date", "0099-01-01").unwrap(),
            NaiveDate::from_ymd_opt(99, 1, 1).unwrap()
        );
    }

    #[test]
    fn expiration_is_checked_before_start() {
        let err = validate(AnnouncementInput {
            message: "hi".into(),
            expiration_date: "nope".into(),
            start_date: Some("also-nope".into()),
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid expiration_date format. Use YYYY-MM-DD.");
    }

    #[test]
    fn whitespace_message_is_rejected() {
        let err = validate(AnnouncementInput {
            message: "   ".into(),
            expiration_date: "2099-01-01".into(),
            start_date: None,
        })
        .unwrap_err();
        assert!(matches!(err, AnnouncementError::EmptyMessage));
    }

    #[test]
    fn resolve_id_accepts_any_uuid() {
        assert!(resolve_id("6f1c2a7e-4b1d-4c8e-9a0b-2f3d4e5f6a7b").is_ok());
        assert!(matches!(
            resolve_id("not-a-valid-key"),
            Err(AnnouncementError::InvalidIdentifier)
        ));
    }
}
