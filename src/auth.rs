use async_trait::async_trait;
use sqlx::PgPool;
use std::{collections::HashSet, sync::Arc};
use tokio::sync::RwLock;

use crate::{
    error::{AnnouncementError, StoreError},
    models::Teacher,
};

/// TeacherDirectory Trait
///
/// The single authentication seam of the service: a username is accepted if and only if
/// a teacher record exists for it. Kept as a trait so it can later be replaced by a
/// token or session check without touching the announcement logic.
#[async_trait]
pub trait TeacherDirectory: Send + Sync {
    async fn exists(&self, username: &str) -> Result<bool, StoreError>;
}

/// TeacherDirectoryState
///
/// The concrete type used to share the directory across the application state.
pub type TeacherDirectoryState = Arc<dyn TeacherDirectory>;

/// AuthenticatedTeacher
///
/// Proof that a username passed the directory check. Only [`authenticate`] constructs it,
/// so holding one means the gate has already run for this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedTeacher {
    username: String,
}

impl AuthenticatedTeacher {
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// authenticate
///
/// Resolves `username` against the directory.
///
/// Rejection: `AnnouncementError::AuthenticationRequired` when no teacher record exists.
/// Empty usernames are rejected without a lookup.
pub async fn authenticate(
    directory: &dyn TeacherDirectory,
    username: &str,
) -> Result<AuthenticatedTeacher, AnnouncementError> {
    if username.is_empty() || !directory.exists(username).await? {
        tracing::warn!(teacher = %username, "rejected unknown teacher");
        return Err(AnnouncementError::AuthenticationRequired);
    }

    Ok(AuthenticatedTeacher {
        username: username.to_string(),
    })
}

/// PostgresTeacherDirectory
///
/// `TeacherDirectory` backed by the `teachers` table.
pub struct PostgresTeacherDirectory {
    pool: PgPool,
}

impl PostgresTeacherDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// upsert
    ///
    /// Registers a teacher, refreshing the display name if the username already exists.
    /// Used to seed local databases.
    pub async fn upsert(&self, teacher: &Teacher) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO teachers (username, display_name) VALUES ($1, $2)
               ON CONFLICT (username) DO UPDATE SET display_name = EXCLUDED.display_name"#,
        )
        .bind(&teacher.username)
        .bind(&teacher.display_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TeacherDirectory for PostgresTeacherDirectory {
    async fn exists(&self, username: &str) -> Result<bool, StoreError> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM teachers WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(found)
    }
}

/// InMemoryTeacherDirectory
///
/// A fixed set of usernames held in memory. Seeded from `LOCAL_TEACHERS` when the
/// server runs locally without a database, and used by the tests.
#[derive(Default)]
pub struct InMemoryTeacherDirectory {
    usernames: RwLock<HashSet<String>>,
}

impl InMemoryTeacherDirectory {
    pub fn new<I, S>(usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            usernames: RwLock::new(usernames.into_iter().map(Into::into).collect()),
        }
    }

    pub async fn add(&self, username: impl Into<String>) {
        self.usernames.write().await.insert(username.into());
    }

    pub async fn remove(&self, username: &str) -> bool {
        self.usernames.write().await.remove(username)
    }
}

#[async_trait]
impl TeacherDirectory for InMemoryTeacherDirectory {
    async fn exists(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.usernames.read().await.contains(username))
    }
}
