use crate::{
    error::StoreError,
    models::{Announcement, AnnouncementFields, NewAnnouncement},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// AnnouncementFilter
///
/// Selection applied by [`AnnouncementStore::find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementFilter {
    /// Every stored announcement, active or expired.
    All,
    /// Only announcements visible on the given calendar date.
    ActiveOn(NaiveDate),
}

/// AnnouncementStore Trait
///
/// Persistence contract for announcements. The service depends on this trait only,
/// so Postgres and the in-memory store are interchangeable behind `Arc<dyn AnnouncementStore>`.
///
/// Listings returned by `find` are always ordered by `created_at` descending.
#[async_trait]
pub trait AnnouncementStore: Send + Sync {
    async fn find(&self, filter: AnnouncementFilter) -> Result<Vec<Announcement>, StoreError>;
    async fn find_one(&self, id: Uuid) -> Result<Option<Announcement>, StoreError>;
    /// Persists a new record and returns the identifier assigned to it.
    async fn insert(&self, announcement: NewAnnouncement) -> Result<Uuid, StoreError>;
    /// Replaces the mutable fields of `id`. Updating a missing record is a no-op.
    async fn update(&self, id: Uuid, fields: AnnouncementFields) -> Result<(), StoreError>;
    /// Removes `id`, returning how many records were deleted (0 or 1).
    async fn delete(&self, id: Uuid) -> Result<u64, StoreError>;
}

/// AnnouncementStoreState
///
/// The concrete type used to share the store across the application state.
pub type AnnouncementStoreState = Arc<dyn AnnouncementStore>;

/// PostgresAnnouncementStore
///
/// `AnnouncementStore` backed by the `announcements` table (see `migrations/`).
pub struct PostgresAnnouncementStore {
    pool: PgPool,
}

impl PostgresAnnouncementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, message, expiration_date, start_date, created_by, created_at FROM announcements";

#[async_trait]
impl AnnouncementStore for PostgresAnnouncementStore {
    /// find
    ///
    /// The active filter is evaluated in SQL on DATE columns; a NULL `start_date`
    /// counts as already started.
    async fn find(&self, filter: AnnouncementFilter) -> Result<Vec<Announcement>, StoreError> {
        let announcements = match filter {
            AnnouncementFilter::All => {
                let sql = format!("{SELECT_COLUMNS} ORDER BY created_at DESC");
                sqlx::query_as::<_, Announcement>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
            AnnouncementFilter::ActiveOn(today) => {
                let sql = format!(
                    "{SELECT_COLUMNS} \
                     WHERE expiration_date >= $1 \
                       AND (start_date IS NULL OR start_date <= $1) \
                     ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, Announcement>(&sql)
                    .bind(today)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(announcements)
    }

    async fn find_one(&self, id: Uuid) -> Result<Option<Announcement>, StoreError> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = $1");
        let announcement = sqlx::query_as::<_, Announcement>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(announcement)
    }

    async fn insert(&self, announcement: NewAnnouncement) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"INSERT INTO announcements (id, message, expiration_date, start_date, created_by, created_at)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(id)
        .bind(&announcement.message)
        .bind(announcement.expiration_date)
        .bind(announcement.start_date)
        .bind(&announcement.created_by)
        .bind(announcement.created_at)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update(&self, id: Uuid, fields: AnnouncementFields) -> Result<(), StoreError> {
        sqlx::query(
            r#"UPDATE announcements
               SET message = $2, expiration_date = $3, start_date = $4
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&fields.message)
        .bind(fields.expiration_date)
        .bind(fields.start_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// InMemoryAnnouncementStore
///
/// `AnnouncementStore` kept in a process-local map. Used when no database is configured
/// in local mode, and by the test suite.
#[derive(Default)]
pub struct InMemoryAnnouncementStore {
    records: RwLock<HashMap<Uuid, Announcement>>,
}

impl InMemoryAnnouncementStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnnouncementStore for InMemoryAnnouncementStore {
    async fn find(&self, filter: AnnouncementFilter) -> Result<Vec<Announcement>, StoreError> {
        let records = self.records.read().await;
        let mut announcements: Vec<Announcement> = records
            .values()
            .filter(|a| match filter {
                AnnouncementFilter::All => true,
                AnnouncementFilter::ActiveOn(today) => a.is_active_on(today),
            })
            .cloned()
            .collect();
        announcements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(announcements)
    }

    async fn find_one(&self, id: Uuid) -> Result<Option<Announcement>, StoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn insert(&self, announcement: NewAnnouncement) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        self.records
            .write()
            .await
            .insert(id, announcement.with_id(id));
        Ok(id)
    }

    async fn update(&self, id: Uuid, fields: AnnouncementFields) -> Result<(), StoreError> {
        if let Some(existing) = self.records.write().await.get_mut(&id) {
            existing.message = fields.message;
            existing.expiration_date = fields.expiration_date;
            existing.start_date = fields.start_date;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<u64, StoreError> {
        Ok(self.records.write().await.remove(&id).map_or(0, |_| 1))
    }
}

