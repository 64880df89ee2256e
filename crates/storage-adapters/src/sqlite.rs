//! # SQLite ComplaintStore
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `domains` complaint model. Ids are stored as hyphenated TEXT and
//! enums by their `as_str()` spelling.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{
    ActorId, Category, Complaint, ComplaintId, ComplaintRecord, ComplaintStatus, ComplaintStore,
    StoreError,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

const SCHEMA: &str = include_str!("../migrations/0001_complaints.sql");

const COLUMNS: &str =
    "id, author_id, author_name, title, description, category, status, created_at, admin_notes";

pub struct SqliteComplaintStore {
    pool: SqlitePool,
}

fn backend(error: sqlx::Error) -> StoreError {
    StoreError::backend(error.to_string())
}

fn parse_uuid(raw: &str, column: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|e| StoreError::backend(format!("bad {column} '{raw}': {e}")))
}

/// Maps a row back to the domain model. Unknown enum spellings are decode
/// errors, never silently defaulted.
fn complaint_from_row(row: &SqliteRow) -> Result<Complaint, StoreError> {
    let id: String = row.try_get("id").map_err(backend)?;
    let author_id: String = row.try_get("author_id").map_err(backend)?;
    let category: String = row.try_get("category").map_err(backend)?;
    let status: String = row.try_get("status").map_err(backend)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(backend)?;

    Ok(Complaint::from(ComplaintRecord {
        id: ComplaintId(parse_uuid(&id, "id")?),
        author_id: ActorId(parse_uuid(&author_id, "author_id")?),
        author_name: row.try_get("author_name").map_err(backend)?,
        title: row.try_get("title").map_err(backend)?,
        description: row.try_get("description").map_err(backend)?,
        category: Category::from_str(&category).map_err(|e| StoreError::backend(e.to_string()))?,
        status: ComplaintStatus::from_str(&status)
            .map_err(|e| StoreError::backend(e.to_string()))?,
        created_at,
        admin_notes: row.try_get("admin_notes").map_err(backend)?,
    }))
}

impl SqliteComplaintStore {
    /// Opens a pool for `url` (e.g. `sqlite://desk.db` or `sqlite::memory:`),
    /// creating the database file if needed.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(backend)?
            .create_if_missing(true);

        // An in-memory database lives and dies with its single connection.
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            SqlitePoolOptions::new().max_connections(5).connect_with(options).await
        }
        .map_err(backend)?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Applies the embedded schema. Idempotent.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await.map_err(backend)?;
        info!("complaint schema applied");
        Ok(())
    }

    /// Explains why a conditional status update touched no row.
    async fn missed_status_write(&self, id: ComplaintId) -> Result<StoreError, StoreError> {
        let current: Option<String> = sqlx::query_scalar("SELECT status FROM complaints WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        Ok(match current {
            None => StoreError::NotFound(id),
            Some(raw) => StoreError::StatusChanged {
                id,
                current: ComplaintStatus::from_str(&raw)
                    .map_err(|e| StoreError::backend(e.to_string()))?,
            },
        })
    }

    async fn fetch_many(&self, sql: &str, owner: Option<ActorId>) -> Result<Vec<Complaint>, StoreError> {
        let mut query = sqlx::query(sql);
        if let Some(owner) = owner {
            query = query.bind(owner.to_string());
        }
        let rows = query.fetch_all(&self.pool).await.map_err(backend)?;
        debug!(count = rows.len(), "complaints fetched");
        rows.iter().map(complaint_from_row).collect()
    }
}

#[async_trait]
impl ComplaintStore for SqliteComplaintStore {
    async fn create(&self, complaint: Complaint) -> Result<Complaint, StoreError> {
        let sql = format!("INSERT INTO complaints ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)");
        let result = sqlx::query(&sql)
            .bind(complaint.id().to_string())
            .bind(complaint.author_id().to_string())
            .bind(complaint.author_name())
            .bind(complaint.title())
            .bind(complaint.description())
            .bind(complaint.category().as_str())
            .bind(complaint.status().as_str())
            .bind(complaint.created_at())
            .bind(complaint.admin_notes())
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(complaint),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Conflict(complaint.id()))
            }
            Err(e) => Err(backend(e)),
        }
    }

    async fn list_by_owner(&self, actor_id: ActorId) -> Result<Vec<Complaint>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM complaints WHERE author_id = ? ORDER BY created_at ASC, id ASC"
        );
        self.fetch_many(&sql, Some(actor_id)).await
    }

    async fn list_all(&self) -> Result<Vec<Complaint>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM complaints ORDER BY created_at ASC, id ASC");
        self.fetch_many(&sql, None).await
    }

    async fn update_status(
        &self,
        id: ComplaintId,
        expected: ComplaintStatus,
        status: ComplaintStatus,
    ) -> Result<Complaint, StoreError> {
        let sql = format!(
            "UPDATE complaints SET status = ? WHERE id = ? AND status = ? RETURNING {COLUMNS}"
        );
        let updated = sqlx::query(&sql)
            .bind(status.as_str())
            .bind(id.to_string())
            .bind(expected.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        match updated {
            Some(row) => complaint_from_row(&row),
            None => Err(self.missed_status_write(id).await?),
        }
    }

    async fn update_notes(
        &self,
        id: ComplaintId,
        notes: Option<String>,
    ) -> Result<Complaint, StoreError> {
        let sql = format!("UPDATE complaints SET admin_notes = ? WHERE id = ? RETURNING {COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(notes)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .ok_or(StoreError::NotFound(id))?;
        complaint_from_row(&row)
    }
}
