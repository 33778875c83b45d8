//! Read access to change history.
//!
//! History rows and attachment metadata are produced by the check pipeline.
//! The download views only need "the most recent N records, optionally for
//! one monitor", which is what [`HistoryStore`] provides.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::error::AppError;
use crate::models::{ChangeHistory, HistoryRecord, PageMonitor};

/// Source of change-history records.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Returns up to `limit` records ordered by check time, newest first,
    /// restricted to `monitor_id` when given.
    async fn recent(&self, monitor_id: Option<i64>, limit: i64) -> Result<Vec<HistoryRecord>, AppError>;
}

/// PostgreSQL-backed history store.
#[derive(Debug, Clone)]
pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A history row joined with its monitor.
#[derive(Debug, FromRow)]
struct HistoryRow {
    id: i64,
    monitor_id: i64,
    check_time: DateTime<Utc>,
    attachments: Option<serde_json::Value>,
    joined_monitor_id: Option<i64>,
    monitor_name: Option<String>,
    monitor_url: Option<String>,
    attachment_types: Option<String>,
}

impl From<HistoryRow> for HistoryRecord {
    fn from(row: HistoryRow) -> Self {
        let monitor = row.joined_monitor_id.map(|id| PageMonitor {
            id,
            name: row.monitor_name.unwrap_or_default(),
            url: row.monitor_url.unwrap_or_default(),
            attachment_types: row.attachment_types,
        });

        HistoryRecord::from_row(
            ChangeHistory {
                id: row.id,
                monitor_id: row.monitor_id,
                check_time: row.check_time,
                attachments: row.attachments,
            },
            monitor,
        )
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn recent(&self, monitor_id: Option<i64>, limit: i64) -> Result<Vec<HistoryRecord>, AppError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT h.id, h.monitor_id, h.check_time, h.attachments,
                   m.id AS joined_monitor_id,
                   m.name AS monitor_name,
                   m.url AS monitor_url,
                   m.attachment_types
            FROM change_histories h
            LEFT JOIN page_monitors m ON m.id = h.monitor_id
            WHERE ($1::BIGINT IS NULL OR h.monitor_id = $1)
            ORDER BY h.check_time DESC
            LIMIT $2
            "#,
        )
        .bind(monitor_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(HistoryRecord::from).collect())
    }
}

/// In-process history store.
///
/// Holds records in memory; useful for tests and for running the download
/// views without a database.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    records: RwLock<Vec<HistoryRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<HistoryRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn insert(&self, record: HistoryRecord) -> Result<(), AppError> {
        self.records
            .write()
            .map_err(|_| AppError::Internal("history store lock poisoned".to_string()))?
            .push(record);
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn recent(&self, monitor_id: Option<i64>, limit: i64) -> Result<Vec<HistoryRecord>, AppError> {
        let records = self
            .records
            .read()
            .map_err(|_| AppError::Internal("history store lock poisoned".to_string()))?;

        let mut matching: Vec<HistoryRecord> = records
            .iter()
            .filter(|record| monitor_id.map_or(true, |id| record.monitor_id == id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.check_time.cmp(&a.check_time));
        matching.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));

        Ok(matching)
    }
}
