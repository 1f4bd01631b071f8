//! Insight Store - SQLite-backed store for generated insights
//!
//! Implements the insight half of the persistence boundary: append with
//! `is_read = false`, unread listing, and the idempotent dismiss. Insights are
//! created solely as a side effect of rule evaluation and are never deleted
//! here; retention is an external concern.

use crate::store::error::{StoreError, StoreResult};
use crate::store::event_log::{decode_timestamp, encode_timestamp};
use crate::store::types::{CircadianInsight, InsightKind};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use uuid::Uuid;

/// SQLite-backed insight store
pub struct InsightStore {
    conn: Connection,
}

impl InsightStore {
    /// Create or open the insight store under a data directory
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join("insights.db");

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Self::init(conn)
    }

    /// Open an in-memory insight store (used by tests)
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS circadian_insights (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                message TEXT NOT NULL,
                scheduled_for INTEGER NOT NULL,
                is_read INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;

        // Unread listing per user
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_insights_user_read
             ON circadian_insights(user_id, is_read, scheduled_for)",
            [],
        )?;

        Ok(Self { conn })
    }

    /// Durably store a new insight with `is_read = false`, assigning its id
    pub fn append(
        &mut self,
        user_id: &str,
        kind: InsightKind,
        message: &str,
        scheduled_for: NaiveDateTime,
    ) -> StoreResult<CircadianInsight> {
        let insight = CircadianInsight {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            kind,
            message: message.to_string(),
            scheduled_for,
            is_read: false,
        };

        self.conn.execute(
            "INSERT INTO circadian_insights (id, user_id, kind, message, scheduled_for, is_read)
             VALUES (?, ?, ?, ?, ?, 0)",
            params![
                insight.id.to_string(),
                insight.user_id,
                insight.kind.as_str(),
                insight.message,
                encode_timestamp(insight.scheduled_for),
            ],
        )?;

        tracing::debug!(
            insight_id = %insight.id,
            user_id = %insight.user_id,
            kind = %insight.kind,
            "Insight stored"
        );

        Ok(insight)
    }

    /// Unread insights for a user, ordered by scheduled time
    pub fn unread(&self, user_id: &str) -> StoreResult<Vec<CircadianInsight>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, user_id, kind, message, scheduled_for, is_read
             FROM circadian_insights
             WHERE user_id = ? AND is_read = 0
             ORDER BY scheduled_for",
        )?;

        let rows = stmt.query_map(params![user_id], read_raw_row)?;

        let mut insights = Vec::new();
        for row in rows {
            insights.push(decode_insight(row?)?);
        }
        Ok(insights)
    }

    /// Mark an insight as read
    ///
    /// Idempotent: dismissing an already-read insight is a no-op. Returns
    /// whether the id exists at all, so callers can decide how to surface an
    /// unknown id.
    pub fn mark_read(&mut self, id: Uuid) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "UPDATE circadian_insights SET is_read = 1 WHERE id = ?",
            params![id.to_string()],
        )?;

        Ok(changed > 0)
    }
}

type RawInsightRow = (String, String, String, String, i64, bool);

fn read_raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawInsightRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode_insight(row: RawInsightRow) -> StoreResult<CircadianInsight> {
    let (id, user_id, kind, message, scheduled_for, is_read) = row;

    let id = Uuid::parse_str(&id)
        .map_err(|_| StoreError::Corruption(format!("invalid insight id '{}'", id)))?;

    let kind = InsightKind::parse(&kind)
        .ok_or_else(|| StoreError::Corruption(format!("unknown insight kind '{}'", kind)))?;

    Ok(CircadianInsight {
        id,
        user_id,
        kind,
        message,
        scheduled_for: decode_timestamp(scheduled_for)?,
        is_read,
    })
}
