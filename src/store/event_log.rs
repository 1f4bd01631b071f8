//! Event Log - SQLite-backed append-only store for circadian events
//!
//! Implements the event half of the persistence boundary: durable append,
//! day-scoped retrieval, and the recent-sleep-history lookup the late-dinner
//! rule needs. Events are never updated or deleted.
//!
//! Writes are immediately visible to queries on the same connection
//! (read-your-writes, single-user scope).

use crate::store::error::{StoreError, StoreResult};
use crate::store::types::{CircadianEvent, DayWindow, EventType};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use uuid::Uuid;

/// SQLite-backed append-only event log
pub struct EventLog {
    conn: Connection,
}

impl EventLog {
    /// Create or open the event log under a data directory
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join("events.db");

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

    /// Open an in-memory event log (used by tests)
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS circadian_events (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                event_type TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                metadata TEXT NOT NULL
            )",
            [],
        )?;

        // Day-scoped timeline queries
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_events_user_time
             ON circadian_events(user_id, timestamp)",
            [],
        )?;

        // Recent-by-type queries (sleep history)
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_events_user_type_time
             ON circadian_events(user_id, event_type, timestamp)",
            [],
        )?;

        Ok(Self { conn })
    }

    /// Durably append one event
    pub fn append(&mut self, event: &CircadianEvent) -> StoreResult<()> {
        let metadata = serde_json::to_string(&event.metadata)?;

        self.conn.execute(
            "INSERT INTO circadian_events (id, user_id, event_type, timestamp, metadata)
             VALUES (?, ?, ?, ?, ?)",
            params![
                event.id.to_string(),
                event.user_id,
                event.event_type.as_str(),
                encode_timestamp(event.timestamp),
                metadata,
            ],
        )?;

        tracing::debug!(
            event_id = %event.id,
            user_id = %event.user_id,
            event_type = %event.event_type,
            "Event appended"
        );

        Ok(())
    }

    /// All events for a user whose timestamp falls on the given calendar day,
    /// ordered by timestamp
    pub fn events_for_day(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<CircadianEvent>> {
        let window = DayWindow::of(date);

        let mut stmt = self.conn.prepare_cached(
            "SELECT id, user_id, event_type, timestamp, metadata
             FROM circadian_events
             WHERE user_id = ? AND timestamp >= ? AND timestamp < ?
             ORDER BY timestamp",
        )?;

        let rows = stmt.query_map(
            params![
                user_id,
                encode_timestamp(window.start),
                encode_timestamp(window.end)
            ],
            read_raw_row,
        )?;

        decode_rows(rows)
    }

    /// Up to `limit` most recent `sleep_start` events for a user, newest first
    pub fn recent_sleep_starts(
        &self,
        user_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<CircadianEvent>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, user_id, event_type, timestamp, metadata
             FROM circadian_events
             WHERE user_id = ? AND event_type = ?
             ORDER BY timestamp DESC
             LIMIT ?",
        )?;

        let rows = stmt.query_map(
            params![user_id, EventType::SleepStart.as_str(), limit as i64],
            read_raw_row,
        )?;

        decode_rows(rows)
    }
}

/// Raw row shape before decoding into domain types
type RawEventRow = (String, String, String, i64, String);

fn read_raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEventRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn decode_rows(
    rows: impl Iterator<Item = rusqlite::Result<RawEventRow>>,
) -> StoreResult<Vec<CircadianEvent>> {
    let mut events = Vec::new();
    for row in rows {
        events.push(decode_event(row?)?);
    }
    Ok(events)
}

fn decode_event(row: RawEventRow) -> StoreResult<CircadianEvent> {
    let (id, user_id, event_type, timestamp, metadata) = row;

    let id = Uuid::parse_str(&id)
        .map_err(|_| StoreError::Corruption(format!("invalid event id '{}'", id)))?;

    let event_type = EventType::parse(&event_type)
        .ok_or_else(|| StoreError::Corruption(format!("unknown event type '{}'", event_type)))?;

    let timestamp = decode_timestamp(timestamp)?;
    let metadata = serde_json::from_str(&metadata)?;

    Ok(CircadianEvent {
        id,
        user_id,
        event_type,
        timestamp,
        metadata,
    })
}

/// Encode a naive local timestamp as milliseconds for storage and ordering
pub(crate) fn encode_timestamp(ts: NaiveDateTime) -> i64 {
    ts.and_utc().timestamp_millis()
}

/// Decode a stored millisecond value back into a naive local timestamp
pub(crate) fn decode_timestamp(ms: i64) -> StoreResult<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| StoreError::Corruption(format!("invalid timestamp {}", ms)))
}
