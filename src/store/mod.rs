//! SQLite snapshot log.
//!
//! One append-only table, one row per (entity, timestamp) observation:
//! - snapshots: id, timestamp, entity_id, interests_count, skills_count, status
//!
//! Every insert runs in autocommit mode, so a crash after N records keeps
//! all N. Rows are never updated or deleted. Readers tolerate duplicate
//! (entity_id, timestamp) pairs; there is no uniqueness constraint.

pub mod diff;

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::error::{Error, Result};
use crate::snapshot::{self, Snapshot, SnapshotSet, Status};

/// Row orderings for [`Store::history`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOrder {
    /// Grouped by entity, oldest first. What the trend report consumes.
    ByEntity,
    /// Newest batch first, entities alphabetical within a batch. Raw dumps.
    NewestFirst,
}

impl HistoryOrder {
    fn order_by(self) -> &'static str {
        match self {
            HistoryOrder::ByEntity => "entity_id ASC, timestamp ASC, id ASC",
            HistoryOrder::NewestFirst => "timestamp DESC, entity_id ASC, id ASC",
        }
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS snapshots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            interests_count INTEGER NOT NULL,
            skills_count INTEGER NOT NULL,
            status TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_snapshots_timestamp ON snapshots(timestamp)",
        [],
    )?;

    Ok(())
}

/// Database handle. Open once per command; the connection closes on drop.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Store { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Store { conn })
    }

    /// Appends one snapshot and returns its row id. Committed on return.
    pub fn record(&self, snapshot: &Snapshot) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO snapshots (timestamp, entity_id, interests_count, skills_count, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                snapshot::format_timestamp(&snapshot.timestamp),
                snapshot.entity_id,
                snapshot.interests_count,
                snapshot.skills_count,
                snapshot.status.to_string(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Every snapshot sharing the single most recent timestamp older than
    /// `now - cutoff`.
    ///
    /// "Prior" is per batch timestamp, not per entity: an entity absent
    /// from that batch is left out even when it has older rows.
    pub fn latest_prior_snapshots(&self, cutoff: Duration) -> Result<SnapshotSet> {
        self.latest_prior_snapshots_at(snapshot::now(), cutoff)
    }

    pub fn latest_prior_snapshots_at(&self, now: NaiveDateTime, cutoff: Duration) -> Result<SnapshotSet> {
        let boundary = chrono::Duration::from_std(cutoff)
            .ok()
            .and_then(|cutoff| now.checked_sub_signed(cutoff))
            .unwrap_or(NaiveDateTime::MIN);

        let snapshots = self.query(
            "SELECT id, timestamp, entity_id, interests_count, skills_count, status
             FROM snapshots
             WHERE timestamp = (SELECT MAX(timestamp) FROM snapshots WHERE timestamp < ?1)
             ORDER BY id ASC",
            params![snapshot::format_timestamp(&boundary)],
        )?;

        // later rows win when an entity appears twice in the same batch
        Ok(snapshots.into_iter().collect())
    }

    /// Snapshots of the most recent batch, if any.
    pub fn latest_batch(&self) -> Result<SnapshotSet> {
        let snapshots = self.query(
            "SELECT id, timestamp, entity_id, interests_count, skills_count, status
             FROM snapshots
             WHERE timestamp = (SELECT MAX(timestamp) FROM snapshots)
             ORDER BY id ASC",
            [],
        )?;
        Ok(snapshots.into_iter().collect())
    }

    pub fn history(&self, order: HistoryOrder) -> Result<Vec<Snapshot>> {
        let sql = format!(
            "SELECT id, timestamp, entity_id, interests_count, skills_count, status
             FROM snapshots
             ORDER BY {}",
            order.order_by()
        );
        self.query(&sql, [])
    }

    pub fn snapshot_count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn query<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Snapshot>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, |row| {
                Ok(RawRow {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    entity_id: row.get(2)?,
                    interests_count: row.get(3)?,
                    skills_count: row.get(4)?,
                    status: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(RawRow::into_snapshot).collect()
    }
}

struct RawRow {
    id: i64,
    timestamp: String,
    entity_id: String,
    interests_count: i64,
    skills_count: i64,
    status: String,
}

impl RawRow {
    fn into_snapshot(self) -> Result<Snapshot> {
        let id = self.id;
        let timestamp = snapshot::parse_timestamp(&self.timestamp).map_err(|e| Error::CorruptRow {
            id,
            reason: format!("timestamp {:?}: {e}", self.timestamp),
        })?;
        let count = |value: i64, column: &str| {
            u32::try_from(value).map_err(|_| Error::CorruptRow {
                id,
                reason: format!("{column} out of range: {value}"),
            })
        };

        Ok(Snapshot {
            entity_id: self.entity_id,
            timestamp,
            interests_count: count(self.interests_count, "interests_count")?,
            skills_count: count(self.skills_count, "skills_count")?,
            status: self.status.parse::<Status>().unwrap_or_else(|never| match never {}),
        })
    }
}
