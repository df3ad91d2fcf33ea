//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Generators never execute SQL; the pipeline hands finished tables
//! to the store through the TableSink trait.

use crate::{
    dataset::{Dataset, DatasetSummary},
    error::GenResult,
    event::EventLogEntry,
    sink::write_dataset,
};
use rusqlite::{params, Connection, OptionalExtension};

mod tables;

/// Generated tables, for row-count queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    RepairShop,
    Policy,
    Claim,
    RepairOrderLine,
}

impl Table {
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::RepairShop => "repair_shop",
            Self::Policy => "policy",
            Self::Claim => "claim",
            Self::RepairOrderLine => "repair_order_line",
        }
    }
}

pub struct DatasetStore {
    conn: Connection,
}

impl DatasetStore {
    pub fn open(path: &str) -> GenResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GenResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GenResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_dataset.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, seed: u64, version: &str) -> GenResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, started_at) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, seed as i64, version, 0i64],
        )?;
        Ok(())
    }

    pub fn run_exists(&self, run_id: &str) -> GenResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM run WHERE run_id = ?1", params![run_id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> GenResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (run_id, seq, stage, event_type, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.run_id,
                entry.seq as i64,
                entry.stage,
                entry.event_type,
                entry.payload,
            ],
        )?;
        Ok(())
    }

    pub fn events_for_run(&self, run_id: &str) -> GenResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, seq, stage, event_type, payload
             FROM event_log WHERE run_id = ?1
             ORDER BY seq ASC, id ASC",
        )?;
        let entries = stmt
            .query_map(params![run_id], |row| {
                Ok(EventLogEntry {
                    id:         Some(row.get(0)?),
                    run_id:     row.get(1)?,
                    seq:        row.get::<_, i64>(2)? as u64,
                    stage:      row.get(3)?,
                    event_type: row.get(4)?,
                    payload:    row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // ── Dataset ────────────────────────────────────────────────

    /// Write a whole run (run row, event log, the four tables and the
    /// summary) in one transaction. Any failure rolls everything back.
    pub fn write_run(
        &self,
        run_id: &str,
        seed: u64,
        version: &str,
        events: &[EventLogEntry],
        dataset: &Dataset,
        summary: &DatasetSummary,
    ) -> GenResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        self.insert_run(run_id, seed, version)?;
        for entry in events {
            self.append_event(entry)?;
        }
        write_dataset(self, run_id, dataset)?;
        self.save_summary(summary)?;
        tx.commit()?;
        Ok(())
    }

    // ── Summary ────────────────────────────────────────────────

    pub fn save_summary(&self, summary: &DatasetSummary) -> GenResult<()> {
        let json = serde_json::to_string(summary)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO run_summary (run_id, summary_json) VALUES (?1, ?2)",
            params![summary.run_id, json],
        )?;
        Ok(())
    }

    pub fn load_summary(&self, run_id: &str) -> GenResult<Option<DatasetSummary>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT summary_json FROM run_summary WHERE run_id = ?1",
                params![run_id],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(j) => Ok(Some(serde_json::from_str(&j)?)),
            None => Ok(None),
        }
    }
}
