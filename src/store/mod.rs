//! Incident store
//!
//! The resolution pipeline needs exactly two things from persistence: an
//! ordered snapshot to scan and an append for the outcome. `IncidentStore`
//! names that contract; `SqliteStore` is the SQLite-backed implementation.
//!
//! Schema:
//! - incidents: id, incident metadata, description pair, solution, priority,
//!   recorded_at

pub mod types;

pub use types::{IncidentRecord, IncidentRequest, ResolvedIncident, Snapshot, SnapshotEntry};

use crate::errors::Result;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::debug;

/// Read/append contract between the pipeline and persistence
pub trait IncidentStore {
    /// All stored incidents, priority descending, ties in insertion order
    fn load_ordered_snapshot(&self) -> Result<Snapshot>;

    /// Persist one resolved incident, returning its id
    fn append(&mut self, incident: &ResolvedIncident) -> Result<i64>;

    /// Persist several resolved incidents in one commit, returning how many were written
    fn append_batch(&mut self, incidents: &[ResolvedIncident]) -> Result<usize>;
}

const CREATE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS incidents (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        incident_number TEXT,
        customer_name TEXT,
        organization TEXT,
        department TEXT,
        description TEXT,
        detailed_description TEXT,
        reported_date TEXT,
        solution TEXT,
        priority INTEGER,
        recorded_at TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_incidents_priority ON incidents(priority DESC, id ASC);
";

const INSERT_INCIDENT: &str = "
    INSERT INTO incidents
    (incident_number, customer_name, organization, department, description,
     detailed_description, reported_date, solution, priority, recorded_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
";

/// SQLite-backed incident store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the database at `path` and ensure the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let store = Self {
            conn: Connection::open(path)?,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Private in-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create tables if missing
    pub fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(CREATE_SCHEMA)?;
        Ok(())
    }

    /// Number of stored incidents
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM incidents", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Most recently stored incidents, newest first
    pub fn list_recent(&self, limit: usize) -> Result<Vec<IncidentRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, incident_number, customer_name, organization, department, description,
                    detailed_description, reported_date, solution, priority, recorded_at
             FROM incidents ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(IncidentRecord {
                id: row.get(0)?,
                incident_number: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                customer_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                organization: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                department: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                description: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                detailed_description: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                reported_date: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
                solution: row.get(8)?,
                priority: row.get::<_, Option<i64>>(9)?.unwrap_or_default(),
                recorded_at: row.get(10)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn insert(conn: &Connection, incident: &ResolvedIncident) -> Result<i64> {
        let request = &incident.request;
        conn.execute(
            INSERT_INCIDENT,
            params![
                request.incident_num,
                request.customer_name,
                request.organization,
                request.department,
                request.description,
                request.detailed_description,
                request.reported_date,
                incident.solution,
                incident.priority,
                Utc::now(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl IncidentStore for SqliteStore {
    fn load_ordered_snapshot(&self) -> Result<Snapshot> {
        let mut stmt = self.conn.prepare(
            "SELECT description, detailed_description, solution, priority
             FROM incidents ORDER BY priority DESC, id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(SnapshotEntry {
                description: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                detailed_description: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                solution: row.get(2)?,
                priority: row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
            })
        })?;

        let mut snapshot = Vec::new();
        for row in rows {
            snapshot.push(row?);
        }

        debug!(candidates = snapshot.len(), "loaded incident snapshot");
        Ok(snapshot)
    }

    fn append(&mut self, incident: &ResolvedIncident) -> Result<i64> {
        Self::insert(&self.conn, incident)
    }

    fn append_batch(&mut self, incidents: &[ResolvedIncident]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for incident in incidents {
            Self::insert(&tx, incident)?;
        }
        tx.commit()?;
        Ok(incidents.len())
    }
}
