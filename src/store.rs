//! Persistence surface of the export pipeline. [`GraphStore`] is the seam
//! the commit engine writes through; [`SqliteExportStore`] is the bundled
//! SQLite-backed implementation. Tests inject recording or failing fakes
//! through the same trait.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use crate::errors::ExportError;
use crate::model::SanitizedBag;

/// Property name carrying the analysis-local id on every persisted node.
/// Phase-2 edge creation matches its endpoints against this property.
pub const CPG_ID_KEY: &str = "cpgId";

/// One node row of a bulk create operation: a sanitized property bag that
/// must contain [`CPG_ID_KEY`].
pub type NodeRow = SanitizedBag;

/// One edge row of a bulk create operation. Endpoints reference the
/// [`CPG_ID_KEY`] property written in phase 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgeRow {
    pub start_id: i64,
    pub end_id: i64,
    pub props: SanitizedBag,
}

/// Result of one bulk edge operation. An endpoint match yielding no node
/// silently creates nothing for that row; the store reports it here instead
/// of failing.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeOutcome {
    pub attempted: usize,
    pub created: usize,
    pub unmatched: usize,
}

impl EdgeOutcome {
    pub fn absorb(&mut self, other: EdgeOutcome) {
        self.attempted += other.attempted;
        self.created += other.created;
        self.unmatched += other.unmatched;
    }
}

/// Bulk-write operations the commit engine issues against the target
/// database.
pub trait GraphStore: Send + Sync {
    /// Removes all previously exported graph content (full-replace mode).
    fn clear(&self) -> Result<(), ExportError>;

    /// Creates one node per row, all carrying the given label set. Returns
    /// the number of nodes created.
    fn create_nodes(&self, label_set: &str, rows: &[NodeRow]) -> Result<usize, ExportError>;

    /// Creates one typed relationship per row whose endpoints both match a
    /// previously created node by [`CPG_ID_KEY`].
    fn create_edges(&self, edge_type: &str, rows: &[EdgeRow]) -> Result<EdgeOutcome, ExportError>;
}

/// A node read back from the store, for consumers and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredNode {
    pub labels: Vec<String>,
    pub cpg_id: i64,
    pub props: SanitizedBag,
}

/// An edge read back from the store, endpoints resolved to their cpg ids.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEdge {
    pub edge_type: String,
    pub start_cpg_id: i64,
    pub end_cpg_id: i64,
    pub props: SanitizedBag,
}

/// SQLite-backed [`GraphStore`]. The connection is shared read-write across
/// all commit workers of a run, serialized behind a mutex.
pub struct SqliteExportStore {
    conn: Mutex<Connection>,
}

impl SqliteExportStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExportError> {
        let conn = Connection::open(path).map_err(|e| ExportError::connection(e.to_string()))?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, ExportError> {
        let conn =
            Connection::open_in_memory().map_err(|e| ExportError::connection(e.to_string()))?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn node_count(&self) -> Result<usize, ExportError> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM export_nodes", [], |row| row.get(0))
            .map(|n: i64| n as usize)
            .map_err(|e| ExportError::query(e.to_string()))
    }

    pub fn edge_count(&self) -> Result<usize, ExportError> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM export_edges", [], |row| row.get(0))
            .map(|n: i64| n as usize)
            .map_err(|e| ExportError::query(e.to_string()))
    }

    /// Returns every stored node whose label set contains `label`.
    pub fn nodes_with_label(&self, label: &str) -> Result<Vec<StoredNode>, ExportError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT labels, cpg_id, props FROM export_nodes ORDER BY id")
            .map_err(|e| ExportError::query(e.to_string()))?;
        let rows = stmt
            .query_map([], row_to_node)
            .map_err(|e| ExportError::query(e.to_string()))?;
        let mut nodes = Vec::new();
        for node in rows {
            let node = node.map_err(|e| ExportError::query(e.to_string()))?;
            if node.labels.iter().any(|l| l == label) {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    pub fn edges_of_type(&self, edge_type: &str) -> Result<Vec<StoredEdge>, ExportError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT e.edge_type, s.cpg_id, t.cpg_id, e.props
                 FROM export_edges e
                 JOIN export_nodes s ON s.id = e.start_node
                 JOIN export_nodes t ON t.id = e.end_node
                 WHERE e.edge_type = ?1
                 ORDER BY e.id",
            )
            .map_err(|e| ExportError::query(e.to_string()))?;
        let rows = stmt
            .query_map(params![edge_type], row_to_edge)
            .map_err(|e| ExportError::query(e.to_string()))?;
        let mut edges = Vec::new();
        for edge in rows {
            edges.push(edge.map_err(|e| ExportError::query(e.to_string()))?);
        }
        Ok(edges)
    }
}

impl GraphStore for SqliteExportStore {
    fn clear(&self) -> Result<(), ExportError> {
        let conn = self.conn.lock();
        conn.execute_batch("DELETE FROM export_edges; DELETE FROM export_nodes;")
            .map_err(|e| ExportError::query(e.to_string()))
    }

    fn create_nodes(&self, label_set: &str, rows: &[NodeRow]) -> Result<usize, ExportError> {
        if label_set.trim().is_empty() {
            return Err(ExportError::invalid_input("label set must be set"));
        }
        let conn = self.conn.lock();
        for row in rows {
            let cpg_id = row
                .get(CPG_ID_KEY)
                .and_then(|v| v.as_int())
                .ok_or_else(|| {
                    ExportError::invalid_input(format!("node row is missing {CPG_ID_KEY}"))
                })?;
            let props = serde_json::to_string(row)
                .map_err(|e| ExportError::invalid_input(e.to_string()))?;
            conn.execute(
                "INSERT INTO export_nodes(labels, cpg_id, props) VALUES(?1, ?2, ?3)",
                params![label_set, cpg_id, props],
            )
            .map_err(|e| ExportError::query(e.to_string()))?;
        }
        Ok(rows.len())
    }

    fn create_edges(&self, edge_type: &str, rows: &[EdgeRow]) -> Result<EdgeOutcome, ExportError> {
        if edge_type.trim().is_empty() {
            return Err(ExportError::invalid_input("edge type must be set"));
        }
        let conn = self.conn.lock();
        let mut outcome = EdgeOutcome {
            attempted: rows.len(),
            ..EdgeOutcome::default()
        };
        for row in rows {
            let start = lookup_node(&conn, row.start_id)?;
            let end = lookup_node(&conn, row.end_id)?;
            let (Some(start), Some(end)) = (start, end) else {
                outcome.unmatched += 1;
                continue;
            };
            let props = serde_json::to_string(&row.props)
                .map_err(|e| ExportError::invalid_input(e.to_string()))?;
            conn.execute(
                "INSERT INTO export_edges(start_node, end_node, edge_type, props) VALUES(?1, ?2, ?3, ?4)",
                params![start, end, edge_type, props],
            )
            .map_err(|e| ExportError::query(e.to_string()))?;
            outcome.created += 1;
        }
        Ok(outcome)
    }
}

fn ensure_schema(conn: &Connection) -> Result<(), ExportError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS export_nodes (
            id     INTEGER PRIMARY KEY AUTOINCREMENT,
            labels TEXT NOT NULL,
            cpg_id INTEGER NOT NULL,
            props  TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS export_edges (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            start_node INTEGER NOT NULL,
            end_node   INTEGER NOT NULL,
            edge_type  TEXT NOT NULL,
            props      TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_export_nodes_cpg ON export_nodes(cpg_id);
        CREATE INDEX IF NOT EXISTS idx_export_edges_type ON export_edges(edge_type);
        "#,
    )
    .map_err(|e| ExportError::schema(e.to_string()))
}

fn lookup_node(conn: &Connection, cpg_id: i64) -> Result<Option<i64>, ExportError> {
    conn.query_row(
        "SELECT id FROM export_nodes WHERE cpg_id=?1 ORDER BY id LIMIT 1",
        params![cpg_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| ExportError::query(e.to_string()))
}

fn row_to_node(row: &rusqlite::Row<'_>) -> Result<StoredNode, rusqlite::Error> {
    let labels: String = row.get(0)?;
    let props: String = row.get(2)?;
    let props: SanitizedBag = serde_json::from_str(&props).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(StoredNode {
        labels: labels.split(':').map(|l| l.to_string()).collect(),
        cpg_id: row.get(1)?,
        props,
    })
}

fn row_to_edge(row: &rusqlite::Row<'_>) -> Result<StoredEdge, rusqlite::Error> {
    let props: String = row.get(3)?;
    let props: SanitizedBag = serde_json::from_str(&props).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(StoredEdge {
        edge_type: row.get(0)?,
        start_cpg_id: row.get(1)?,
        end_cpg_id: row.get(2)?,
        props,
    })
}
