use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use duckdb::{params, Connection, Row};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::interfaces::{GraphStore, VectorHit};
use crate::domain::error::GraphError;
use crate::domain::models::{Edge, GraphStats, LevelProgress, Location, Node, NodeLabel, RelationshipType, SummaryStatus};

const VECTOR_DIMENSIONS: usize = 768;

const VECTOR_LABELS: [NodeLabel; 6] = [
    NodeLabel::File,
    NodeLabel::Class,
    NodeLabel::Method,
    NodeLabel::Function,
    NodeLabel::Variable,
    NodeLabel::Interface,
];

fn table_name(label: NodeLabel) -> String {
    format!("node_{}", label.as_str().to_lowercase())
}

/// `GraphStore` over DuckDB using the VSS extension for vector search (spec
/// §9's "one per-label vector index"). Rather than one shared table, each
/// label gets its own physical table and, for the six labels the spec names
/// as embeddable, its own HNSW index — generalizing the teacher's
/// per-namespace-schema technique in `duckdb_vector_repository.rs` from "one
/// schema per namespace" to "one table per label". A small `node_index`
/// table maps `id -> label` so callers can address a node without knowing
/// which physical table it lives in.
pub struct DuckdbGraphStore {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbGraphStore {
    pub fn new(path: &Path) -> Result<Self, GraphError> {
        let conn = Connection::open(path).map_err(|e| GraphError::store(format!("failed to open DuckDB database: {e}")))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, GraphError> {
        let conn = Connection::open_in_memory().map_err(|e| GraphError::store(format!("failed to open in-memory DuckDB: {e}")))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn vector_to_array_literal(vector: &[f32]) -> Result<String, GraphError> {
        if vector.len() != VECTOR_DIMENSIONS {
            return Err(GraphError::store(format!(
                "expected embedding dimension {VECTOR_DIMENSIONS}, got {}",
                vector.len()
            )));
        }
        let mut s = String::with_capacity(vector.len() * 8);
        s.push('[');
        for (i, v) in vector.iter().enumerate() {
            if i > 0 {
                s.push_str(", ");
            }
            s.push_str(&format!("{v}"));
        }
        s.push(']');
        s.push_str(&format!("::FLOAT[{VECTOR_DIMENSIONS}]"));
        Ok(s)
    }

    fn row_to_node(label: NodeLabel, row: &Row) -> Result<Node, duckdb::Error> {
        let location = match (row.get::<_, Option<i64>>(4)?, row.get::<_, Option<i64>>(5)?) {
            (Some(start), Some(end)) => Some(Location {
                start_line: start as u32,
                end_line: end as u32,
                start_column: row.get::<_, Option<i64>>(6)?.map(|v| v as u32),
                end_column: row.get::<_, Option<i64>>(7)?.map(|v| v as u32),
            }),
            _ => None,
        };
        let properties: HashMap<String, serde_json::Value> = row
            .get::<_, Option<String>>(10)?
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        Ok(Node::reconstitute(
            row.get::<_, String>(0)?,
            label,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
            location,
            row.get::<_, Option<String>>(8)?,
            None,
            SummaryStatus::parse(&row.get::<_, String>(9)?),
            properties,
        ))
    }

    async fn label_of(&self, node_id: &str) -> Result<Option<NodeLabel>, GraphError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT label FROM node_index WHERE id = ?")
            .map_err(|e| GraphError::store(format!("failed to prepare node_index lookup: {e}")))?;
        let label: Option<String> = stmt
            .query_row(params![node_id], |row| row.get(0))
            .ok();
        Ok(label.and_then(|s| NodeLabel::parse(&s)))
    }
}

#[async_trait]
impl GraphStore for DuckdbGraphStore {
    async fn init_schema(&self) -> Result<(), GraphError> {
        let conn = self.conn.lock().await;
        conn.execute_batch("INSTALL vss; LOAD vss; SET hnsw_enable_experimental_persistence = true;")
            .map_err(|e| GraphError::store(format!("failed to initialize VSS extension: {e}")))?;

        for label in NodeLabel::ALL {
            let table = table_name(label);
            let extra_columns = if label == NodeLabel::File {
                ", path TEXT, checksum TEXT, language TEXT, size_bytes BIGINT"
            } else {
                ""
            };
            let sql = format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    full_name TEXT NOT NULL,
                    raw_code TEXT,
                    start_line BIGINT,
                    end_line BIGINT,
                    start_column BIGINT,
                    end_column BIGINT,
                    generated_summary TEXT,
                    summary_status TEXT NOT NULL DEFAULT 'unset',
                    properties TEXT{extra_columns}
                );
                "#
            );
            conn.execute_batch(&sql)
                .map_err(|e| GraphError::store(format!("failed to create table {table}: {e}")))?;

            if VECTOR_LABELS.contains(&label) {
                conn.execute_batch(&format!(
                    "ALTER TABLE {table} ADD COLUMN IF NOT EXISTS embedding FLOAT[{VECTOR_DIMENSIONS}];"
                ))
                .map_err(|e| GraphError::store(format!("failed to add embedding column to {table}: {e}")))?;
                conn.execute_batch(&format!(
                    "CREATE INDEX IF NOT EXISTS {table}_hnsw_idx ON {table} USING HNSW (embedding) WITH (metric = 'cosine');"
                ))
                .map_err(|e| GraphError::store(format!("failed to create HNSW index for {table}: {e}")))?;
            }
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS node_index (id TEXT PRIMARY KEY, label TEXT NOT NULL);

            CREATE TABLE IF NOT EXISTS edges (
                source_id TEXT NOT NULL,
                target_id TEXT NOT NULL,
                relationship_type TEXT NOT NULL,
                properties TEXT,
                PRIMARY KEY (source_id, relationship_type, target_id)
            );
            "#,
        )
        .map_err(|e| GraphError::store(format!("failed to create index tables: {e}")))?;

        debug!("DuckDB graph store schema initialized");
        Ok(())
    }

    async fn upsert_nodes(&self, nodes: &[Node]) -> Result<(), GraphError> {
        if nodes.is_empty() {
            return Ok(());
        }
        let mut by_label: HashMap<NodeLabel, Vec<&Node>> = HashMap::new();
        for node in nodes {
            by_label.entry(node.label()).or_default().push(node);
        }

        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| GraphError::store(format!("failed to begin transaction: {e}")))?;

        for (label, nodes) in by_label {
            let table = table_name(label);
            {
                let sql = if label == NodeLabel::File {
                    format!(
                        "INSERT OR REPLACE INTO {table} \
                         (id, name, full_name, raw_code, start_line, end_line, start_column, end_column, generated_summary, summary_status, properties, path, checksum, language, size_bytes) \
                         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
                    )
                } else {
                    format!(
                        "INSERT OR REPLACE INTO {table} \
                         (id, name, full_name, raw_code, start_line, end_line, start_column, end_column, generated_summary, summary_status, properties) \
                         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
                    )
                };
                let mut stmt = tx
                    .prepare(&sql)
                    .map_err(|e| GraphError::store(format!("failed to prepare insert into {table}: {e}")))?;

                let mut index_stmt = tx
                    .prepare("INSERT OR REPLACE INTO node_index (id, label) VALUES (?, ?)")
                    .map_err(|e| GraphError::store(format!("failed to prepare node_index insert: {e}")))?;

                for node in nodes {
                    let location = node.location();
                    let properties = serde_json::to_string(node.properties()).unwrap_or_default();

                    if label == NodeLabel::File {
                        let path = node.property("path").and_then(|v| v.as_str());
                        let checksum = node.property("checksum").and_then(|v| v.as_str());
                        let language = node.property("language").and_then(|v| v.as_str());
                        let size_bytes = node.property("size_bytes").and_then(|v| v.as_i64());
                        stmt.execute(params![
                            node.id(),
                            node.name(),
                            node.full_name(),
                            node.raw_code(),
                            location.map(|l| l.start_line as i64),
                            location.map(|l| l.end_line as i64),
                            location.and_then(|l| l.start_column).map(|v| v as i64),
                            location.and_then(|l| l.end_column).map(|v| v as i64),
                            node.generated_summary(),
                            node.summary_status().as_str(),
                            properties,
                            path,
                            checksum,
                            language,
                            size_bytes,
                        ])
                        .map_err(|e| GraphError::store(format!("failed to upsert node {}: {e}", node.id())))?;
                    } else {
                        stmt.execute(params![
                            node.id(),
                            node.name(),
                            node.full_name(),
                            node.raw_code(),
                            location.map(|l| l.start_line as i64),
                            location.map(|l| l.end_line as i64),
                            location.and_then(|l| l.start_column).map(|v| v as i64),
                            location.and_then(|l| l.end_column).map(|v| v as i64),
                            node.generated_summary(),
                            node.summary_status().as_str(),
                            properties,
                        ])
                        .map_err(|e| GraphError::store(format!("failed to upsert node {}: {e}", node.id())))?;
                    }

                    index_stmt
                        .execute(params![node.id(), label.as_str()])
                        .map_err(|e| GraphError::store(format!("failed to index node {}: {e}", node.id())))?;
                }
            }
        }

        tx.commit().map_err(|e| GraphError::store(format!("failed to commit node upsert: {e}")))?;
        Ok(())
    }

    async fn upsert_edges(&self, edges: &[Edge]) -> Result<(), GraphError> {
        if edges.is_empty() {
            return Ok(());
        }
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("INSERT OR REPLACE INTO edges (source_id, target_id, relationship_type, properties) VALUES (?, ?, ?, ?)")
            .map_err(|e| GraphError::store(format!("failed to prepare edge insert: {e}")))?;

        for edge in edges {
            let properties = serde_json::to_string(edge.properties()).unwrap_or_default();
            stmt.execute(params![
                edge.source_id(),
                edge.target_id(),
                edge.relationship_type().as_str(),
                properties,
            ])
            .map_err(|e| GraphError::store(format!("failed to upsert edge: {e}")))?;
        }
        Ok(())
    }

    async fn delete_file_subgraph(&self, file_path: &str) -> Result<(), GraphError> {
        let conn = self.conn.lock().await;
        let file_table = table_name(NodeLabel::File);
        let file_id: Option<String> = conn
            .prepare(&format!("SELECT id FROM {file_table} WHERE path = ?"))
            .and_then(|mut stmt| stmt.query_row(params![file_path], |row| row.get(0)))
            .ok();

        let Some(file_id) = file_id else {
            return Ok(());
        };

        let mut to_delete = vec![file_id.clone()];
        let mut frontier = vec![file_id.clone()];
        while let Some(current) = frontier.pop() {
            let mut stmt = conn
                .prepare("SELECT target_id FROM edges WHERE source_id = ?")
                .map_err(|e| GraphError::store(format!("failed to prepare subgraph walk: {e}")))?;
            let mut rows = stmt
                .query(params![current])
                .map_err(|e| GraphError::store(format!("failed to walk subgraph: {e}")))?;
            while let Some(row) = rows.next().map_err(|e| GraphError::store(format!("failed to read subgraph row: {e}")))? {
                let target: String = row.get(0).map_err(|e| GraphError::store(format!("failed to read target id: {e}")))?;
                if !to_delete.contains(&target) {
                    to_delete.push(target.clone());
                    frontier.push(target);
                }
            }
        }

        for id in &to_delete {
            if let Some(label) = conn
                .prepare("SELECT label FROM node_index WHERE id = ?")
                .and_then(|mut stmt| stmt.query_row(params![id], |row| row.get::<_, String>(0)))
                .ok()
                .and_then(|s| NodeLabel::parse(&s))
            {
                let table = table_name(label);
                conn.execute(&format!("DELETE FROM {table} WHERE id = ?"), params![id])
                    .map_err(|e| GraphError::store(format!("failed to delete node {id}: {e}")))?;
            }
            conn.execute("DELETE FROM node_index WHERE id = ?", params![id])
                .map_err(|e| GraphError::store(format!("failed to delete node_index entry: {e}")))?;
            conn.execute("DELETE FROM edges WHERE source_id = ? OR target_id = ?", params![id, id])
                .map_err(|e| GraphError::store(format!("failed to delete edges for {id}: {e}")))?;
        }

        Ok(())
    }

    async fn get_node(&self, id: &str) -> Result<Option<Node>, GraphError> {
        let Some(label) = self.label_of(id).await? else {
            return Ok(None);
        };
        let conn = self.conn.lock().await;
        let table = table_name(label);
        let sql = format!(
            "SELECT id, name, full_name, raw_code, start_line, end_line, start_column, end_column, generated_summary, summary_status, properties FROM {table} WHERE id = ?"
        );
        let mut stmt = conn.prepare(&sql).map_err(|e| GraphError::store(format!("failed to prepare get_node: {e}")))?;
        let node = stmt.query_row(params![id], |row| Ok(Self::row_to_node(label, row))).ok();
        match node {
            Some(Ok(node)) => Ok(Some(node)),
            _ => Ok(None),
        }
    }

    async fn find_by_name(&self, name: &str, labels: &[NodeLabel], limit: usize) -> Result<Vec<Node>, GraphError> {
        let conn = self.conn.lock().await;
        let labels: Vec<NodeLabel> = if labels.is_empty() { NodeLabel::ALL.to_vec() } else { labels.to_vec() };
        let mut results = Vec::new();

        for label in labels {
            let table = table_name(label);
            let sql = format!(
                "SELECT id, name, full_name, raw_code, start_line, end_line, start_column, end_column, generated_summary, summary_status, properties \
                 FROM {table} WHERE name = ? OR full_name = ? OR full_name LIKE ? LIMIT ?"
            );
            let mut stmt = match conn.prepare(&sql) {
                Ok(stmt) => stmt,
                Err(_) => continue,
            };
            let like_pattern = format!("%{name}%");
            let mut rows = match stmt.query(params![name, name, like_pattern, limit as i64]) {
                Ok(rows) => rows,
                Err(_) => continue,
            };
            while let Some(row) = rows.next().map_err(|e| GraphError::store(format!("failed to read find_by_name row: {e}")))? {
                if let Ok(node) = Self::row_to_node(label, row) {
                    results.push(node);
                }
            }
            if results.len() >= limit {
                break;
            }
        }

        results.truncate(limit);
        Ok(results)
    }

    async fn nodes_ready_for_summary(&self, label: NodeLabel, batch_size: usize) -> Result<Vec<Node>, GraphError> {
        let conn = self.conn.lock().await;
        let table = table_name(label);
        let sql = format!(
            "SELECT id, name, full_name, raw_code, start_line, end_line, start_column, end_column, generated_summary, summary_status, properties \
             FROM {table} WHERE (generated_summary IS NULL OR generated_summary = '') AND summary_status <> 'processing' LIMIT ?"
        );
        let mut stmt = conn.prepare(&sql).map_err(|e| GraphError::store(format!("failed to prepare nodes_ready_for_summary: {e}")))?;
        let mut rows = stmt
            .query(params![batch_size as i64])
            .map_err(|e| GraphError::store(format!("failed to run nodes_ready_for_summary: {e}")))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(|e| GraphError::store(format!("failed to read row: {e}")))? {
            if let Ok(node) = Self::row_to_node(label, row) {
                out.push(node);
            }
        }
        Ok(out)
    }

    async fn nodes_missing_embedding(&self, label: NodeLabel, batch_size: usize) -> Result<Vec<Node>, GraphError> {
        if !VECTOR_LABELS.contains(&label) {
            return Ok(vec![]);
        }
        let conn = self.conn.lock().await;
        let table = table_name(label);
        let sql = format!(
            "SELECT id, name, full_name, raw_code, start_line, end_line, start_column, end_column, generated_summary, summary_status, properties \
             FROM {table} WHERE embedding IS NULL LIMIT ?"
        );
        let mut stmt = conn.prepare(&sql).map_err(|e| GraphError::store(format!("failed to prepare nodes_missing_embedding: {e}")))?;
        let mut rows = stmt
            .query(params![batch_size as i64])
            .map_err(|e| GraphError::store(format!("failed to run nodes_missing_embedding: {e}")))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(|e| GraphError::store(format!("failed to read row: {e}")))? {
            if let Ok(node) = Self::row_to_node(label, row) {
                out.push(node);
            }
        }
        Ok(out)
    }

    async fn child_summaries(&self, node_id: &str) -> Result<Vec<String>, GraphError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT target_id FROM edges WHERE source_id = ? AND relationship_type IN ('CONTAINS', 'DEFINES', 'DECLARES')")
            .map_err(|e| GraphError::store(format!("failed to prepare child lookup: {e}")))?;
        let mut rows = stmt.query(params![node_id]).map_err(|e| GraphError::store(format!("failed to run child lookup: {e}")))?;

        let mut ids = Vec::new();
        while let Some(row) = rows.next().map_err(|e| GraphError::store(format!("failed to read child id: {e}")))? {
            ids.push(row.get::<_, String>(0).map_err(|e| GraphError::store(format!("failed to decode child id: {e}")))?);
        }
        drop(rows);
        drop(stmt);
        drop(conn);

        let mut summaries = Vec::new();
        for id in ids {
            if let Some(node) = self.get_node(&id).await? {
                if let Some(summary) = node.generated_summary() {
                    if !summary.is_empty() {
                        summaries.push(summary.to_string());
                    }
                }
            }
        }
        Ok(summaries)
    }

    async fn related_summaries(&self, node_id: &str, limit: usize) -> Result<Vec<String>, GraphError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT target_id FROM edges WHERE source_id = ? AND relationship_type IN ('CALLS', 'USES', 'REFERENCES') LIMIT ?")
            .map_err(|e| GraphError::store(format!("failed to prepare related lookup: {e}")))?;
        let mut rows = stmt
            .query(params![node_id, limit as i64])
            .map_err(|e| GraphError::store(format!("failed to run related lookup: {e}")))?;

        let mut ids = Vec::new();
        while let Some(row) = rows.next().map_err(|e| GraphError::store(format!("failed to read related id: {e}")))? {
            ids.push(row.get::<_, String>(0).map_err(|e| GraphError::store(format!("failed to decode related id: {e}")))?);
        }
        drop(rows);
        drop(stmt);
        drop(conn);

        let mut summaries = Vec::new();
        for id in ids {
            if let Some(node) = self.get_node(&id).await? {
                if let Some(summary) = node.generated_summary() {
                    if !summary.is_empty() {
                        summaries.push(summary.to_string());
                    }
                }
            }
        }
        Ok(summaries)
    }

    async fn dependencies_ready(&self, node_id: &str) -> Result<bool, GraphError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT target_id FROM edges WHERE source_id = ? AND relationship_type IN ('CONTAINS', 'DEFINES', 'DECLARES')")
            .map_err(|e| GraphError::store(format!("failed to prepare dependency lookup: {e}")))?;
        let mut rows = stmt.query(params![node_id]).map_err(|e| GraphError::store(format!("failed to run dependency lookup: {e}")))?;

        let mut ids = Vec::new();
        while let Some(row) = rows.next().map_err(|e| GraphError::store(format!("failed to read dependency id: {e}")))? {
            ids.push(row.get::<_, String>(0).map_err(|e| GraphError::store(format!("failed to decode dependency id: {e}")))?);
        }
        drop(rows);
        drop(stmt);
        drop(conn);

        for id in ids {
            if let Some(node) = self.get_node(&id).await? {
                if node.label().is_summarizable() && !node.has_summary() {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    async fn mark_summary_processing(&self, node_id: &str) -> Result<(), GraphError> {
        let Some(label) = self.label_of(node_id).await? else {
            return Err(GraphError::not_found(format!("node {node_id} not found")));
        };
        let conn = self.conn.lock().await;
        let table = table_name(label);
        conn.execute(&format!("UPDATE {table} SET summary_status = 'processing' WHERE id = ?"), params![node_id])
            .map_err(|e| GraphError::store(format!("failed to mark {node_id} processing: {e}")))?;
        Ok(())
    }

    async fn set_summary(&self, node_id: &str, summary: &str) -> Result<(), GraphError> {
        let Some(label) = self.label_of(node_id).await? else {
            return Err(GraphError::not_found(format!("node {node_id} not found")));
        };
        let conn = self.conn.lock().await;
        let table = table_name(label);
        conn.execute(
            &format!("UPDATE {table} SET generated_summary = ?, summary_status = 'completed' WHERE id = ?"),
            params![summary, node_id],
        )
        .map_err(|e| GraphError::store(format!("failed to set summary for {node_id}: {e}")))?;
        Ok(())
    }

    async fn set_embedding(&self, node_id: &str, embedding: &[f32]) -> Result<(), GraphError> {
        let Some(label) = self.label_of(node_id).await? else {
            return Err(GraphError::not_found(format!("node {node_id} not found")));
        };
        if !VECTOR_LABELS.contains(&label) {
            return Err(GraphError::store(format!("label {label} has no vector index")));
        }
        let array_lit = Self::vector_to_array_literal(embedding)?;
        let conn = self.conn.lock().await;
        let table = table_name(label);
        conn.execute(&format!("UPDATE {table} SET embedding = {array_lit} WHERE id = ?"), params![node_id])
            .map_err(|e| GraphError::store(format!("failed to set embedding for {node_id}: {e}")))?;
        Ok(())
    }

    async fn reset_processing_status(&self) -> Result<usize, GraphError> {
        let conn = self.conn.lock().await;
        let mut total = 0usize;
        for label in NodeLabel::ALL {
            let table = table_name(label);
            let changed = conn
                .execute(&format!("UPDATE {table} SET summary_status = 'unset' WHERE summary_status = 'processing'"), [])
                .map_err(|e| GraphError::store(format!("failed to reset processing status in {table}: {e}")))?;
            total += changed;
        }
        Ok(total)
    }

    async fn summarization_progress(&self, label: NodeLabel) -> Result<LevelProgress, GraphError> {
        let conn = self.conn.lock().await;
        let table = table_name(label);
        let total: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .map_err(|e| GraphError::store(format!("failed to count {table}: {e}")))?;
        let completed: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {table} WHERE summary_status = 'completed'"),
                [],
                |row| row.get(0),
            )
            .map_err(|e| GraphError::store(format!("failed to count completed {table}: {e}")))?;
        let processing: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {table} WHERE summary_status = 'processing'"),
                [],
                |row| row.get(0),
            )
            .map_err(|e| GraphError::store(format!("failed to count processing {table}: {e}")))?;

        Ok(LevelProgress {
            total: total as usize,
            completed: completed as usize,
            processing: processing as usize,
            remaining: (total - completed - processing).max(0) as usize,
        })
    }

    async fn vector_knn(&self, label: NodeLabel, query_embedding: &[f32], k: usize, min_similarity: f32) -> Result<Vec<VectorHit>, GraphError> {
        if !VECTOR_LABELS.contains(&label) {
            return Ok(vec![]);
        }
        let array_lit = Self::vector_to_array_literal(query_embedding)?;
        let conn = self.conn.lock().await;
        let table = table_name(label);
        let sql = format!(
            "SELECT id, 1.0 - array_cosine_distance(embedding, {array_lit}) AS score \
             FROM {table} WHERE embedding IS NOT NULL \
             ORDER BY array_cosine_distance(embedding, {array_lit}) LIMIT ?"
        );
        let mut stmt = conn.prepare(&sql).map_err(|e| GraphError::store(format!("failed to prepare vector_knn: {e}")))?;
        let mut rows = stmt
            .query(params![k as i64])
            .map_err(|e| GraphError::store(format!("failed to run vector_knn: {e}")))?;

        let mut hits = Vec::new();
        while let Some(row) = rows.next().map_err(|e| GraphError::store(format!("failed to read vector_knn row: {e}")))? {
            let score: f32 = row.get(1).map_err(|e| GraphError::store(format!("failed to read similarity: {e}")))?;
            if score < min_similarity {
                continue;
            }
            hits.push(VectorHit {
                node_id: row.get(0).map_err(|e| GraphError::store(format!("failed to read id: {e}")))?,
                similarity: score,
            });
        }
        Ok(hits)
    }

    async fn neighbors(&self, node_id: &str, relationship_types: &[RelationshipType], incoming: bool) -> Result<Vec<(Node, RelationshipType)>, GraphError> {
        let conn = self.conn.lock().await;
        let types: Vec<&'static str> = relationship_types.iter().map(|t| t.as_str()).collect();
        let placeholders = types.iter().map(|t| format!("'{t}'")).collect::<Vec<_>>().join(", ");
        let (select_col, filter_col) = if incoming { ("source_id", "target_id") } else { ("target_id", "source_id") };
        let sql = format!(
            "SELECT {select_col}, relationship_type FROM edges WHERE {filter_col} = ? AND relationship_type IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql).map_err(|e| GraphError::store(format!("failed to prepare neighbors: {e}")))?;
        let mut rows = stmt.query(params![node_id]).map_err(|e| GraphError::store(format!("failed to run neighbors: {e}")))?;

        let mut pairs = Vec::new();
        while let Some(row) = rows.next().map_err(|e| GraphError::store(format!("failed to read neighbor row: {e}")))? {
            let id: String = row.get(0).map_err(|e| GraphError::store(format!("failed to read neighbor id: {e}")))?;
            let rt: String = row.get(1).map_err(|e| GraphError::store(format!("failed to read relationship type: {e}")))?;
            if let Some(rt) = RelationshipType::parse(&rt) {
                pairs.push((id, rt));
            }
        }
        drop(rows);
        drop(stmt);
        drop(conn);

        let mut out = Vec::new();
        for (id, rt) in pairs {
            if let Some(node) = self.get_node(&id).await? {
                out.push((node, rt));
            }
        }
        Ok(out)
    }

    async fn stats(&self) -> Result<GraphStats, GraphError> {
        let conn = self.conn.lock().await;
        let mut stats = GraphStats::default();

        for label in NodeLabel::ALL {
            let table = table_name(label);
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .unwrap_or(0);
            stats.node_counts_by_label.insert(label.to_string(), count as usize);

            let summarized: i64 = conn
                .query_row(
                    &format!("SELECT COUNT(*) FROM {table} WHERE generated_summary IS NOT NULL AND generated_summary <> ''"),
                    [],
                    |row| row.get(0),
                )
                .unwrap_or(0);
            stats.summarized_count += summarized as usize;

            if VECTOR_LABELS.contains(&label) {
                let embedded: i64 = conn
                    .query_row(&format!("SELECT COUNT(*) FROM {table} WHERE embedding IS NOT NULL"), [], |row| row.get(0))
                    .unwrap_or(0);
                stats.embedded_count += embedded as usize;
            }
        }

        let mut stmt = conn
            .prepare("SELECT relationship_type, COUNT(*) FROM edges GROUP BY relationship_type")
            .map_err(|e| GraphError::store(format!("failed to prepare relationship counts: {e}")))?;
        let mut rows = stmt.query([]).map_err(|e| GraphError::store(format!("failed to run relationship counts: {e}")))?;
        while let Some(row) = rows.next().map_err(|e| GraphError::store(format!("failed to read relationship count row: {e}")))? {
            let rt: String = row.get(0).map_err(|e| GraphError::store(format!("failed to read relationship type: {e}")))?;
            let count: i64 = row.get(1).map_err(|e| GraphError::store(format!("failed to read count: {e}")))?;
            stats.relationship_counts_by_type.insert(rt, count as usize);
        }
        drop(rows);
        drop(stmt);

        let file_table = table_name(NodeLabel::File);
        stats.file_count = stats.node_counts_by_label.get(&NodeLabel::File.to_string()).copied().unwrap_or(0);

        let mut lang_stmt = conn
            .prepare(&format!("SELECT language, COUNT(*), COALESCE(SUM(size_bytes), 0) FROM {file_table} GROUP BY language"))
            .map_err(|e| GraphError::store(format!("failed to prepare language stats: {e}")))?;
        let mut lang_rows = lang_stmt.query([]).map_err(|e| GraphError::store(format!("failed to run language stats: {e}")))?;
        while let Some(row) = lang_rows.next().map_err(|e| GraphError::store(format!("failed to read language row: {e}")))? {
            let language: Option<String> = row.get(0).ok();
            let count: i64 = row.get(1).map_err(|e| GraphError::store(format!("failed to read language count: {e}")))?;
            let size: i64 = row.get(2).map_err(|e| GraphError::store(format!("failed to read size: {e}")))?;
            if let Some(language) = language {
                stats.languages.insert(language, count as usize);
            }
            stats.total_size_bytes += size as u64;
        }

        Ok(stats)
    }

    async fn stored_checksums(&self) -> Result<HashMap<PathBuf, String>, GraphError> {
        let conn = self.conn.lock().await;
        let file_table = table_name(NodeLabel::File);
        let mut stmt = conn
            .prepare(&format!("SELECT path, checksum FROM {file_table} WHERE path IS NOT NULL"))
            .map_err(|e| GraphError::store(format!("failed to prepare stored_checksums: {e}")))?;
        let mut rows = stmt.query([]).map_err(|e| GraphError::store(format!("failed to run stored_checksums: {e}")))?;

        let mut out = HashMap::new();
        while let Some(row) = rows.next().map_err(|e| GraphError::store(format!("failed to read checksum row: {e}")))? {
            let path: String = row.get(0).map_err(|e| GraphError::store(format!("failed to read path: {e}")))?;
            let checksum: Option<String> = row.get(1).ok();
            if let Some(checksum) = checksum {
                out.insert(PathBuf::from(path), checksum);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_name_is_lowercased_label() {
        assert_eq!(table_name(NodeLabel::Class), "node_class");
        assert_eq!(table_name(NodeLabel::File), "node_file");
    }

    #[test]
    fn vector_literal_rejects_wrong_dimension() {
        assert!(DuckdbGraphStore::vector_to_array_literal(&[0.1, 0.2]).is_err());
    }
}
