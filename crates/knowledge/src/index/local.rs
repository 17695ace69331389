//! SQLite-backed local index.
//!
//! One database file per index under `.aixp/indexes/`. Chunks are stored with
//! a hashed trigram vector and ranked by cosine similarity at query time.

use super::vectors;
use super::{search_envelope, IndexService};
use crate::types::{Chunk, ChunkMeta, IndexInfo};
use aixp_core::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalIndex {
    dir: PathBuf,
}

struct StoredChunk {
    chunk: Chunk,
    vector: Vec<f32>,
}

impl LocalIndex {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn db_path(&self, index_id: &str) -> PathBuf {
        self.dir.join(format!("{}.sqlite", index_id))
    }

    /// Open an index that must already exist.
    fn open_existing(&self, index_id: &str) -> AppResult<Connection> {
        let path = self.db_path(index_id);
        if !path.exists() {
            return Err(AppError::Index(format!(
                "Index '{}' not found. Run 'aixp create-index' first.",
                index_id
            )));
        }
        open(&path)
    }
}

/// Derive an index id from a display name.
fn index_id_for(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            id.push(c.to_ascii_lowercase());
        } else if !id.ends_with('-') {
            id.push('-');
        }
    }
    id.trim_matches('-').to_string()
}

fn open(path: &Path) -> AppResult<Connection> {
    let conn = Connection::open(path)
        .map_err(|e| AppError::Index(format!("Failed to open SQLite index: {}", e)))?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS index_info (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS chunks (
            id TEXT PRIMARY KEY,
            text TEXT NOT NULL,
            source TEXT NOT NULL,
            page INTEGER,
            row_index INTEGER,
            vector BLOB NOT NULL
        );
        "#,
    )
    .map_err(|e| AppError::Index(format!("Failed to create tables: {}", e)))?;

    Ok(conn)
}

fn load_chunks(conn: &Connection) -> AppResult<Vec<StoredChunk>> {
    let mut stmt = conn
        .prepare("SELECT id, text, source, page, row_index, vector FROM chunks")
        .map_err(|e| AppError::Index(format!("Failed to prepare query: {}", e)))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                Chunk {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    meta: ChunkMeta {
                        source: row.get(2)?,
                        page: row.get::<_, Option<i64>>(3)?.map(|p| p as u32),
                        row: row.get::<_, Option<i64>>(4)?.map(|r| r as u64),
                    },
                },
                row.get::<_, Vec<u8>>(5)?,
            ))
        })
        .map_err(|e| AppError::Index(format!("Failed to query chunks: {}", e)))?;

    let mut chunks = Vec::new();
    for row in rows {
        let (chunk, bytes) =
            row.map_err(|e| AppError::Index(format!("Failed to read chunk: {}", e)))?;
        chunks.push(StoredChunk {
            chunk,
            vector: vectors::from_bytes(&bytes)?,
        });
    }
    Ok(chunks)
}

#[async_trait]
impl IndexService for LocalIndex {
    fn backend(&self) -> &str {
        "local"
    }

    async fn create(&self, name: &str, description: &str) -> AppResult<IndexInfo> {
        let id = index_id_for(name);
        if id.is_empty() {
            return Err(AppError::Index(format!(
                "Index name '{}' has no usable characters",
                name
            )));
        }

        std::fs::create_dir_all(&self.dir)?;
        let conn = open(&self.db_path(&id))?;

        let existing: Option<(String, String)> = conn
            .query_row(
                "SELECT name, description FROM index_info WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| AppError::Index(format!("Failed to read index info: {}", e)))?;

        if let Some((name, description)) = existing {
            tracing::info!("Index '{}' already exists; reusing it", id);
            return Ok(IndexInfo {
                id,
                name,
                description,
            });
        }

        conn.execute(
            "INSERT INTO index_info (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id, name, description, Utc::now().to_rfc3339()],
        )
        .map_err(|e| AppError::Index(format!("Failed to record index info: {}", e)))?;

        tracing::info!("Created local index '{}' at {:?}", id, self.db_path(&id));
        Ok(IndexInfo {
            id,
            name: name.to_string(),
            description: description.to_string(),
        })
    }

    async fn ingest(&self, index_id: &str, chunks: &[Chunk]) -> AppResult<usize> {
        let mut conn = self.open_existing(index_id)?;
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Index(format!("Failed to start transaction: {}", e)))?;

        for chunk in chunks {
            tx.execute(
                "INSERT OR REPLACE INTO chunks (id, text, source, page, row_index, vector)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    chunk.id,
                    chunk.text,
                    chunk.meta.source,
                    chunk.meta.page.map(i64::from),
                    chunk.meta.row.map(|r| r as i64),
                    vectors::to_bytes(&vectors::embed(&chunk.text)),
                ],
            )
            .map_err(|e| AppError::Index(format!("Failed to insert chunk {}: {}", chunk.id, e)))?;
        }

        tx.commit()
            .map_err(|e| AppError::Index(format!("Failed to commit chunks: {}", e)))?;

        tracing::debug!("Stored {} chunks in local index '{}'", chunks.len(), index_id);
        Ok(chunks.len())
    }

    async fn search(&self, index_id: &str, query: &str, top_k: usize) -> AppResult<Value> {
        let conn = self.open_existing(index_id)?;
        let query_vector = vectors::embed(query);

        let mut scored: Vec<(StoredChunk, f32)> = load_chunks(&conn)?
            .into_iter()
            .map(|stored| {
                let score = vectors::cosine_similarity(&query_vector, &stored.vector);
                (stored, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        tracing::debug!(
            "Local search in '{}' returned {} results (top_k: {})",
            index_id,
            scored.len(),
            top_k
        );

        let results: Vec<Value> = scored
            .into_iter()
            .map(|(stored, score)| {
                json!({
                    "id": stored.chunk.id,
                    "text": stored.chunk.text,
                    "meta": stored.chunk.meta,
                    "score": score,
                })
            })
            .collect();

        Ok(search_envelope(index_id, query, Value::Array(results), top_k))
    }
}
