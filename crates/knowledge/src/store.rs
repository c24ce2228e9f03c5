//! SQLite-backed vector store.
//!
//! A store is a directory holding `index.sqlite`. Embeddings are stored as
//! little-endian `f32` blobs and ranked by cosine similarity at query time.

use crate::types::{RetrievedChunk, SourceRecord, StoreStats, TextChunk};
use crate::vector_index::VectorIndex;
use chrono::{DateTime, Utc};
use guide_core::{AppError, AppResult};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};

/// Database file name inside the store directory.
pub const DB_FILE_NAME: &str = "index.sqlite";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS collection (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    embedding_model TEXT NOT NULL,
    dimensions INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sources (
    id TEXT PRIMARY KEY,
    path TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    page_count INTEGER NOT NULL,
    chunk_count INTEGER NOT NULL,
    content_hash TEXT NOT NULL,
    ingested_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    source_id TEXT NOT NULL,
    page INTEGER NOT NULL,
    position INTEGER NOT NULL,
    byte_offset INTEGER NOT NULL,
    char_count INTEGER NOT NULL,
    hash TEXT NOT NULL,
    text TEXT NOT NULL,
    embedding BLOB NOT NULL,
    FOREIGN KEY (source_id) REFERENCES sources(id)
);

CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source_id);
"#;

/// Persistent vector store in a single SQLite file.
pub struct SqliteIndex {
    conn: Connection,
    dir: PathBuf,
    model: String,
    dimensions: usize,
    /// Clear the store inside the next `insert_document` transaction
    clear_on_insert: bool,
}

impl std::fmt::Debug for SqliteIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteIndex")
            .field("dir", &self.dir)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .field("clear_on_insert", &self.clear_on_insert)
            .finish()
    }
}

impl SqliteIndex {
    /// Open a store for writing, creating the directory and schema if needed.
    ///
    /// An existing store must have been built with the same embedding
    /// dimensions unless `reset` is set. A reset is deferred to the next
    /// [`VectorIndex::insert_document`] and runs in the same transaction, so
    /// a failed insert leaves the previous contents in place.
    pub fn create(store_dir: &Path, model: &str, dimensions: usize, reset: bool) -> AppResult<Self> {
        if !reset {
            Self::check_dimensions(store_dir, model, dimensions)?;
        }

        std::fs::create_dir_all(store_dir).map_err(|e| {
            AppError::Store(format!("Failed to create store directory {:?}: {}", store_dir, e))
        })?;

        let db_path = store_dir.join(DB_FILE_NAME);
        let conn = Connection::open(&db_path)
            .map_err(|e| AppError::Store(format!("Failed to open SQLite store: {}", e)))?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::Store(format!("Failed to create tables: {}", e)))?;

        let index = Self {
            conn,
            dir: store_dir.to_path_buf(),
            model: model.to_string(),
            dimensions,
            clear_on_insert: reset,
        };

        match index.read_collection()? {
            Some((stored_model, _)) if reset => {
                tracing::debug!("Store built with '{}' will be cleared on insert", stored_model);
            }
            Some((stored_model, _)) if stored_model != model => {
                tracing::warn!(
                    "Store was built with '{}', appending embeddings from '{}'",
                    stored_model,
                    model
                );
            }
            Some(_) => {}
            None => write_collection(&index.conn, model, dimensions)?,
        }

        tracing::debug!("Opened store for writing at {:?}", db_path);
        Ok(index)
    }

    /// Check that an existing store can take embeddings of `dimensions`.
    ///
    /// Reads only; a directory without a database passes. Ingestion calls
    /// this before embedding anything.
    pub fn check_dimensions(store_dir: &Path, model: &str, dimensions: usize) -> AppResult<()> {
        if !store_dir.join(DB_FILE_NAME).is_file() {
            return Ok(());
        }

        match Self::connect_read_only(store_dir)?.read_collection()? {
            Some((stored_model, stored_dims)) if stored_dims != dimensions => {
                Err(AppError::Store(format!(
                    "Store at {:?} holds {}-dimensional embeddings from '{}', but '{}' produces {}. Re-run ingestion with --reset to rebuild it.",
                    store_dir, stored_dims, stored_model, model, dimensions
                )))
            }
            _ => Ok(()),
        }
    }

    /// Open an existing store for querying.
    ///
    /// Fails if the directory or database is missing, holds no chunks, or
    /// was built with embeddings of a different dimension.
    pub fn open(store_dir: &Path, expected_dimensions: usize) -> AppResult<Self> {
        let index = Self::inspect(store_dir)?;

        if index.dimensions != expected_dimensions {
            return Err(AppError::Store(format!(
                "Store at {:?} holds {}-dimensional embeddings from '{}', configured embeddings have {}",
                store_dir, index.dimensions, index.model, expected_dimensions
            )));
        }

        if index.count("chunks")? == 0 {
            return Err(AppError::Store(format!(
                "Vector store at {:?} is empty. Run 'guide ingest' first.",
                store_dir
            )));
        }

        tracing::debug!("Opened store at {:?} ({} dims)", index.db_path(), index.dimensions);
        Ok(index)
    }

    /// Open an existing store read-only, without requiring any chunks.
    pub fn inspect(store_dir: &Path) -> AppResult<Self> {
        let db_path = store_dir.join(DB_FILE_NAME);

        if !store_dir.is_dir() {
            return Err(AppError::Store(format!(
                "Vector store not found at {:?}. Run 'guide ingest' first.",
                store_dir
            )));
        }
        if !db_path.is_file() {
            return Err(AppError::Store(format!(
                "Vector store at {:?} has no {}. Run 'guide ingest' first.",
                store_dir, DB_FILE_NAME
            )));
        }

        let mut index = Self::connect_read_only(store_dir)?;

        let (model, dimensions) = index.read_collection()?.ok_or_else(|| {
            AppError::Store(format!(
                "Vector store at {:?} is not initialized. Run 'guide ingest' first.",
                store_dir
            ))
        })?;

        index.model = model;
        index.dimensions = dimensions;
        Ok(index)
    }

    fn connect_read_only(store_dir: &Path) -> AppResult<Self> {
        let conn = Connection::open_with_flags(
            store_dir.join(DB_FILE_NAME),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| AppError::Store(format!("Failed to open SQLite store: {}", e)))?;

        Ok(Self {
            conn,
            dir: store_dir.to_path_buf(),
            model: String::new(),
            dimensions: 0,
            clear_on_insert: false,
        })
    }

    /// Embedding model recorded for this store.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.join(DB_FILE_NAME)
    }

    fn read_collection(&self) -> AppResult<Option<(String, usize)>> {
        self.conn
            .query_row(
                "SELECT embedding_model, dimensions FROM collection WHERE id = 1",
                [],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize)),
            )
            .optional()
            .map_err(|e| AppError::Store(format!("Failed to read store metadata: {}", e)))
    }

    fn count(&self, table: &str) -> AppResult<u32> {
        self.conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get::<_, i64>(0).map(|v| v as u32)
            })
            .map_err(|e| AppError::Store(format!("Failed to count {}: {}", table, e)))
    }
}

impl VectorIndex for SqliteIndex {
    fn insert_document(
        &mut self,
        source: &SourceRecord,
        chunks: &[TextChunk],
        embeddings: &[Vec<f32>],
    ) -> AppResult<()> {
        if chunks.len() != embeddings.len() {
            return Err(AppError::Store(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimensions) {
            return Err(AppError::Store(format!(
                "Embedding has {} dimensions, store expects {}",
                bad.len(),
                self.dimensions
            )));
        }

        let tx = self
            .conn
            .transaction()
            .map_err(|e| AppError::Store(format!("Failed to begin transaction: {}", e)))?;

        if self.clear_on_insert {
            clear_tables(&tx)?;
            write_collection(&tx, &self.model, self.dimensions)?;
        }

        tx.execute(
            "INSERT INTO sources (id, path, size_bytes, page_count, chunk_count, content_hash, ingested_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                source.id,
                source.path,
                source.size_bytes as i64,
                source.page_count as i64,
                source.chunk_count as i64,
                source.content_hash,
                source.ingested_at.to_rfc3339(),
            ],
        )
        .map_err(|e| AppError::Store(format!("Failed to insert source: {}", e)))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO chunks (id, source_id, page, position, byte_offset, char_count, hash, text, embedding)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                )
                .map_err(|e| AppError::Store(format!("Failed to prepare insert: {}", e)))?;

            for (chunk, embedding) in chunks.iter().zip(embeddings) {
                stmt.execute(params![
                    chunk.id,
                    source.id,
                    chunk.page as i64,
                    chunk.position as i64,
                    chunk.byte_offset as i64,
                    chunk.char_count as i64,
                    chunk.hash,
                    chunk.text,
                    embedding_to_bytes(embedding),
                ])
                .map_err(|e| AppError::Store(format!("Failed to insert chunk: {}", e)))?;
            }
        }

        tx.commit()
            .map_err(|e| AppError::Store(format!("Failed to commit: {}", e)))?;

        if self.clear_on_insert {
            tracing::info!("Replaced previous contents of {:?}", self.dir);
            self.clear_on_insert = false;
        }

        tracing::debug!("Stored source {} with {} chunks", source.id, chunks.len());
        Ok(())
    }

    fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<RetrievedChunk>> {
        if query_embedding.len() != self.dimensions {
            return Err(AppError::Store(format!(
                "Query embedding has {} dimensions, store expects {}",
                query_embedding.len(),
                self.dimensions
            )));
        }

        let mut stmt = self
            .conn
            .prepare(
                "SELECT c.id, s.path, c.page, c.position, c.text, c.embedding
                 FROM chunks c JOIN sources s ON s.id = c.source_id",
            )
            .map_err(|e| AppError::Store(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    RetrievedChunk {
                        chunk_id: row.get(0)?,
                        source_path: row.get(1)?,
                        page: row.get::<_, i64>(2)? as u32,
                        position: row.get::<_, i64>(3)? as u32,
                        text: row.get(4)?,
                        score: 0.0,
                    },
                    row.get::<_, Vec<u8>>(5)?,
                ))
            })
            .map_err(|e| AppError::Store(format!("Failed to query chunks: {}", e)))?;

        let mut results = Vec::new();
        for row in rows {
            let (mut chunk, bytes) =
                row.map_err(|e| AppError::Store(format!("Failed to read chunk: {}", e)))?;

            match bytes_to_embedding(&bytes) {
                Ok(embedding) => {
                    chunk.score = cosine_similarity(query_embedding, &embedding);
                    results.push(chunk);
                }
                Err(e) => tracing::warn!("Skipping chunk {}: {}", chunk.chunk_id, e),
            }
        }

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.position.cmp(&b.position))
        });
        results.truncate(top_k);

        tracing::debug!(
            "Retrieved {} chunks (requested top-{})",
            results.len(),
            top_k
        );

        Ok(results)
    }

    fn stats(&self) -> AppResult<StoreStats> {
        let sources_count = self.count("sources")?;
        let chunks_count = self.count("chunks")?;

        let (embedding_model, dimensions) = self
            .read_collection()?
            .unwrap_or_else(|| (self.model.clone(), self.dimensions));

        let last_ingest: Option<String> = self
            .conn
            .query_row("SELECT MAX(ingested_at) FROM sources", [], |row| row.get(0))
            .map_err(|e| AppError::Store(format!("Failed to read ingestion time: {}", e)))?;

        let last_ingest_at = last_ingest
            .and_then(|ts| DateTime::parse_from_rfc3339(&ts).ok())
            .map(|ts| ts.with_timezone(&Utc));

        let db_size_bytes = std::fs::metadata(self.db_path())
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(StoreStats {
            store_path: self.dir.clone(),
            sources_count,
            chunks_count,
            embedding_model,
            dimensions,
            db_size_bytes,
            last_ingest_at,
        })
    }

    fn reset(&mut self) -> AppResult<()> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| AppError::Store(format!("Failed to begin transaction: {}", e)))?;

        clear_tables(&tx)?;
        write_collection(&tx, &self.model, self.dimensions)?;

        tx.commit()
            .map_err(|e| AppError::Store(format!("Failed to commit: {}", e)))?;

        self.clear_on_insert = false;
        tracing::info!("Reset vector store at {:?}", self.dir);
        Ok(())
    }
}

/// Bind the store to `model` and `dimensions`, replacing any previous binding.
fn write_collection(conn: &Connection, model: &str, dimensions: usize) -> AppResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO collection (id, embedding_model, dimensions, created_at)
         VALUES (1, ?1, ?2, ?3)",
        params![model, dimensions as i64, Utc::now().to_rfc3339()],
    )
    .map_err(|e| AppError::Store(format!("Failed to write store metadata: {}", e)))?;
    Ok(())
}

fn clear_tables(conn: &Connection) -> AppResult<()> {
    conn.execute_batch("DELETE FROM chunks; DELETE FROM sources; DELETE FROM collection;")
        .map_err(|e| AppError::Store(format!("Failed to clear store: {}", e)))
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Store(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Calculate cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
