//! SQLite-backed [`VectorStore`].
//!
//! One `chunks` table holds every collection; rows are keyed by
//! `(collection, id)` and carry the chunk text, its metadata columns, and
//! the embedding as a little-endian `f32` blob. Queries load the
//! collection's vectors and rank them by cosine similarity in process.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::path::Path;

use docsage_core::embedding::{blob_to_vec, cosine_similarity, vec_to_blob};
use docsage_core::models::{ChunkMetadata, ChunkRecord};
use docsage_core::store::{
    check_query_dims, check_upsert_lengths, rank, ScoredChunk, VectorStore,
};

use crate::db;
use crate::migrate;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open the index at `path`, creating the file and schema if missing.
    pub async fn open(path: &Path) -> Result<Self> {
        let pool = db::connect(path)
            .await
            .with_context(|| format!("Failed to open index at {}", path.display()))?;
        migrate::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn reset(&self, collection: &str) -> Result<()> {
        sqlx::query("DELETE FROM chunks WHERE collection = ?")
            .bind(collection)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        records: &[ChunkRecord],
        vectors: &[Vec<f32>],
    ) -> Result<()> {
        check_upsert_lengths(records, vectors)?;

        let mut tx = self.pool.begin().await?;
        write_chunks(&mut tx, collection, records, vectors).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn replace(
        &self,
        collection: &str,
        records: &[ChunkRecord],
        vectors: &[Vec<f32>],
    ) -> Result<()> {
        check_upsert_lengths(records, vectors)?;

        // Dropping the transaction on error rolls back the delete too.
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM chunks WHERE collection = ?")
            .bind(collection)
            .execute(&mut *tx)
            .await?;
        write_chunks(&mut tx, collection, records, vectors).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks WHERE collection = ?")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let rows = sqlx::query(
            r#"
            SELECT id, source, filename, chunk_index, section, text, embedding
            FROM chunks
            WHERE collection = ?
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        let mut candidates = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row.try_get("id")?;
            let stored = blob_to_vec(&row.try_get::<Vec<u8>, _>("embedding")?);
            check_query_dims(&id, stored.len(), vector.len())?;
            let chunk_index: i64 = row.try_get("chunk_index")?;
            candidates.push(ScoredChunk {
                id,
                text: row.try_get("text")?,
                metadata: ChunkMetadata {
                    source: row.try_get("source")?,
                    filename: row.try_get("filename")?,
                    chunk_index: chunk_index as usize,
                    section: row.try_get("section")?,
                },
                similarity: cosine_similarity(vector, &stored),
            });
        }

        Ok(rank(candidates, top_k))
    }
}

async fn write_chunks(
    tx: &mut Transaction<'_, Sqlite>,
    collection: &str,
    records: &[ChunkRecord],
    vectors: &[Vec<f32>],
) -> Result<()> {
    for (record, vector) in records.iter().zip(vectors) {
        sqlx::query(
            r#"
            INSERT INTO chunks (collection, id, source, filename, chunk_index, section, text, hash, dims, embedding)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(collection, id) DO UPDATE SET
                source = excluded.source,
                filename = excluded.filename,
                chunk_index = excluded.chunk_index,
                section = excluded.section,
                text = excluded.text,
                hash = excluded.hash,
                dims = excluded.dims,
                embedding = excluded.embedding
            "#,
        )
        .bind(collection)
        .bind(&record.id)
        .bind(&record.metadata.source)
        .bind(&record.metadata.filename)
        .bind(record.metadata.chunk_index as i64)
        .bind(&record.metadata.section)
        .bind(&record.text)
        .bind(&record.hash)
        .bind(vector.len() as i64)
        .bind(vec_to_blob(vector))
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
