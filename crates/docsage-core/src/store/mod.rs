//! Vector store abstraction.
//!
//! The [`VectorStore`] trait is the only thing ingestion and retrieval know
//! about storage: a namespace of chunks keyed by id, each with an embedding,
//! queried by cosine similarity. Backends: [`memory::InMemoryStore`] here,
//! and a SQLite store in the application crate.
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`reset`](VectorStore::reset) | Drop every chunk in a collection |
//! | [`upsert`](VectorStore::upsert) | Insert or replace chunks by id |
//! | [`replace`](VectorStore::replace) | Atomically swap a collection's contents |
//! | [`count`](VectorStore::count) | Number of chunks in a collection |
//! | [`query`](VectorStore::query) | Top-k chunks by cosine similarity |

pub mod memory;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::models::{ChunkMetadata, ChunkRecord};

/// A stored chunk with its similarity to a query vector.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
    /// Cosine similarity to the query, in `[-1.0, 1.0]`.
    pub similarity: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Remove every chunk in `collection`. Missing collections are not an error.
    async fn reset(&self, collection: &str) -> Result<()>;

    /// Insert or replace chunks by id. `vectors[i]` is the embedding of `records[i]`.
    async fn upsert(
        &self,
        collection: &str,
        records: &[ChunkRecord],
        vectors: &[Vec<f32>],
    ) -> Result<()>;

    /// Replace everything in `collection` with `records` as one atomic step.
    ///
    /// On error the previous contents stay in place; readers never see a
    /// partially written collection.
    async fn replace(
        &self,
        collection: &str,
        records: &[ChunkRecord],
        vectors: &[Vec<f32>],
    ) -> Result<()>;

    /// Number of chunks currently stored in `collection`.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// The `top_k` chunks most similar to `vector`, best first.
    ///
    /// Fails if a stored vector's length differs from `vector`'s.
    async fn query(&self, collection: &str, vector: &[f32], top_k: usize)
        -> Result<Vec<ScoredChunk>>;
}

/// Fail unless every record has exactly one vector.
pub fn check_upsert_lengths(records: &[ChunkRecord], vectors: &[Vec<f32>]) -> Result<()> {
    if records.len() != vectors.len() {
        bail!(
            "upsert needs one vector per chunk: {} chunks, {} vectors",
            records.len(),
            vectors.len()
        );
    }
    Ok(())
}

/// Fail if a stored vector cannot be compared with the query vector.
pub fn check_query_dims(chunk_id: &str, stored: usize, query: usize) -> Result<()> {
    if stored != query {
        bail!(
            "Embedding dimension mismatch: query vector has {} dims but chunk '{}' was stored with {}. Re-run ingestion after changing the embedding model.",
            query,
            chunk_id,
            stored
        );
    }
    Ok(())
}

/// Sort by descending similarity (ties by ascending id) and keep `top_k`.
pub fn rank(mut candidates: Vec<ScoredChunk>, top_k: usize) -> Vec<ScoredChunk> {
    candidates.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    candidates.truncate(top_k);
    candidates
}
