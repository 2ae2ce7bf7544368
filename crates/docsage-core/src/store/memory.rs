//! In-memory [`VectorStore`] for tests and throwaway runs.
//!
//! Collections are maps from chunk id to `(record, vector)` behind a
//! `RwLock`. Queries are brute-force cosine similarity.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::embedding::cosine_similarity;
use crate::models::ChunkRecord;

use super::{check_query_dims, check_upsert_lengths, rank, ScoredChunk, VectorStore};

type Collection = BTreeMap<String, (ChunkRecord, Vec<f32>)>;

#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn reset(&self, collection: &str) -> Result<()> {
        self.collections.write().map_err(poisoned)?.remove(collection);
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        records: &[ChunkRecord],
        vectors: &[Vec<f32>],
    ) -> Result<()> {
        check_upsert_lengths(records, vectors)?;
        let mut collections = self.collections.write().map_err(poisoned)?;
        let stored = collections.entry(collection.to_string()).or_default();
        for (record, vector) in records.iter().zip(vectors) {
            stored.insert(record.id.clone(), (record.clone(), vector.clone()));
        }
        Ok(())
    }

    async fn replace(
        &self,
        collection: &str,
        records: &[ChunkRecord],
        vectors: &[Vec<f32>],
    ) -> Result<()> {
        check_upsert_lengths(records, vectors)?;
        let fresh: Collection = records
            .iter()
            .zip(vectors)
            .map(|(record, vector)| (record.id.clone(), (record.clone(), vector.clone())))
            .collect();
        self.collections
            .write()
            .map_err(poisoned)?
            .insert(collection.to_string(), fresh);
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections.get(collection).map_or(0, |c| c.len()))
    }

    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let collections = self.collections.read().map_err(poisoned)?;
        let Some(stored) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut candidates = Vec::with_capacity(stored.len());
        for (record, stored_vec) in stored.values() {
            check_query_dims(&record.id, stored_vec.len(), vector.len())?;
            candidates.push(ScoredChunk {
                id: record.id.clone(),
                text: record.text.clone(),
                metadata: record.metadata.clone(),
                similarity: cosine_similarity(vector, stored_vec),
            });
        }

        Ok(rank(candidates, top_k))
    }
}
