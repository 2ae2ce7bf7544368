//! Retrieval over an ingested collection.
//!
//! Embeds the query, asks the [`VectorStore`] for the closest chunks, and
//! shapes the hits for callers: plain results (`doc_id`, `score`, `text`),
//! a diagnostics view with section and chunk index, and the ordered list
//! of distinct source documents recovered from the `::chunk<N>` ids.

use serde::Serialize;
use thiserror::Error;

use crate::embedding::{embed_one, Embedder};
use crate::models::{source_of, ChunkMetadata};
use crate::store::VectorStore;

/// Default number of chunks returned per query.
pub const DEFAULT_TOP_K: usize = 5;
/// Largest accepted `top_k`.
pub const MAX_TOP_K: usize = 20;

const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum RetrieveError {
    /// The collection holds no chunks. Transient: ingestion has not run yet.
    #[error("No documents ingested yet in collection '{0}'. Run: docsage ingest")]
    NotIngested(String),
    #[error("top_k must be between 1 and 20, got {0}")]
    InvalidTopK(usize),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// One retrieved chunk.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedChunk {
    /// Chunk identifier, `relative_path::chunk<N>`.
    pub doc_id: String,
    /// Cosine similarity rounded to 4 decimals.
    pub score: f64,
    pub text: String,
    #[serde(skip)]
    pub metadata: ChunkMetadata,
}

impl RetrievedChunk {
    /// The originating document's relative path.
    pub fn source(&self) -> &str {
        source_of(&self.doc_id)
    }
}

/// Diagnostics view of a retrieved chunk.
#[derive(Debug, Clone, Serialize)]
pub struct DebugChunk {
    pub doc_id: String,
    pub section: String,
    pub chunk_index: usize,
    pub score: f64,
    /// First 200 characters of the chunk text.
    pub preview: String,
}

/// Return the `top_k` chunks of `collection` most similar to `query`.
///
/// `top_k` is clamped to the collection size.
pub async fn retrieve(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    collection: &str,
    query: &str,
    top_k: usize,
) -> Result<Vec<RetrievedChunk>, RetrieveError> {
    if !(1..=MAX_TOP_K).contains(&top_k) {
        return Err(RetrieveError::InvalidTopK(top_k));
    }

    let available = store.count(collection).await?;
    if available == 0 {
        return Err(RetrieveError::NotIngested(collection.to_string()));
    }

    let query_vec = embed_one(embedder, query).await?;
    let hits = store
        .query(collection, &query_vec, top_k.min(available))
        .await?;

    tracing::debug!(collection, top_k, hits = hits.len(), "retrieved chunks");

    Ok(hits
        .into_iter()
        .map(|hit| RetrievedChunk {
            doc_id: hit.id,
            score: round_score(hit.similarity),
            text: hit.text,
            metadata: hit.metadata,
        })
        .collect())
}

/// Distinct source documents in rank order.
pub fn unique_sources(results: &[RetrievedChunk]) -> Vec<&str> {
    let mut sources: Vec<&str> = Vec::new();
    for result in results {
        let source = result.source();
        if !sources.contains(&source) {
            sources.push(source);
        }
    }
    sources
}

/// Diagnostics view: section, chunk index, score, and a short preview.
pub fn debug_view(results: &[RetrievedChunk]) -> Vec<DebugChunk> {
    results
        .iter()
        .map(|r| DebugChunk {
            doc_id: r.doc_id.clone(),
            section: r.metadata.section.clone(),
            chunk_index: r.metadata.chunk_index,
            score: r.score,
            preview: r.text.chars().take(PREVIEW_CHARS).collect(),
        })
        .collect()
}

fn round_score(similarity: f32) -> f64 {
    (f64::from(similarity) * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::batch::build_index_batch;
    use crate::models::Document;
    use crate::store::memory::InMemoryStore;
    use anyhow::Result;
    use async_trait::async_trait;

    const VOCAB: [&str; 4] = ["rust", "python", "deploy", "test"];

    /// Bag-of-words over a tiny fixed vocabulary.
    pub(crate) struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        fn model_name(&self) -> &str {
            "keyword"
        }
        fn dims(&self) -> usize {
            VOCAB.len()
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let lower = t.to_lowercase();
                    VOCAB
                        .iter()
                        .map(|w| lower.matches(w).count() as f32)
                        .collect()
                })
                .collect())
        }
    }

    pub(crate) async fn seeded_store(collection: &str) -> InMemoryStore {
        let docs = vec![
            Document::new(
                "rust.md",
                "# Rust\n\nRust rust rust.\n\n## Testing\n\nRust test test test.",
            ),
            Document::new("python.md", "# Python\n\nPython python."),
            Document::new("ops/deploy.md", "# Deploy\n\nDeploy deploy deploy."),
        ];
        let batch = build_index_batch(&docs, 1500);
        let texts: Vec<String> = batch.texts().iter().map(|t| t.to_string()).collect();
        let vectors = KeywordEmbedder.embed(&texts).await.unwrap();
        let store = InMemoryStore::new();
        store
            .upsert(collection, &batch.records, &vectors)
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_retrieve_ranks_by_similarity() {
        let store = seeded_store("docs").await;
        let results = retrieve(&store, &KeywordEmbedder, "docs", "how to deploy", 2)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].doc_id, "ops/deploy.md::chunk0");
        assert_eq!(results[0].score, 1.0);
        assert_eq!(results[0].source(), "ops/deploy.md");
    }

    #[tokio::test]
    async fn test_retrieve_clamps_top_k_to_collection_size() {
        let store = seeded_store("docs").await;
        let results = retrieve(&store, &KeywordEmbedder, "docs", "rust", 20)
            .await
            .unwrap();
        assert_eq!(results.len(), 4);
    }

    #[tokio::test]
    async fn test_retrieve_empty_collection_is_not_ingested() {
        let store = InMemoryStore::new();
        let err = retrieve(&store, &KeywordEmbedder, "docs", "rust", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, RetrieveError::NotIngested(ref c) if c == "docs"));
    }

    #[tokio::test]
    async fn test_retrieve_rejects_bad_top_k() {
        let store = seeded_store("docs").await;
        for k in [0, 21] {
            let err = retrieve(&store, &KeywordEmbedder, "docs", "rust", k)
                .await
                .unwrap_err();
            assert!(matches!(err, RetrieveError::InvalidTopK(n) if n == k));
        }
    }

    /// A differently sized model, as after switching `embedding.model`.
    struct WiderEmbedder;

    #[async_trait]
    impl Embedder for WiderEmbedder {
        fn model_name(&self) -> &str {
            "wider"
        }
        fn dims(&self) -> usize {
            VOCAB.len() + 1
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0; VOCAB.len() + 1]).collect())
        }
    }

    #[tokio::test]
    async fn test_retrieve_with_other_model_dims_fails() {
        let store = seeded_store("docs").await;
        let err = retrieve(&store, &WiderEmbedder, "docs", "rust", 3)
            .await
            .unwrap_err();
        assert!(matches!(err, RetrieveError::Backend(_)));
        assert!(err.to_string().contains("dimension mismatch"));
    }

    #[tokio::test]
    async fn test_unique_sources_and_debug_view() {
        let store = seeded_store("docs").await;
        let results = retrieve(&store, &KeywordEmbedder, "docs", "rust test", 3)
            .await
            .unwrap();

        assert_eq!(unique_sources(&results)[0], "rust.md");
        let sources = unique_sources(&results);
        let mut deduped = sources.clone();
        deduped.dedup();
        assert_eq!(sources, deduped);

        let debug = debug_view(&results);
        assert_eq!(debug[0].doc_id, "rust.md::chunk1");
        assert_eq!(debug[0].section, "Testing");
        assert_eq!(debug[0].chunk_index, 1);
    }

    #[test]
    fn test_preview_truncates_to_200_chars() {
        let result = RetrievedChunk {
            doc_id: "a.md::chunk0".to_string(),
            score: 0.5,
            text: "ü".repeat(300),
            metadata: ChunkMetadata {
                source: "a.md".to_string(),
                filename: "a.md".to_string(),
                chunk_index: 0,
                section: "(intro)".to_string(),
            },
        };
        assert_eq!(debug_view(&[result])[0].preview.chars().count(), 200);
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.123456), 0.1235);
        assert_eq!(round_score(1.0), 1.0);
    }
}
