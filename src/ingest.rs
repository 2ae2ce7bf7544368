//! Ingestion pipeline orchestration.
//!
//! Coordinates the full flow: corpus load → chunking → embedding → storage.
//! Every chunk is embedded before the collection is touched, and the
//! collection is then swapped in one atomic store call, so a loader,
//! provider, or storage failure leaves the previous index in place.

use anyhow::{Context, Result};
use tracing::{info, warn};

use docsage_core::batch::{build_index_batch, IndexBatch};
use docsage_core::embedding::{embed_batched, Embedder};
use docsage_core::store::VectorStore;

use crate::config::Config;
use crate::corpus;
use crate::embedding;
use crate::sqlite_store::SqliteStore;

/// What one ingestion run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub chunks_written: usize,
    pub collection_count: usize,
}

pub async fn run_ingest(config: &Config, dry_run: bool) -> Result<()> {
    let documents = corpus::load_documents(&config.corpus)?;
    info!(
        root = %config.corpus.root.display(),
        documents = documents.len(),
        "loaded corpus"
    );

    let batch = build_index_batch(&documents, config.chunking.max_chars);
    report_batch(&batch, config.chunking.max_chars);

    if dry_run {
        println!("ingest (dry-run)");
        println!("  documents: {}", batch.documents.len());
        println!("  chunks: {}", batch.len());
        println!("  oversized chunks: {}", batch.oversized.len());
        return Ok(());
    }

    let embedder = embedding::create_provider(&config.embedding)?;
    let store = SqliteStore::open(&config.index.path).await?;

    let summary = index_batch(
        &store,
        embedder.as_ref(),
        &config.index.collection,
        config.index.batch_size,
        &batch,
    )
    .await;
    store.close().await;
    let summary = summary?;

    println!("ingest {}", config.index.collection);
    println!("  documents: {}", batch.documents.len());
    println!("  chunks written: {}", summary.chunks_written);
    println!("  collection size: {}", summary.collection_count);
    println!("  model: {}", embedder.model_name());
    println!("ok");

    Ok(())
}

/// Replace `collection` with the chunks of `batch`.
///
/// Embeds everything first (`batch_size` texts per call), then swaps the
/// collection's contents with [`VectorStore::replace`].
pub async fn index_batch(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    collection: &str,
    batch_size: usize,
    batch: &IndexBatch,
) -> Result<IngestSummary> {
    let texts: Vec<String> = batch.records.iter().map(|r| r.text.clone()).collect();
    let vectors = embed_batched(embedder, &texts, batch_size)
        .await
        .with_context(|| format!("Failed to embed {} chunks", texts.len()))?;

    store
        .replace(collection, &batch.records, &vectors)
        .await
        .with_context(|| format!("Failed to store {} chunks", batch.len()))?;

    let collection_count = store.count(collection).await?;
    info!(collection, chunks = batch.len(), collection_count, "indexed chunks");

    Ok(IngestSummary {
        chunks_written: batch.len(),
        collection_count,
    })
}

fn report_batch(batch: &IndexBatch, max_chars: usize) {
    for doc in &batch.documents {
        info!(path = %doc.relative_path, chunks = doc.chunks, "chunked document");
    }
    for id in &batch.oversized {
        warn!(chunk = %id, max_chars, "chunk exceeds max_chars (single paragraph kept whole)");
    }
}
