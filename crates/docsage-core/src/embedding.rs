//! Embedding provider trait and vector utilities.
//!
//! [`Embedder`] is the seam between the pipeline and whichever service
//! turns text into vectors. Concrete providers (OpenAI, disabled) live in
//! the `docsage` application crate; tests use small deterministic fakes.

use anyhow::{bail, Result};
use async_trait::async_trait;

/// Turns text into embedding vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier, e.g. `"text-embedding-3-small"`.
    fn model_name(&self) -> &str;

    /// Vector dimensionality, e.g. `1536`. `0` when unknown.
    fn dims(&self) -> usize;

    /// Embed a batch of texts. Output order matches input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Embed a single query string.
pub async fn embed_one(embedder: &dyn Embedder, text: &str) -> Result<Vec<f32>> {
    let vector = embedder
        .embed(&[text.to_string()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Empty embedding response"))?;
    check_dims(embedder, &vector)?;
    Ok(vector)
}

/// Embed texts in slices of at most `batch_size`, preserving order.
///
/// Fails if any batch fails, returns the wrong number of vectors, or
/// returns a vector whose length differs from [`Embedder::dims`].
pub async fn embed_batched(
    embedder: &dyn Embedder,
    texts: &[String],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>> {
    let batch_size = batch_size.max(1);
    let mut vectors = Vec::with_capacity(texts.len());

    for (n, batch) in texts.chunks(batch_size).enumerate() {
        let embedded = embedder.embed(batch).await?;
        if embedded.len() != batch.len() {
            bail!(
                "Embedding batch {} returned {} vectors for {} texts",
                n,
                embedded.len(),
                batch.len()
            );
        }
        for vector in &embedded {
            check_dims(embedder, vector)?;
        }
        vectors.extend(embedded);
    }

    Ok(vectors)
}

/// Reject a vector whose length differs from the embedder's declared
/// dimensionality. Embedders reporting `0` dims are not checked.
pub fn check_dims(embedder: &dyn Embedder, vector: &[f32]) -> Result<()> {
    let expected = embedder.dims();
    if expected != 0 && vector.len() != expected {
        bail!(
            "Embedding model '{}' returned a {}-dim vector, expected {} (check embedding.dims)",
            embedder.model_name(),
            vector.len(),
            expected
        );
    }
    Ok(())
}

/// Encode a vector as little-endian `f32` bytes (4 bytes per element).
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Decode bytes written by [`vec_to_blob`]. Trailing partial elements are dropped.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Cosine similarity in `[-1.0, 1.0]`.
///
/// Returns `0.0` for empty, zero-magnitude, or mismatched-length vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }
    dot / denom
}
