//! Corpus driver: turns documents into an index batch.
//!
//! Documents are processed in relative-path order. Each document is
//! chunked with [`chunk_markdown`], chunks are numbered `0..n` within their
//! document, and each chunk gets the identifier `relative_path::chunk<i>`
//! plus a [`ChunkMetadata`] record. The batch exposes the three parallel
//! sequences (ids, texts, metadatas) that a bulk "upsert by id" expects.

use sha2::{Digest, Sha256};

use crate::chunk::{char_len, chunk_markdown};
use crate::models::{chunk_id, ChunkMetadata, ChunkRecord, Document};

/// Per-document chunk count, in processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunks {
    pub relative_path: String,
    pub chunks: usize,
}

/// Everything produced by one chunking pass over a corpus.
#[derive(Debug, Clone, Default)]
pub struct IndexBatch {
    /// All chunks, grouped by document in relative-path order.
    pub records: Vec<ChunkRecord>,
    /// Chunk counts per document (documents with zero chunks included).
    pub documents: Vec<DocumentChunks>,
    /// Ids of chunks whose text exceeds `max_chars` (whole oversized paragraphs).
    pub oversized: Vec<String>,
}

impl IndexBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn metadatas(&self) -> Vec<&ChunkMetadata> {
        self.records.iter().map(|r| &r.metadata).collect()
    }
}

/// Chunk every document and number the results.
///
/// Documents are sorted by relative path first, so the output does not
/// depend on input order.
pub fn build_index_batch(documents: &[Document], max_chars: usize) -> IndexBatch {
    let mut ordered: Vec<&Document> = documents.iter().collect();
    ordered.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    let mut batch = IndexBatch::default();

    for doc in ordered {
        let chunks = chunk_markdown(&doc.content, max_chars);
        batch.documents.push(DocumentChunks {
            relative_path: doc.relative_path.clone(),
            chunks: chunks.len(),
        });

        for (i, chunk) in chunks.into_iter().enumerate() {
            let id = chunk_id(&doc.relative_path, i);
            if char_len(&chunk.text) > max_chars {
                batch.oversized.push(id.clone());
            }
            batch.records.push(ChunkRecord {
                id,
                hash: text_hash(&chunk.text),
                metadata: ChunkMetadata {
                    source: doc.relative_path.clone(),
                    filename: doc.filename.clone(),
                    chunk_index: i,
                    section: chunk.section,
                },
                text: chunk.text,
            });
        }
    }

    batch
}

/// SHA-256 hex digest of a chunk's text.
pub fn text_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn corpus() -> Vec<Document> {
        vec![
            Document::new(
                "setup/install.md",
                "# Install\n\nGet started.\n\n## Linux\n\napt install\n\n## macOS\n\nbrew install",
            ),
            Document::new("empty.md", ""),
            Document::new("about.md", "Just an about page."),
        ]
    }

    #[test]
    fn test_documents_processed_in_path_order() {
        let batch = build_index_batch(&corpus(), 1500);
        let paths: Vec<&str> = batch
            .documents
            .iter()
            .map(|d| d.relative_path.as_str())
            .collect();
        assert_eq!(paths, vec!["about.md", "empty.md", "setup/install.md"]);
        assert_eq!(
            batch.documents.iter().map(|d| d.chunks).collect::<Vec<_>>(),
            vec![1, 0, 3]
        );
    }

    #[test]
    fn test_ids_and_metadata() {
        let batch = build_index_batch(&corpus(), 1500);
        assert_eq!(
            batch.ids(),
            vec![
                "about.md::chunk0",
                "setup/install.md::chunk0",
                "setup/install.md::chunk1",
                "setup/install.md::chunk2",
            ]
        );

        let meta = batch.metadatas()[3];
        assert_eq!(meta.source, "setup/install.md");
        assert_eq!(meta.filename, "install.md");
        assert_eq!(meta.chunk_index, 2);
        assert_eq!(meta.section, "macOS");
        assert_eq!(batch.texts()[3], "# Install\n\n## macOS\n\nbrew install");
    }

    #[test]
    fn test_numbering_spans_sub_chunks() {
        let big = (0..6)
            .map(|i| format!("{i} {}", "y".repeat(60)))
            .collect::<Vec<_>>()
            .join("\n\n");
        let doc = Document::new("big.md", format!("## Big\n\n{big}\n\n## After\n\nDone."));
        let batch = build_index_batch(&[doc], 150);

        let indices: Vec<usize> = batch.metadatas().iter().map(|m| m.chunk_index).collect();
        assert_eq!(indices, (0..batch.len()).collect::<Vec<_>>());
        assert!(batch.len() >= 4);
        assert_eq!(batch.metadatas().last().unwrap().section, "After");
    }

    #[test]
    fn test_ids_unique_and_parallel_lengths() {
        let batch = build_index_batch(&corpus(), 10);
        let ids: HashSet<&str> = batch.ids().into_iter().collect();
        assert_eq!(ids.len(), batch.len());
        assert_eq!(batch.texts().len(), batch.len());
        assert_eq!(batch.metadatas().len(), batch.len());
    }

    #[test]
    fn test_oversized_chunks_reported() {
        let doc = Document::new("a.md", format!("## Wall\n\n{}", "z".repeat(400)));
        let batch = build_index_batch(&[doc], 100);
        assert_eq!(batch.oversized, vec!["a.md::chunk0".to_string()]);
    }

    #[test]
    fn test_hash_matches_text() {
        let batch = build_index_batch(&corpus(), 1500);
        for record in &batch.records {
            assert_eq!(record.hash, text_hash(&record.text));
            assert_eq!(record.hash.len(), 64);
        }
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut reversed = corpus();
        reversed.reverse();
        let a = build_index_batch(&corpus(), 1500);
        let b = build_index_batch(&reversed, 1500);
        assert_eq!(a.records, b.records);
    }
}
