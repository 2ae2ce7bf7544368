//! Core data models shared by the chunker, the corpus driver, and storage.

use serde::{Deserialize, Serialize};

/// Separator between a document's relative path and its chunk suffix.
///
/// Must never appear inside a relative path; the corpus loader rejects
/// such paths before chunking.
pub const CHUNK_ID_SEPARATOR: &str = "::";

/// Section label used for content preceding the first `## ` heading.
pub const INTRO_SECTION: &str = "(intro)";

/// A markdown document read from the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Base file name, e.g. `onboarding.md`.
    pub filename: String,
    /// `/`-separated path relative to the corpus root. Unique within a corpus.
    pub relative_path: String,
    /// Raw document text.
    pub content: String,
}

impl Document {
    pub fn new(relative_path: impl Into<String>, content: impl Into<String>) -> Self {
        let relative_path = relative_path.into();
        let filename = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(relative_path.as_str())
            .to_string();
        Self {
            filename,
            relative_path,
            content: content.into(),
        }
    }
}

/// A heading-delimited span of a document.
///
/// `heading` is the trimmed `## ` line including its marker, or empty for
/// the preamble. `body` is the trimmed text up to the next heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

/// The atomic retrieval unit produced by the chunker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Composed chunk text (title, heading, and body separated by blank lines).
    pub text: String,
    /// Human-readable section label, or [`INTRO_SECTION`].
    pub section: String,
}

/// Metadata stored next to every indexed chunk.
///
/// Serializes with exactly the keys `source`, `filename`, `chunk_index`,
/// and `section`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: String,
    pub filename: String,
    pub chunk_index: usize,
    pub section: String,
}

/// A chunk ready for the vector store: identifier, text, metadata, and a
/// SHA-256 digest of the text.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRecord {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
    pub hash: String,
}

/// Build the identifier `relative_path::chunk<index>`.
pub fn chunk_id(relative_path: &str, index: usize) -> String {
    format!("{relative_path}{CHUNK_ID_SEPARATOR}chunk{index}")
}

/// Recover the originating document path from a chunk identifier.
///
/// Identifiers without a separator are returned unchanged.
pub fn source_of(chunk_id: &str) -> &str {
    chunk_id
        .split_once(CHUNK_ID_SEPARATOR)
        .map(|(source, _)| source)
        .unwrap_or(chunk_id)
}
