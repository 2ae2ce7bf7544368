//! Filesystem corpus loader.
//!
//! Walks `corpus.root`, keeps files matching the include globs and not the
//! exclude globs, decodes each strictly as UTF-8, and returns documents
//! sorted by relative path. Any unreadable or undecodable file fails the
//! whole load.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use docsage_core::models::{Document, CHUNK_ID_SEPARATOR};

use crate::config::CorpusConfig;
use crate::error::IngestError;

const DEFAULT_EXCLUDES: [&str; 3] = ["**/.git/**", "**/target/**", "**/node_modules/**"];

pub fn load_documents(config: &CorpusConfig) -> Result<Vec<Document>, IngestError> {
    let root = &config.root;
    if !root.is_dir() {
        return Err(IngestError::CorpusRootMissing(root.clone()));
    }

    let include_set = build_globset(&config.include_globs)?;
    let mut excludes: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
    excludes.extend(config.exclude_globs.iter().cloned());
    let exclude_set = build_globset(&excludes)?;

    let mut documents = Vec::new();

    for entry in WalkDir::new(root).follow_links(config.follow_symlinks) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = relative_path(root, path);
        if exclude_set.is_match(&relative) || !include_set.is_match(&relative) {
            continue;
        }
        if relative.contains(CHUNK_ID_SEPARATOR) {
            return Err(IngestError::InvalidPath(relative));
        }

        let bytes = std::fs::read(path).map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let content = String::from_utf8(bytes).map_err(|source| IngestError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %relative, bytes = content.len(), "loaded document");
        documents.push(Document::new(relative, content));
    }

    if documents.is_empty() {
        return Err(IngestError::EmptyCorpus(root.clone()));
    }

    documents.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(documents)
}

/// `/`-separated path of `path` relative to `root`, on every platform.
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}
