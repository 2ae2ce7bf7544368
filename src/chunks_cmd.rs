//! `docsage chunks`: show how one markdown file would be chunked.

use anyhow::{Context, Result};
use std::path::Path;

use docsage_core::chunk::{char_len, chunk_markdown};
use docsage_core::models::Chunk;

pub fn run_chunks(path: &Path, max_chars: usize) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let chunks = chunk_markdown(&content, max_chars);
    print!("{}", render_chunks(&chunks, max_chars));
    Ok(())
}

pub fn render_chunks(chunks: &[Chunk], max_chars: usize) -> String {
    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let len = char_len(&chunk.text);
        let flag = if len > max_chars { " oversized" } else { "" };
        out.push_str(&format!(
            "--- chunk {} [{}] ({} chars{})\n{}\n\n",
            i, chunk.section, len, flag, chunk.text
        ));
    }
    out.push_str(&format!("{} chunks\n", chunks.len()));
    out
}
