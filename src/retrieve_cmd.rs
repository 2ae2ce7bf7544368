//! `docsage retrieve`: query the index and print results as JSON.

use anyhow::Result;
use serde::Serialize;

use docsage_core::retrieve::{debug_view, retrieve, unique_sources, DebugChunk, RetrievedChunk};

use crate::config::Config;
use crate::embedding;
use crate::sqlite_store::SqliteStore;

#[derive(Serialize)]
struct RetrieveOutput<'a> {
    results: &'a [RetrievedChunk],
    sources: Vec<&'a str>,
}

#[derive(Serialize)]
struct DebugOutput<'a> {
    query: &'a str,
    results: Vec<DebugChunk>,
}

pub async fn run_retrieve(
    config: &Config,
    query: &str,
    top_k: Option<usize>,
    debug: bool,
) -> Result<()> {
    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let embedder = embedding::create_provider(&config.embedding)?;
    let store = SqliteStore::open(&config.index.path).await?;

    let results = retrieve(
        &store,
        embedder.as_ref(),
        &config.index.collection,
        query,
        top_k,
    )
    .await;
    store.close().await;
    let results = results?;

    println!("{}", render_results(query, &results, debug)?);
    Ok(())
}

/// JSON body printed by the command: plain results with their distinct
/// sources, or the diagnostics view when `debug` is set.
pub fn render_results(query: &str, results: &[RetrievedChunk], debug: bool) -> Result<String> {
    let json = if debug {
        serde_json::to_string_pretty(&DebugOutput {
            query,
            results: debug_view(results),
        })?
    } else {
        serde_json::to_string_pretty(&RetrieveOutput {
            results,
            sources: unique_sources(results),
        })?
    };
    Ok(json)
}
