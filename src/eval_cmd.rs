//! `docsage eval`: precision@k over the configured question set.

use anyhow::Result;

use docsage_core::eval::run_eval;

use crate::config::Config;
use crate::embedding;
use crate::sqlite_store::SqliteStore;

pub async fn run_eval_cmd(config: &Config, top_k: Option<usize>) -> Result<()> {
    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let embedder = embedding::create_provider(&config.embedding)?;
    let store = SqliteStore::open(&config.index.path).await?;

    let report = run_eval(
        &store,
        embedder.as_ref(),
        &config.index.collection,
        &config.eval.cases,
        top_k,
    )
    .await;
    store.close().await;
    let report = report?;

    println!("{}", report.render());
    Ok(())
}
