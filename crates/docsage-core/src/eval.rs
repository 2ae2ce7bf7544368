//! Retrieval evaluation: precision@k over a fixed question set.
//!
//! Each case names a question and the relative path of the document that
//! should answer it. A case is a hit when any of the top-k chunks comes
//! from that document; its rank is the 1-based position of the first such
//! chunk.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::embedding::Embedder;
use crate::retrieve::retrieve;
use crate::store::VectorStore;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EvalCase {
    pub question: String,
    /// Relative path of the document expected among the results.
    pub expected: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvalRow {
    pub question: String,
    pub expected: String,
    pub hit: bool,
    pub rank: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub top_k: usize,
    pub rows: Vec<EvalRow>,
    pub hits: usize,
}

impl EvalReport {
    /// Fraction of cases whose expected document was retrieved.
    pub fn precision(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        self.hits as f64 / self.rows.len() as f64
    }

    /// Aligned plain-text table with a `Precision@k` footer.
    pub fn render(&self) -> String {
        let q_width = self.rows.iter().map(|r| r.question.chars().count()).max().unwrap_or(0);
        let doc_width = self.rows.iter().map(|r| r.expected.chars().count()).max().unwrap_or(0);

        let header = format!(
            "{:<q_width$}  {:<doc_width$}  Hit  Rank",
            "Question", "Expected Doc"
        );
        let rule = "-".repeat(header.chars().count());

        let mut out = String::new();
        out.push_str(&header);
        out.push('\n');
        out.push_str(&rule);
        out.push('\n');
        for row in &self.rows {
            let mark = if row.hit { "Y" } else { "N" };
            let rank = row.rank.map_or_else(|| "-".to_string(), |r| r.to_string());
            out.push_str(&format!(
                "{:<q_width$}  {:<doc_width$}  {:>3}  {:>4}\n",
                row.question, row.expected, mark, rank
            ));
        }
        out.push_str(&rule);
        out.push('\n');
        out.push_str(&format!(
            "Precision@{}: {:.0}% ({}/{})",
            self.top_k,
            self.precision() * 100.0,
            self.hits,
            self.rows.len()
        ));
        out
    }
}

/// Run every case against the store and tally hits.
///
/// Retrieval errors (including an empty collection) abort the run.
pub async fn run_eval(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    collection: &str,
    cases: &[EvalCase],
    top_k: usize,
) -> Result<EvalReport> {
    if cases.is_empty() {
        bail!("No evaluation cases configured. Add [[eval.cases]] entries to the config.");
    }

    let mut rows = Vec::with_capacity(cases.len());
    let mut hits = 0;

    for case in cases {
        let results = retrieve(store, embedder, collection, &case.question, top_k).await?;
        let rank = results
            .iter()
            .position(|r| r.source() == case.expected)
            .map(|i| i + 1);
        if rank.is_some() {
            hits += 1;
        }
        tracing::debug!(question = %case.question, expected = %case.expected, ?rank, "eval case");
        rows.push(EvalRow {
            question: case.question.clone(),
            expected: case.expected.clone(),
            hit: rank.is_some(),
            rank,
        });
    }

    Ok(EvalReport { top_k, rows, hits })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieve::tests::{seeded_store, KeywordEmbedder};
    use crate::store::memory::InMemoryStore;

    fn case(question: &str, expected: &str) -> EvalCase {
        EvalCase {
            question: question.to_string(),
            expected: expected.to_string(),
        }
    }

    #[tokio::test]
    async fn test_run_eval_hits_and_ranks() {
        let store = seeded_store("docs").await;
        let cases = vec![
            case("How do we deploy?", "ops/deploy.md"),
            case("python setup", "python.md"),
            case("rust testing", "missing.md"),
        ];
        let report = run_eval(&store, &KeywordEmbedder, "docs", &cases, 2)
            .await
            .unwrap();

        assert_eq!(report.hits, 2);
        assert_eq!(report.rows[0].rank, Some(1));
        assert_eq!(report.rows[1].rank, Some(1));
        assert!(!report.rows[2].hit);
        assert_eq!(report.rows[2].rank, None);
        assert!((report.precision() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_run_eval_requires_cases() {
        let store = seeded_store("docs").await;
        let err = run_eval(&store, &KeywordEmbedder, "docs", &[], 5)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No evaluation cases"));
    }

    #[tokio::test]
    async fn test_run_eval_empty_collection_fails() {
        let store = InMemoryStore::new();
        let cases = vec![case("q", "a.md")];
        let err = run_eval(&store, &KeywordEmbedder, "docs", &cases, 5)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No documents ingested yet"));
    }

    #[test]
    fn test_render_table() {
        let report = EvalReport {
            top_k: 5,
            rows: vec![
                EvalRow {
                    question: "Where?".to_string(),
                    expected: "a.md".to_string(),
                    hit: true,
                    rank: Some(2),
                },
                EvalRow {
                    question: "Why not?".to_string(),
                    expected: "bb.md".to_string(),
                    hit: false,
                    rank: None,
                },
                EvalRow {
                    question: "Who?".to_string(),
                    expected: "c.md".to_string(),
                    hit: true,
                    rank: Some(1),
                },
            ],
            hits: 2,
        };
        let rendered = report.render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "Question  Expected Doc  Hit  Rank");
        assert_eq!(lines[1], "-".repeat(lines[0].len()));
        assert_eq!(lines[2], "Where?    a.md     Y     2");
        assert_eq!(lines[3], "Why not?  bb.md    N     -");
        assert_eq!(lines[6], "Precision@5: 67% (2/3)");
    }
}
