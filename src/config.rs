//! TOML configuration.
//!
//! Every setting the pipeline needs travels in one [`Config`] value:
//! where the corpus lives, the chunk size bound, where and under which
//! collection name chunks are stored, the embedding provider, retrieval
//! defaults, and the evaluation question set.
//!
//! ```toml
//! [corpus]
//! root = "./docs"
//!
//! [chunking]
//! max_chars = 1500
//!
//! [index]
//! path = "./data/docsage.sqlite"
//! collection = "internal_docs"
//!
//! [embedding]
//! provider = "openai"
//! model = "text-embedding-3-small"
//! dims = 1536
//!
//! [[eval.cases]]
//! question = "How do I open a pull request?"
//! expected = "pull-request-checklist.md"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use docsage_core::chunk::DEFAULT_MAX_CHARS;
use docsage_core::eval::EvalCase;
use docsage_core::models::CHUNK_ID_SEPARATOR;
use docsage_core::retrieve::{DEFAULT_TOP_K, MAX_TOP_K};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub eval: EvalConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Soft bound on chunk length, in characters.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
        }
    }
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    /// SQLite database file holding the vector index.
    #[serde(default = "default_index_path")]
    pub path: PathBuf,
    /// Collection (namespace) that ingestion replaces and retrieval queries.
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Chunks per embedding call and per upsert.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: default_index_path(),
            collection: default_collection(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_index_path() -> PathBuf {
    PathBuf::from("./data/docsage.sqlite")
}
fn default_collection() -> String {
    "internal_docs".to_string()
}
fn default_batch_size() -> usize {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            base_url: default_base_url(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EvalConfig {
    #[serde(default)]
    pub cases: Vec<EvalCase>,
}

impl Config {
    /// Defaults for commands that can run without a config file.
    pub fn minimal() -> Self {
        Self {
            corpus: CorpusConfig {
                root: PathBuf::from("./docs"),
                include_globs: default_include_globs(),
                exclude_globs: Vec::new(),
                follow_symlinks: false,
            },
            chunking: ChunkingConfig::default(),
            index: IndexConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            eval: EvalConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.max_chars == 0 {
        bail!("chunking.max_chars must be > 0");
    }

    if config.index.collection.trim().is_empty() {
        bail!("index.collection must not be empty");
    }
    if config.index.batch_size == 0 {
        bail!("index.batch_size must be > 0");
    }

    if !(1..=MAX_TOP_K).contains(&config.retrieval.top_k) {
        bail!("retrieval.top_k must be in [1, {}]", MAX_TOP_K);
    }

    for case in &config.eval.cases {
        if case.expected.contains(CHUNK_ID_SEPARATOR) {
            bail!(
                "eval case expected path '{}' must not contain '{}'",
                case.expected,
                CHUNK_ID_SEPARATOR
            );
        }
    }

    match config.embedding.provider.as_str() {
        "disabled" | "openai" => {}
        other => bail!(
            "Unknown embedding provider: '{}'. Must be disabled or openai.",
            other
        ),
    }

    if config.embedding.is_enabled() {
        if config.embedding.model.is_none() {
            bail!(
                "embedding.model must be specified when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
            bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                config.embedding.provider
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_src)?;
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn test_defaults_applied() {
        let config = parse("[corpus]\nroot = \"./docs\"\n").unwrap();
        assert_eq!(config.chunking.max_chars, 1500);
        assert_eq!(config.index.collection, "internal_docs");
        assert_eq!(config.index.batch_size, 100);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.corpus.include_globs, vec!["**/*.md"]);
        assert!(!config.embedding.is_enabled());
        assert!(config.eval.cases.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = parse(
            r#"
[corpus]
root = "/srv/docs"
exclude_globs = ["drafts/**"]

[chunking]
max_chars = 800

[index]
path = "/tmp/idx.sqlite"
collection = "handbook"

[embedding]
provider = "openai"
model = "text-embedding-3-small"
dims = 1536

[retrieval]
top_k = 8

[[eval.cases]]
question = "How do I open a pull request?"
expected = "pull-request-checklist.md"
"#,
        )
        .unwrap();

        assert_eq!(config.chunking.max_chars, 800);
        assert_eq!(config.index.collection, "handbook");
        assert_eq!(config.corpus.exclude_globs, vec!["drafts/**"]);
        assert_eq!(config.retrieval.top_k, 8);
        assert_eq!(config.eval.cases.len(), 1);
        assert_eq!(config.eval.cases[0].expected, "pull-request-checklist.md");
        assert_eq!(config.embedding.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_rejects_zero_max_chars() {
        let err = parse("[corpus]\nroot = \".\"\n[chunking]\nmax_chars = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_chars"));
    }

    #[test]
    fn test_rejects_top_k_out_of_range() {
        let err = parse("[corpus]\nroot = \".\"\n[retrieval]\ntop_k = 21\n").unwrap_err();
        assert!(err.to_string().contains("top_k"));
    }

    #[test]
    fn test_rejects_unknown_provider() {
        let err = parse("[corpus]\nroot = \".\"\n[embedding]\nprovider = \"magic\"\n").unwrap_err();
        assert!(err.to_string().contains("Unknown embedding provider"));
    }

    #[test]
    fn test_openai_requires_model_and_dims() {
        let err = parse("[corpus]\nroot = \".\"\n[embedding]\nprovider = \"openai\"\n").unwrap_err();
        assert!(err.to_string().contains("embedding.model"));

        let err = parse(
            "[corpus]\nroot = \".\"\n[embedding]\nprovider = \"openai\"\nmodel = \"m\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("embedding.dims"));
    }

    #[test]
    fn test_rejects_separator_in_eval_path() {
        let err = parse(
            "[corpus]\nroot = \".\"\n[[eval.cases]]\nquestion = \"q\"\nexpected = \"a.md::chunk0\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("must not contain"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_minimal_is_valid() {
        assert!(validate(&Config::minimal()).is_ok());
    }
}
