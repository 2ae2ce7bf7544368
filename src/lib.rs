//! # docsage
//!
//! Heading-aware markdown ingestion and retrieval for documentation
//! assistants.
//!
//! A corpus of markdown files is split into section-scoped chunks (each
//! carrying its document title and heading as context), embedded, and
//! stored in a SQLite vector index. Queries return the closest chunks and
//! the documents they came from.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌───────────┐
//! │   Corpus    │──▶│ Chunk+Embed  │──▶│  SQLite   │
//! │ (markdown)  │   │ (docsage-core)│   │  vectors  │
//! └─────────────┘   └──────────────┘   └─────┬─────┘
//!                                            │
//!                          ┌─────────────────┤
//!                          ▼                 ▼
//!                     ┌──────────┐     ┌──────────┐
//!                     │ retrieve │     │   eval   │
//!                     └──────────┘     └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docsage chunks docs/onboarding.md   # preview chunking, no config needed
//! docsage ingest --dry-run            # count documents and chunks
//! docsage ingest                      # embed and store
//! docsage retrieve "how do I deploy?" --debug
//! docsage eval                        # precision@k over [[eval.cases]]
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`corpus`] | Filesystem corpus loader |
//! | [`error`] | Typed ingestion errors |
//! | [`embedding`] | OpenAI and disabled embedding providers |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite vector store |
//! | [`ingest`] | Ingestion pipeline |
//! | [`retrieve_cmd`] | `retrieve` command |
//! | [`eval_cmd`] | `eval` command |
//! | [`chunks_cmd`] | `chunks` command |
//!
//! Chunking, index batches, the store trait, retrieval and evaluation live
//! in the `docsage-core` crate.

pub mod chunks_cmd;
pub mod config;
pub mod corpus;
pub mod db;
pub mod embedding;
pub mod error;
pub mod eval_cmd;
pub mod ingest;
pub mod migrate;
pub mod retrieve_cmd;
pub mod sqlite_store;
