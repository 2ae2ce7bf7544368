//! # docsage core
//!
//! Pure, I/O-free logic for docsage: the heading-aware markdown chunker,
//! the corpus driver that turns documents into an index batch, the vector
//! store and embedder traits, retrieval, and precision@k evaluation.
//!
//! This crate contains no tokio, sqlx, filesystem, or network code. The
//! `docsage` application crate supplies concrete providers and storage.

pub mod batch;
pub mod chunk;
pub mod embedding;
pub mod eval;
pub mod models;
pub mod retrieve;
pub mod store;
