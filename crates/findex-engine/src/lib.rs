//! # findex-engine
//!
//! The text-indexing engine boundary for findex, plus an embedded engine.
//!
//! The engine is an external collaborator: it stores documents and, given a
//! query, yields matches incrementally. This crate defines that boundary as
//! three object-safe traits ([`SearchEngine`], [`EngineIndex`],
//! [`EngineSearch`]) and ships one implementation backed by Tantivy:
//! - Inverted full-text index with BM25 scoring
//! - In-memory or mmap-backed durable storage
//! - Sequential document identifiers via an in-process registry
//!
//! Everything above the boundary (session lifecycle, lazy result
//! resolution) lives in `findex-search` and works with any engine.

pub mod contracts;
pub mod error;
pub mod query;
pub mod registry;
pub mod schema;
pub mod tantivy_engine;

pub use contracts::{EngineIndex, EngineSearch, SearchEngine};
pub use error::EngineError;
pub use registry::DocumentRegistry;
pub use schema::{build_index_schema, IndexSchema};
pub use tantivy_engine::TantivyEngine;
