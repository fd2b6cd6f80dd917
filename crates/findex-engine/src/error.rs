//! Engine error types.

use thiserror::Error;
use url::Url;

/// Errors surfaced across the engine boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Tantivy index error
    #[error("Tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Opening an existing index failed. Callers building an index with
    /// open-or-create semantics recover from this by creating instead.
    #[error("cannot open index: {0}")]
    OpenFailed(String),

    /// The index schema does not match what this engine expects
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The index writer lock was poisoned by a panicking writer
    #[error("index writer is locked: {0}")]
    WriterLocked(String),

    /// The document's source cannot be fetched by this engine
    #[error("unsupported document source: {0}")]
    UnsupportedSource(Url),
}
