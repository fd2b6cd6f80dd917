//! Search layer error types.

use thiserror::Error;

use findex_engine::EngineError;

/// Errors surfaced by the indexing facade and search sessions.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The underlying engine failed
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}
