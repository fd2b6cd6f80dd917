//! # findex-search
//!
//! Document indexing facade and asynchronous, cancellable search sessions
//! over a findex engine.
//!
//! The engine does the indexing and matching; this crate owns the
//! lifecycle around it:
//! - [`TextIndex`]: create/open-or-create an index, add documents, flush,
//!   resolve identifiers back to documents and URLs
//! - [`SearchSessionManager`]: start queries without blocking, cancel them
//!   by ID, observe progress and completion through callbacks
//! - [`SearchResultSet`]: immutable match snapshots with lazy, memoized
//!   resolution of identifiers to richer data
//!
//! ## Example
//!
//! ```no_run
//! use findex_engine::TantivyEngine;
//! use findex_search::{IndexConfig, SearchSessionManager, TextIndex};
//! use findex_types::{SearchOptions, StorageTarget};
//!
//! # async fn example() -> Result<(), findex_search::SearchError> {
//! let engine = TantivyEngine::new();
//! let index =
//!     TextIndex::open_or_create(&engine, &StorageTarget::Memory, &IndexConfig::default())
//!         .await?;
//! let manager = SearchSessionManager::new(index);
//! let id = manager.start(
//!     "whales",
//!     SearchOptions::default(),
//!     None,
//!     Some(Box::new(|results| {
//!         println!("{} matches", results.len());
//!     })),
//! );
//! manager.cancel(id);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod index;
pub mod manager;
pub mod results;
pub mod session;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::SearchError;
pub use index::{IndexConfig, TextIndex};
pub use manager::{SearchSessionManager, SessionManagerConfig, DEFAULT_MAX_CONCURRENT_SEARCHES};
pub use results::SearchResultSet;
pub use session::{
    CompletionHandler, ProgressHandler, SessionState, BATCH_LIMIT, BATCH_WAIT,
};
