//! # findex-types
//!
//! Shared domain types for the findex system.
//!
//! This crate defines the data structures used across the engine boundary
//! and the session layer:
//! - Document identity: [`DocumentId`], [`DocumentRef`]
//! - Search sessions: [`SessionId`]
//! - Index and search configuration: [`IndexKind`], [`IndexOptions`],
//!   [`SearchOptions`]
//! - Engine I/O: [`StorageTarget`], [`MatchBatch`]

pub mod document;
pub mod matches;
pub mod options;
pub mod session;
pub mod storage;

pub use document::{DocumentId, DocumentRef};
pub use matches::MatchBatch;
pub use options::{IndexKind, IndexOptions, SearchOptions};
pub use session::SessionId;
pub use storage::StorageTarget;
