//! Document identity types.
//!
//! A [`DocumentId`] is the engine-assigned integer key for a document;
//! a [`DocumentRef`] is the engine-issued handle carrying the document's
//! source location.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Engine-assigned integer uniquely identifying a document within one
/// index instance.
///
/// Identifiers are stable across flushes but not guaranteed stable across
/// index rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(u64);

impl DocumentId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle identifying one indexed document plus its source location.
///
/// Immutable once created. Identity is the underlying source URL: two
/// independently constructed refs to the same URL compare equal and denote
/// the same indexed document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    url: Url,
}

impl DocumentRef {
    /// Create a document handle for the given source URL.
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// The document's source URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Consume the handle, returning the source URL.
    pub fn into_url(self) -> Url {
        self.url
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

impl From<Url> for DocumentRef {
    fn from(url: Url) -> Self {
        Self::new(url)
    }
}
