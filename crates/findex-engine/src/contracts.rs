//! Engine boundary traits.
//!
//! Everything findex needs from a text-indexing engine, as object-safe
//! traits. Index internals (storage format, tokenization, scoring) stay
//! behind this boundary.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use findex_types::{
    DocumentId, DocumentRef, IndexKind, IndexOptions, MatchBatch, SearchOptions, StorageTarget,
};

use crate::error::EngineError;

/// An engine able to create and open indexes.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Create a new, empty index of the requested kind at the target.
    async fn create_index(
        &self,
        target: &StorageTarget,
        name: Option<&str>,
        kind: IndexKind,
        options: &IndexOptions,
    ) -> Result<Arc<dyn EngineIndex>, EngineError>;

    /// Open an existing index at the target.
    ///
    /// Failing to open is an expected, common case (first use); callers
    /// wanting open-or-create semantics fall back to [`Self::create_index`]
    /// with the same parameters.
    async fn open_index(
        &self,
        target: &StorageTarget,
        name: Option<&str>,
    ) -> Result<Arc<dyn EngineIndex>, EngineError>;
}

/// One engine index instance.
///
/// Shared read/write across callers; the engine serializes writes
/// internally. Callers must not assume ordering between concurrent adds.
#[async_trait]
pub trait EngineIndex: Send + Sync {
    /// Index raw text under the document's identity.
    ///
    /// With `replace = false` and an already-indexed document, the prior
    /// content is kept and the call is a no-op.
    async fn add_with_text(
        &self,
        document: &DocumentRef,
        text: &str,
        replace: bool,
    ) -> Result<(), EngineError>;

    /// Index a document whose content the engine fetches from its source
    /// URL, optionally guided by a MIME-type hint.
    async fn add_from_source(
        &self,
        document: &DocumentRef,
        mime_hint: Option<&str>,
        replace: bool,
    ) -> Result<(), EngineError>;

    /// Commit pending writes so they become visible to subsequent
    /// searches. Acts as a barrier: documents are only guaranteed
    /// searchable once this returns.
    async fn flush(&self) -> Result<(), EngineError>;

    /// Number of indexed documents as of the last flush.
    fn document_count(&self) -> u64;

    /// Resolve identifiers to document handles, positionally.
    ///
    /// The result has the same length and order as `ids`; `None` marks an
    /// identifier the engine could not resolve. Empty input yields an
    /// empty output.
    async fn resolve_documents(
        &self,
        ids: &[DocumentId],
    ) -> Result<Vec<Option<DocumentRef>>, EngineError>;

    /// Resolve identifiers to source URLs; same contract as
    /// [`Self::resolve_documents`].
    async fn resolve_urls(&self, ids: &[DocumentId]) -> Result<Vec<Option<Url>>, EngineError>;

    /// Start a query against this index and hand back its search handle.
    async fn begin_search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Arc<dyn EngineSearch>, EngineError>;
}

/// One running engine query, polled for matches in bounded batches.
#[async_trait]
pub trait EngineSearch: Send + Sync {
    /// Fetch up to `limit` further matches, waiting at most `wait`.
    ///
    /// A batch with zero matches and `more = true` is valid; callers loop
    /// until `more` is false. After [`Self::cancel`], fetches return a
    /// terminal empty batch.
    async fn fetch_matches(&self, limit: usize, wait: Duration) -> Result<MatchBatch, EngineError>;

    /// Ask the engine to abort this query. Best-effort and idempotent.
    fn cancel(&self);
}
