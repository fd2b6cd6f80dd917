//! Text index facade.
//!
//! Thin, cloneable wrapper over one engine index instance. All clones share
//! the same underlying index; the engine serializes concurrent writes.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use findex_engine::{EngineIndex, EngineSearch, SearchEngine};
use findex_types::{
    DocumentId, DocumentRef, IndexKind, IndexOptions, SearchOptions, StorageTarget,
};

use crate::error::SearchError;

/// Index construction parameters: an optional name, the index kind, and
/// the engine options applied at creation.
#[derive(Debug, Clone, Default)]
pub struct IndexConfig {
    pub name: Option<String>,
    pub kind: IndexKind,
    pub options: IndexOptions,
}

impl IndexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_kind(mut self, kind: IndexKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_options(mut self, options: IndexOptions) -> Self {
        self.options = options;
        self
    }
}

/// Facade over one engine index.
///
/// Cheap to clone; every clone refers to the same underlying index.
#[derive(Clone)]
pub struct TextIndex {
    inner: Arc<dyn EngineIndex>,
}

impl TextIndex {
    /// Create a new, empty index.
    pub async fn create(
        engine: &dyn SearchEngine,
        target: &StorageTarget,
        config: &IndexConfig,
    ) -> Result<Self, SearchError> {
        let inner = engine
            .create_index(target, config.name.as_deref(), config.kind, &config.options)
            .await?;
        Ok(Self { inner })
    }

    /// Open an existing index at the target, falling back to creating a
    /// fresh one when opening fails.
    ///
    /// The fallback is silent: failing to open is the expected first-use
    /// case, so the failure is logged at debug level and never surfaced.
    pub async fn open_or_create(
        engine: &dyn SearchEngine,
        target: &StorageTarget,
        config: &IndexConfig,
    ) -> Result<Self, SearchError> {
        match engine.open_index(target, config.name.as_deref()).await {
            Ok(inner) => Ok(Self { inner }),
            Err(error) => {
                debug!(%error, "open failed; creating a new index");
                Self::create(engine, target, config).await
            }
        }
    }

    /// Index raw text under the document's identity.
    ///
    /// With `replace = false` and an already-indexed document the prior
    /// content is kept.
    pub async fn add_text(
        &self,
        document: &DocumentRef,
        text: &str,
        replace: bool,
    ) -> Result<(), SearchError> {
        self.inner.add_with_text(document, text, replace).await?;
        Ok(())
    }

    /// Index a document whose content the engine fetches from its source,
    /// optionally guided by a MIME-type hint.
    pub async fn add_document(
        &self,
        document: &DocumentRef,
        mime_hint: Option<&str>,
        replace: bool,
    ) -> Result<(), SearchError> {
        self.inner
            .add_from_source(document, mime_hint, replace)
            .await?;
        Ok(())
    }

    /// Commit pending writes. Blocking barrier: documents are guaranteed
    /// searchable only after this returns.
    pub async fn flush(&self) -> Result<(), SearchError> {
        self.inner.flush().await?;
        Ok(())
    }

    /// Number of indexed documents as of the last flush.
    pub fn document_count(&self) -> u64 {
        self.inner.document_count()
    }

    /// Resolve identifiers to document handles, positionally: the result
    /// matches `ids` in length and order, with `None` for identifiers the
    /// engine could not resolve. Empty input yields an empty result.
    pub async fn resolve_documents(
        &self,
        ids: &[DocumentId],
    ) -> Result<Vec<Option<DocumentRef>>, SearchError> {
        Ok(self.inner.resolve_documents(ids).await?)
    }

    /// Resolve identifiers to source URLs; same contract as
    /// [`Self::resolve_documents`].
    pub async fn resolve_urls(&self, ids: &[DocumentId]) -> Result<Vec<Option<Url>>, SearchError> {
        Ok(self.inner.resolve_urls(ids).await?)
    }

    /// Start an engine query against this index.
    pub async fn begin_search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Arc<dyn EngineSearch>, SearchError> {
        Ok(self.inner.begin_search(query, options).await?)
    }
}
