//! Search result snapshots.
//!
//! A [`SearchResultSet`] is an immutable list of (identifier, score) pairs
//! produced by a session at a point in time. Resolution to documents and
//! URLs is lazy and memoized: the engine is asked at most once per
//! instance, even under concurrent first access.

use tokio::sync::OnceCell;
use url::Url;

use findex_types::{DocumentId, DocumentRef};

use crate::error::SearchError;
use crate::index::TextIndex;

/// Immutable match snapshot with lazily resolved derived data.
///
/// `document_ids()` and `scores()` are parallel at construction:
/// `document_ids()[i]` scored `scores()[i]`. The index this set references
/// must outlive it, which the embedded `TextIndex` handle guarantees.
pub struct SearchResultSet {
    index: TextIndex,
    ids: Vec<DocumentId>,
    scores: Vec<f32>,
    documents: OnceCell<Vec<DocumentRef>>,
    urls: OnceCell<Vec<Url>>,
}

impl SearchResultSet {
    pub fn new(index: TextIndex, ids: Vec<DocumentId>, scores: Vec<f32>) -> Self {
        debug_assert_eq!(ids.len(), scores.len());
        Self {
            index,
            ids,
            scores,
            documents: OnceCell::new(),
            urls: OnceCell::new(),
        }
    }

    /// Identifiers of the matched documents, in match order.
    pub fn document_ids(&self) -> &[DocumentId] {
        &self.ids
    }

    /// Relevance scores, parallel to [`Self::document_ids`].
    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    /// Number of matches in this snapshot.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The matched documents, resolved through the index.
    ///
    /// Resolved once on first access and cached; concurrent first accesses
    /// share a single resolution. Identifiers the engine cannot resolve are
    /// dropped, so this list can be shorter than [`Self::scores`] and is
    /// then no longer index-aligned with it. Callers needing positional
    /// alignment should use [`TextIndex::resolve_documents`] directly.
    pub async fn documents(&self) -> Result<&[DocumentRef], SearchError> {
        let resolved = self
            .documents
            .get_or_try_init(|| async {
                let refs = self.index.resolve_documents(&self.ids).await?;
                Ok::<_, SearchError>(refs.into_iter().flatten().collect())
            })
            .await?;
        Ok(resolved.as_slice())
    }

    /// The matched documents' source URLs, resolved through the index.
    ///
    /// Same contract and the same unresolved-identifier caveat as
    /// [`Self::documents`].
    pub async fn urls(&self) -> Result<&[Url], SearchError> {
        let resolved = self
            .urls
            .get_or_try_init(|| async {
                let urls = self.index.resolve_urls(&self.ids).await?;
                Ok::<_, SearchError>(urls.into_iter().flatten().collect())
            })
            .await?;
        Ok(resolved.as_slice())
    }
}

impl std::fmt::Debug for SearchResultSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchResultSet")
            .field("matches", &self.ids.len())
            .finish_non_exhaustive()
    }
}
