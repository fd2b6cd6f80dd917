//! Document identifier registry.
//!
//! Tantivy's internal doc addresses are not stable across merges, so the
//! embedded engine assigns its own sequential identifiers per source URL
//! and answers resolution from this table. The registry lives for the
//! lifetime of one index instance; reopening a durable index rehydrates it
//! from stored fields.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use url::Url;

use findex_types::DocumentId;

#[derive(Default)]
struct Inner {
    by_id: HashMap<DocumentId, Url>,
    by_url: HashMap<String, DocumentId>,
}

/// Bidirectional URL <-> identifier table.
///
/// Identifiers start at 1 and are stable across flushes and content
/// replacement; re-adding a known URL keeps its identifier.
pub struct DocumentRegistry {
    next_id: AtomicU64,
    inner: RwLock<Inner>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            inner: RwLock::new(Inner::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The identifier already assigned to this URL, if any.
    pub fn lookup(&self, url: &Url) -> Option<DocumentId> {
        self.read().by_url.get(url.as_str()).copied()
    }

    /// The identifier for this URL, assigning the next free one if the URL
    /// is new.
    pub fn assign(&self, url: &Url) -> DocumentId {
        if let Some(existing) = self.lookup(url) {
            return existing;
        }
        let mut inner = self.write();
        // Racing assigners may both miss the fast path; re-check under the
        // write lock so one URL never gets two identifiers.
        if let Some(existing) = inner.by_url.get(url.as_str()) {
            return *existing;
        }
        let id = DocumentId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        inner.by_id.insert(id, url.clone());
        inner.by_url.insert(url.as_str().to_string(), id);
        id
    }

    /// The source URL for an identifier, `None` if unknown.
    pub fn url_of(&self, id: DocumentId) -> Option<Url> {
        self.read().by_id.get(&id).cloned()
    }

    /// Restore a known identifier/URL pair (registry hydration on index
    /// reopen). Future assignments continue past the highest restored id.
    pub fn restore(&self, id: DocumentId, url: Url) {
        let mut inner = self.write();
        inner.by_url.insert(url.as_str().to_string(), id);
        inner.by_id.insert(id, url);
        self.next_id.fetch_max(id.raw() + 1, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DocumentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_assign_is_stable_per_url() {
        let registry = DocumentRegistry::new();
        let a = registry.assign(&url("mem://docs/a"));
        let b = registry.assign(&url("mem://docs/b"));
        assert_ne!(a, b);
        assert_eq!(registry.assign(&url("mem://docs/a")), a);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let registry = DocumentRegistry::new();
        assert_eq!(registry.assign(&url("mem://docs/a")).raw(), 1);
        assert_eq!(registry.assign(&url("mem://docs/b")).raw(), 2);
    }

    #[test]
    fn test_url_of_unknown_id() {
        let registry = DocumentRegistry::new();
        assert_eq!(registry.url_of(DocumentId::new(99)), None);
    }

    #[test]
    fn test_restore_bumps_next_assignment() {
        let registry = DocumentRegistry::new();
        registry.restore(DocumentId::new(7), url("mem://docs/old"));
        assert_eq!(registry.url_of(DocumentId::new(7)), Some(url("mem://docs/old")));
        assert_eq!(registry.assign(&url("mem://docs/new")).raw(), 8);
    }
}
