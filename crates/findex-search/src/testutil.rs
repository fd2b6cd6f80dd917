//! Scripted engine double for session and facade tests.
//!
//! The scripted engine serves a pre-programmed sequence of match batches
//! per search and counts every call crossing the engine boundary, so tests
//! can assert how often the layer above actually reached the engine.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use findex_engine::{EngineError, EngineIndex, EngineSearch, SearchEngine};
use findex_types::{
    DocumentId, DocumentRef, IndexKind, IndexOptions, MatchBatch, SearchOptions, StorageTarget,
};

/// A batch with the given raw identifiers, each scored 1.0.
pub(crate) fn batch(ids: &[u64], more: bool) -> MatchBatch {
    MatchBatch {
        ids: ids.iter().copied().map(DocumentId::new).collect(),
        scores: vec![1.0; ids.len()],
        more,
    }
}

fn url_for(id: u64) -> Url {
    Url::parse(&format!("mem://doc/{id}")).unwrap()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) struct ScriptedEngine {
    index: Arc<ScriptedIndex>,
    openable: bool,
    pub open_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
}

impl ScriptedEngine {
    pub(crate) fn new() -> Self {
        Self {
            index: Arc::new(ScriptedIndex::new()),
            openable: false,
            open_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
        }
    }

    /// Whether `open_index` succeeds instead of failing like a first use.
    pub(crate) fn with_openable(mut self, openable: bool) -> Self {
        self.openable = openable;
        self
    }

    pub(crate) fn index(&self) -> Arc<ScriptedIndex> {
        Arc::clone(&self.index)
    }
}

#[async_trait]
impl SearchEngine for ScriptedEngine {
    async fn create_index(
        &self,
        _target: &StorageTarget,
        _name: Option<&str>,
        _kind: IndexKind,
        _options: &IndexOptions,
    ) -> Result<Arc<dyn EngineIndex>, EngineError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.index.clone())
    }

    async fn open_index(
        &self,
        _target: &StorageTarget,
        _name: Option<&str>,
    ) -> Result<Arc<dyn EngineIndex>, EngineError> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        if self.openable {
            Ok(self.index.clone())
        } else {
            Err(EngineError::OpenFailed("scripted open failure".into()))
        }
    }
}

pub(crate) struct ScriptedIndex {
    next_id: AtomicU64,
    batches: Mutex<Vec<MatchBatch>>,
    delay: Mutex<Option<Duration>>,
    known: Mutex<HashMap<DocumentId, Url>>,
    pub add_calls: AtomicUsize,
    pub flush_calls: AtomicUsize,
    pub resolve_document_calls: AtomicUsize,
    pub resolve_url_calls: AtomicUsize,
    pub cancel_calls: Arc<AtomicUsize>,
}

impl ScriptedIndex {
    fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            batches: Mutex::new(Vec::new()),
            delay: Mutex::new(None),
            known: Mutex::new(HashMap::new()),
            add_calls: AtomicUsize::new(0),
            flush_calls: AtomicUsize::new(0),
            resolve_document_calls: AtomicUsize::new(0),
            resolve_url_calls: AtomicUsize::new(0),
            cancel_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Program the batches every search started from now on will serve.
    pub(crate) fn script_batches(&self, batches: Vec<MatchBatch>) {
        *lock(&self.batches) = batches;
    }

    /// Delay every fetch by this long, to leave cancellation a window.
    pub(crate) fn script_delay(&self, delay: Duration) {
        *lock(&self.delay) = Some(delay);
    }

    /// Make the given raw identifiers resolvable.
    pub(crate) fn know_documents(&self, ids: impl IntoIterator<Item = u64>) {
        let mut known = lock(&self.known);
        for id in ids {
            known.insert(DocumentId::new(id), url_for(id));
        }
    }

    fn record_document(&self, document: &DocumentRef) {
        let mut known = lock(&self.known);
        let exists = known.values().any(|url| url == document.url());
        if !exists {
            let id = DocumentId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
            known.insert(id, document.url().clone());
        }
    }
}

#[async_trait]
impl EngineIndex for ScriptedIndex {
    async fn add_with_text(
        &self,
        document: &DocumentRef,
        _text: &str,
        _replace: bool,
    ) -> Result<(), EngineError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        self.record_document(document);
        Ok(())
    }

    async fn add_from_source(
        &self,
        document: &DocumentRef,
        _mime_hint: Option<&str>,
        _replace: bool,
    ) -> Result<(), EngineError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        self.record_document(document);
        Ok(())
    }

    async fn flush(&self) -> Result<(), EngineError> {
        self.flush_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn document_count(&self) -> u64 {
        lock(&self.known).len() as u64
    }

    async fn resolve_documents(
        &self,
        ids: &[DocumentId],
    ) -> Result<Vec<Option<DocumentRef>>, EngineError> {
        self.resolve_document_calls.fetch_add(1, Ordering::SeqCst);
        let known = lock(&self.known);
        Ok(ids
            .iter()
            .map(|id| known.get(id).cloned().map(DocumentRef::new))
            .collect())
    }

    async fn resolve_urls(&self, ids: &[DocumentId]) -> Result<Vec<Option<Url>>, EngineError> {
        self.resolve_url_calls.fetch_add(1, Ordering::SeqCst);
        let known = lock(&self.known);
        Ok(ids.iter().map(|id| known.get(id).cloned()).collect())
    }

    async fn begin_search(
        &self,
        _query: &str,
        _options: &SearchOptions,
    ) -> Result<Arc<dyn EngineSearch>, EngineError> {
        Ok(Arc::new(ScriptedSearch {
            queue: Mutex::new(lock(&self.batches).iter().cloned().collect()),
            delay: *lock(&self.delay),
            cancelled: AtomicBool::new(false),
            cancel_calls: Arc::clone(&self.cancel_calls),
        }))
    }
}

pub(crate) struct ScriptedSearch {
    queue: Mutex<VecDeque<MatchBatch>>,
    delay: Option<Duration>,
    cancelled: AtomicBool,
    cancel_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl EngineSearch for ScriptedSearch {
    async fn fetch_matches(&self, _limit: usize, _wait: Duration) -> Result<MatchBatch, EngineError> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Ok(MatchBatch::exhausted());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(lock(&self.queue).pop_front().unwrap_or_default())
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
    }
}
