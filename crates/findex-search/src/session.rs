//! Search sessions.
//!
//! One session is one running or completed query: it polls the engine in
//! bounded batches, accumulates matches, and reports through its
//! callbacks. Lifecycle: Pending -> Running -> Completed or Cancelled;
//! both terminal states go through the same completion path, so the
//! completion callback fires exactly once either way.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, warn};

use findex_engine::EngineSearch;
use findex_types::{DocumentId, SearchOptions, SessionId};

use crate::index::TextIndex;
use crate::results::SearchResultSet;

/// Maximum matches requested from the engine per batch.
pub const BATCH_LIMIT: usize = 20;

/// Bounded wait per engine batch call. Cancellation latency is capped by
/// this: the flag is only checked between batches.
pub const BATCH_WAIT: Duration = Duration::from_millis(1000);

/// Called after each batch with a snapshot of the matches so far.
pub type ProgressHandler = Box<dyn FnMut(SearchResultSet) + Send>;

/// Called exactly once when the session finishes or is cancelled, with the
/// full accumulated matches.
pub type CompletionHandler = Box<dyn FnOnce(SearchResultSet) + Send>;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Scheduled, waiting for an execution slot
    Pending,
    /// Polling the engine for matches
    Running,
    /// Exhausted the engine's matches
    Completed,
    /// Stopped by cancellation
    Cancelled,
}

const STATE_PENDING: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_COMPLETED: u8 = 2;
const STATE_CANCELLED: u8 = 3;

/// State shared between a running session and the manager's table:
/// the cancellation flag, the lifecycle state, and the engine search
/// handle once one exists.
pub(crate) struct SessionHandle {
    id: SessionId,
    cancelled: AtomicBool,
    state: AtomicU8,
    search: Mutex<Option<Arc<dyn EngineSearch>>>,
}

impl SessionHandle {
    pub(crate) fn new(id: SessionId) -> Self {
        Self {
            id,
            cancelled: AtomicBool::new(false),
            state: AtomicU8::new(STATE_PENDING),
            search: Mutex::new(None),
        }
    }

    pub(crate) fn id(&self) -> SessionId {
        self.id
    }

    /// Set the cancellation flag and notify the engine if a search handle
    /// exists yet. Idempotent; the session observes the flag at the top of
    /// its next batch iteration.
    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let search = self
            .search
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(search) = search {
            search.cancel();
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Publish the engine search handle so `cancel` can reach the engine.
    /// If cancellation already raced ahead, the engine is notified here.
    pub(crate) fn attach_search(&self, search: Arc<dyn EngineSearch>) {
        {
            let mut slot = self.search.lock().unwrap_or_else(PoisonError::into_inner);
            *slot = Some(Arc::clone(&search));
        }
        if self.is_cancelled() {
            search.cancel();
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        match self.state.load(Ordering::SeqCst) {
            STATE_PENDING => SessionState::Pending,
            STATE_RUNNING => SessionState::Running,
            STATE_COMPLETED => SessionState::Completed,
            _ => SessionState::Cancelled,
        }
    }

    fn set_state(&self, state: SessionState) {
        let raw = match state {
            SessionState::Pending => STATE_PENDING,
            SessionState::Running => STATE_RUNNING,
            SessionState::Completed => STATE_COMPLETED,
            SessionState::Cancelled => STATE_CANCELLED,
        };
        self.state.store(raw, Ordering::SeqCst);
    }
}

/// One query's worth of polling state.
pub(crate) struct SearchSession {
    handle: Arc<SessionHandle>,
    index: TextIndex,
    query: String,
    options: SearchOptions,
    ids: Vec<DocumentId>,
    scores: Vec<f32>,
    progress: Option<ProgressHandler>,
    completion: Option<CompletionHandler>,
}

impl SearchSession {
    pub(crate) fn new(
        handle: Arc<SessionHandle>,
        index: TextIndex,
        query: String,
        options: SearchOptions,
        progress: Option<ProgressHandler>,
        completion: Option<CompletionHandler>,
    ) -> Self {
        Self {
            handle,
            index,
            query,
            options,
            ids: Vec::new(),
            scores: Vec::new(),
            progress,
            completion,
        }
    }

    /// Execute the session to completion: begin the engine search, poll in
    /// batches, then fire the completion callback exactly once.
    pub(crate) async fn run(mut self) {
        let id = self.handle.id();
        self.handle.set_state(SessionState::Running);
        debug!(session = %id, query = %self.query, "session running");

        match self.index.begin_search(&self.query, &self.options).await {
            Ok(search) => {
                self.handle.attach_search(Arc::clone(&search));
                self.poll(search).await;
            }
            Err(error) => {
                warn!(session = %id, %error, "failed to start engine search");
            }
        }

        self.finish();
    }

    async fn poll(&mut self, search: Arc<dyn EngineSearch>) {
        let mut more = true;
        // Cancellation is only observed here, between batches; an in-flight
        // fetch runs to completion.
        while more && !self.handle.is_cancelled() {
            let batch = match search.fetch_matches(BATCH_LIMIT, BATCH_WAIT).await {
                Ok(batch) => batch,
                Err(error) => {
                    warn!(session = %self.handle.id(), %error, "match fetch failed; ending session");
                    return;
                }
            };

            more = batch.more;
            self.ids.extend(batch.ids);
            self.scores.extend(batch.scores);

            if let Some(progress) = self.progress.as_mut() {
                progress(SearchResultSet::new(
                    self.index.clone(),
                    self.ids.clone(),
                    self.scores.clone(),
                ));
            }
        }
    }

    fn finish(mut self) {
        let state = if self.handle.is_cancelled() {
            SessionState::Cancelled
        } else {
            SessionState::Completed
        };
        self.handle.set_state(state);
        debug!(
            session = %self.handle.id(),
            matches = self.ids.len(),
            state = ?state,
            "session finished"
        );

        if let Some(completion) = self.completion.take() {
            completion(SearchResultSet::new(
                self.index.clone(),
                std::mem::take(&mut self.ids),
                std::mem::take(&mut self.scores),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ScriptedEngine;
    use std::sync::atomic::Ordering as AtomicOrdering;

    #[tokio::test]
    async fn test_cancel_before_attach_still_notifies_engine() {
        let engine = ScriptedEngine::new();
        let index = crate::TextIndex::create(
            &engine,
            &findex_types::StorageTarget::Memory,
            &crate::IndexConfig::default(),
        )
        .await
        .unwrap();

        let handle = SessionHandle::new(SessionId::new(1));
        handle.cancel();
        assert!(handle.is_cancelled());

        let search = index
            .begin_search("anything", &SearchOptions::default())
            .await
            .unwrap();
        handle.attach_search(search);
        assert_eq!(
            engine.index().cancel_calls.load(AtomicOrdering::SeqCst),
            1
        );
    }

    #[test]
    fn test_handle_state_transitions() {
        let handle = SessionHandle::new(SessionId::new(1));
        assert_eq!(handle.state(), SessionState::Pending);
        handle.set_state(SessionState::Running);
        assert_eq!(handle.state(), SessionState::Running);
        handle.set_state(SessionState::Cancelled);
        assert_eq!(handle.state(), SessionState::Cancelled);
    }
}
