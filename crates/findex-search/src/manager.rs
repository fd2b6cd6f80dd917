//! Search session manager.
//!
//! Issues session IDs, schedules sessions onto the Tokio runtime, and
//! keeps the table of in-flight sessions for cancel-by-ID. The table is
//! the only shared mutable structure in this layer: `start` inserts,
//! `cancel` reads, and each session's completion wrapper removes its own
//! entry, so every access goes through one mutex.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::debug;

use findex_types::{SearchOptions, SessionId};

use crate::index::TextIndex;
use crate::session::{
    CompletionHandler, ProgressHandler, SearchSession, SessionHandle, SessionState,
};

/// Default bound on sessions polling the engine concurrently.
pub const DEFAULT_MAX_CONCURRENT_SEARCHES: usize = 4;

/// Session manager tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionManagerConfig {
    /// Sessions allowed to poll the engine at the same time; further
    /// sessions stay pending until a slot frees up.
    pub max_concurrent_searches: usize,
}

impl Default for SessionManagerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_searches: DEFAULT_MAX_CONCURRENT_SEARCHES,
        }
    }
}

impl SessionManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_concurrent_searches(mut self, limit: usize) -> Self {
        self.max_concurrent_searches = limit;
        self
    }
}

type SessionTable = Mutex<HashMap<SessionId, Arc<SessionHandle>>>;

fn lock_table(table: &SessionTable) -> MutexGuard<'_, HashMap<SessionId, Arc<SessionHandle>>> {
    // A poisoned table is still structurally sound: every critical section
    // is a plain insert/lookup/remove.
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Starts, tracks, and cancels search sessions against one index.
pub struct SearchSessionManager {
    index: TextIndex,
    next_id: AtomicU64,
    sessions: Arc<SessionTable>,
    permits: Arc<Semaphore>,
}

impl SearchSessionManager {
    pub fn new(index: TextIndex) -> Self {
        Self::with_config(index, SessionManagerConfig::default())
    }

    pub fn with_config(index: TextIndex, config: SessionManagerConfig) -> Self {
        Self {
            index,
            next_id: AtomicU64::new(1),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            permits: Arc::new(Semaphore::new(config.max_concurrent_searches.max(1))),
        }
    }

    /// Start a search and return its ID immediately.
    ///
    /// IDs are strictly increasing from 1 and never reused. The session is
    /// registered before its worker is spawned, so `cancel` with the
    /// returned ID always finds it. Progress and completion callbacks run
    /// on the worker task, never on the caller's; the session's table entry
    /// is removed after the completion callback returns, whether or not one
    /// was supplied. Must be called from within a Tokio runtime.
    pub fn start(
        &self,
        query: impl Into<String>,
        options: SearchOptions,
        progress: Option<ProgressHandler>,
        completion: Option<CompletionHandler>,
    ) -> SessionId {
        let query = query.into();
        let id = SessionId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let handle = Arc::new(SessionHandle::new(id));
        lock_table(&self.sessions).insert(id, Arc::clone(&handle));

        // Table cleanup rides on the completion path unconditionally.
        let sessions = Arc::clone(&self.sessions);
        let wrapped: CompletionHandler = Box::new(move |results| {
            if let Some(handler) = completion {
                handler(results);
            }
            lock_table(&sessions).remove(&id);
            debug!(session = %id, "session removed from table");
        });

        let session = SearchSession::new(
            handle,
            self.index.clone(),
            query,
            options,
            progress,
            Some(wrapped),
        );

        let permits = Arc::clone(&self.permits);
        tokio::spawn(async move {
            // The semaphore is never closed; a failed acquire would only
            // mean running unthrottled.
            let _permit = permits.acquire_owned().await.ok();
            session.run().await;
        });

        debug!(session = %id, "session scheduled");
        id
    }

    /// Cancel the session with this ID: set its cancellation flag and ask
    /// the engine to abort the underlying query.
    ///
    /// Unknown or already-finished IDs are ignored; racing a cancel against
    /// natural completion is expected and harmless.
    pub fn cancel(&self, id: SessionId) {
        let handle = lock_table(&self.sessions).get(&id).cloned();
        match handle {
            Some(handle) => {
                handle.cancel();
                debug!(session = %id, "session cancelled");
            }
            None => {
                debug!(session = %id, "cancel for unknown or finished session; ignoring");
            }
        }
    }

    /// Cancel every currently-registered session. Safe to call while
    /// sessions complete and remove themselves.
    pub fn cancel_all(&self) {
        let handles: Vec<_> = lock_table(&self.sessions).values().cloned().collect();
        let count = handles.len();
        for handle in handles {
            handle.cancel();
        }
        if count > 0 {
            debug!(count, "cancelled all sessions");
        }
    }

    /// Number of sessions currently registered (pending or running).
    pub fn active_sessions(&self) -> usize {
        lock_table(&self.sessions).len()
    }

    /// Whether this ID is still registered.
    pub fn is_active(&self, id: SessionId) -> bool {
        lock_table(&self.sessions).contains_key(&id)
    }

    /// Lifecycle state of a registered session, `None` once it finished
    /// and left the table.
    pub fn session_state(&self, id: SessionId) -> Option<SessionState> {
        lock_table(&self.sessions).get(&id).map(|h| h.state())
    }
}
