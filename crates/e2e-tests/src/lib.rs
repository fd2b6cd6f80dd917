//! End-to-end test infrastructure for findex.
//!
//! Provides a shared harness over the embedded Tantivy engine, a corpus
//! with a known term distribution, and helpers for driving search
//! sessions to completion.

use std::sync::Once;

use tokio::sync::oneshot;
use url::Url;

use findex_engine::TantivyEngine;
use findex_search::{IndexConfig, SearchResultSet, SearchSessionManager, TextIndex};
use findex_types::{DocumentRef, SearchOptions, StorageTarget};

static INIT_TRACING: Once = Once::new();

/// Install the test tracing subscriber once, honoring `RUST_LOG`.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Shared harness: an embedded engine and one in-memory index.
pub struct TestHarness {
    /// Keeps temp dir alive for tests indexing documents from disk
    pub _temp_dir: tempfile::TempDir,
    pub engine: TantivyEngine,
    pub index: TextIndex,
}

impl TestHarness {
    pub async fn new() -> Self {
        init_tracing();
        let temp_dir = tempfile::TempDir::new().expect("failed to create temp dir");
        let engine = TantivyEngine::new();
        let index =
            TextIndex::open_or_create(&engine, &StorageTarget::Memory, &IndexConfig::default())
                .await
                .expect("failed to build test index");

        Self {
            _temp_dir: temp_dir,
            engine,
            index,
        }
    }

    /// Index the full sample corpus and flush.
    pub async fn index_corpus(&self) {
        for (document, text) in sample_corpus() {
            self.index
                .add_text(&document, &text, true)
                .await
                .expect("failed to index corpus document");
        }
        self.index.flush().await.expect("failed to flush corpus");
    }
}

/// Document handle for the `i`-th corpus entry.
pub fn corpus_doc(i: usize) -> DocumentRef {
    DocumentRef::new(Url::parse(&format!("mem://harbor/log/{i}")).unwrap())
}

/// 30 documents with a known term distribution:
/// - "first" appears in documents 1..=28
/// - "hackers" appears only in document 29
/// - words starting with "elephant" appear in documents 28 and 30
pub fn sample_corpus() -> Vec<(DocumentRef, String)> {
    let mut corpus = Vec::with_capacity(30);
    for i in 1..=28 {
        let mut text = format!(
            "Log entry {i}: the first watch of the night passed quietly over the harbor."
        );
        if i == 28 {
            text.push_str(" An elephantine silhouette drifted between the cranes.");
        }
        corpus.push((corpus_doc(i), text));
    }
    corpus.push((
        corpus_doc(29),
        "Midnight shift: hackers probed the harbor master's terminal.".to_string(),
    ));
    corpus.push((
        corpus_doc(30),
        "Two elephants escaped the quayside circus before dawn.".to_string(),
    ));
    corpus
}

/// Start a search and wait for its completion callback.
pub async fn run_search(
    manager: &SearchSessionManager,
    query: &str,
    options: SearchOptions,
) -> SearchResultSet {
    let (tx, rx) = oneshot::channel();
    manager.start(
        query,
        options,
        None,
        Some(Box::new(move |results| {
            let _ = tx.send(results);
        })),
    );
    rx.await.expect("completion callback never fired")
}
