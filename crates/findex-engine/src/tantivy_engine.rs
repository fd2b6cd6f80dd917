//! Embedded Tantivy engine.
//!
//! Implements the engine boundary with a Tantivy inverted index. Storage is
//! either in-memory or an mmap-backed directory; writes go through a single
//! writer guarded by a mutex; searches run against a point-in-time searcher
//! snapshot, so they are safe concurrent with flushes.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tantivy::collector::TopDocs;
use tantivy::query::Query;
use tantivy::schema::Value;
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer};
use tantivy::{
    doc, DocAddress, Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, TantivyDocument,
    Term,
};
use tracing::{debug, info, warn};
use url::Url;

use findex_types::{
    DocumentId, DocumentRef, IndexKind, IndexOptions, MatchBatch, SearchOptions, StorageTarget,
};

use crate::contracts::{EngineIndex, EngineSearch, SearchEngine};
use crate::error::EngineError;
use crate::query::build_query;
use crate::registry::DocumentRegistry;
use crate::schema::{build_index_schema, IndexSchema, CONTENT_TOKENIZER};

/// Sidecar file persisting the creation-time options of a durable index,
/// so reopening restores the same tokenizer configuration.
const OPTIONS_FILE: &str = "findex_options.json";

/// The embedded engine. Stateless; all state lives in the index instances
/// it hands out.
#[derive(Debug, Default)]
pub struct TantivyEngine;

impl TantivyEngine {
    pub fn new() -> Self {
        Self
    }
}

fn index_dir(root: &Path, name: Option<&str>) -> PathBuf {
    match name {
        Some(name) => root.join(name),
        None => root.to_path_buf(),
    }
}

/// Register the content analyzer on an index instance. Tantivy persists
/// the tokenizer *name* in the schema but not the analyzer itself, so this
/// must run on every open or create.
fn register_tokenizer(index: &Index, stop_words: &[String]) {
    let analyzer = if stop_words.is_empty() {
        TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(LowerCaser)
            .build()
    } else {
        TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(LowerCaser)
            .filter(StopWordFilter::remove(stop_words.to_vec()))
            .build()
    };
    index.tokenizers().register(CONTENT_TOKENIZER, analyzer);
}

#[async_trait]
impl SearchEngine for TantivyEngine {
    async fn create_index(
        &self,
        target: &StorageTarget,
        name: Option<&str>,
        kind: IndexKind,
        options: &IndexOptions,
    ) -> Result<Arc<dyn EngineIndex>, EngineError> {
        if matches!(kind, IndexKind::Vector | IndexKind::InvertedVector) {
            debug!(kind = kind.as_str(), "vector scoring unavailable; using the inverted index");
        }

        let schema = build_index_schema(options);
        let index = match target {
            StorageTarget::Memory => Index::create_in_ram(schema.schema().clone()),
            StorageTarget::Directory(root) => {
                let path = index_dir(root, name);
                tokio::fs::create_dir_all(&path).await?;
                let serialized = serde_json::to_string_pretty(options)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
                tokio::fs::write(path.join(OPTIONS_FILE), serialized).await?;
                Index::create_in_dir(&path, schema.schema().clone())?
            }
        };

        info!(kind = kind.as_str(), name, "created index");
        let built = TantivyIndex::from_parts(index, schema, options, false)?;
        Ok(built)
    }

    async fn open_index(
        &self,
        target: &StorageTarget,
        name: Option<&str>,
    ) -> Result<Arc<dyn EngineIndex>, EngineError> {
        let root = match target {
            StorageTarget::Memory => {
                return Err(EngineError::OpenFailed(
                    "in-memory indexes always start empty".into(),
                ));
            }
            StorageTarget::Directory(root) => root,
        };

        let path = index_dir(root, name);
        if !path.join("meta.json").exists() {
            return Err(EngineError::OpenFailed(format!(
                "no index at {}",
                path.display()
            )));
        }

        let options = match tokio::fs::read_to_string(path.join(OPTIONS_FILE)).await {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                debug!(error = %e, "unreadable options sidecar; using defaults");
                IndexOptions::default()
            }),
            Err(_) => IndexOptions::default(),
        };

        let index = Index::open_in_dir(&path)?;
        let schema = IndexSchema::from_schema(index.schema())?;

        info!(path = %path.display(), "opened existing index");
        let opened = TantivyIndex::from_parts(index, schema, &options, true)?;
        Ok(opened)
    }
}

/// One Tantivy index instance behind the engine boundary.
pub struct TantivyIndex {
    schema: IndexSchema,
    writer: Mutex<IndexWriter>,
    reader: IndexReader,
    registry: DocumentRegistry,
}

impl TantivyIndex {
    fn from_parts(
        index: Index,
        schema: IndexSchema,
        options: &IndexOptions,
        hydrate: bool,
    ) -> Result<Arc<Self>, EngineError> {
        register_tokenizer(&index, &options.stop_words);

        let writer = index.writer(options.writer_memory_mb * 1024 * 1024)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        let built = Self {
            schema,
            writer: Mutex::new(writer),
            reader,
            registry: DocumentRegistry::new(),
        };
        if hydrate {
            built.hydrate_registry()?;
        }
        Ok(Arc::new(built))
    }

    /// Rebuild the identifier registry from stored fields after reopening
    /// a durable index.
    fn hydrate_registry(&self) -> Result<(), EngineError> {
        let searcher = self.reader.searcher();
        for (ord, segment) in searcher.segment_readers().iter().enumerate() {
            for doc in segment.doc_ids_alive() {
                let stored: TantivyDocument = searcher.doc(DocAddress::new(ord as u32, doc))?;
                let id = stored
                    .get_first(self.schema.doc_id)
                    .and_then(|v| v.as_u64());
                let source = stored
                    .get_first(self.schema.url)
                    .and_then(|v| v.as_str())
                    .and_then(|s| Url::parse(s).ok());
                match (id, source) {
                    (Some(id), Some(url)) => self.registry.restore(DocumentId::new(id), url),
                    _ => warn!("stored document missing id or url field; skipping"),
                }
            }
        }
        debug!(documents = self.registry.len(), "hydrated document registry");
        Ok(())
    }

    fn index_text(
        &self,
        document: &DocumentRef,
        text: &str,
        replace: bool,
    ) -> Result<(), EngineError> {
        let url = document.url().as_str();
        let existing = self.registry.lookup(document.url());
        if existing.is_some() && !replace {
            debug!(url, "document already indexed; keeping prior content");
            return Ok(());
        }

        let id = self.registry.assign(document.url());
        let writer = self
            .writer
            .lock()
            .map_err(|e| EngineError::WriterLocked(e.to_string()))?;

        if existing.is_some() {
            writer.delete_term(Term::from_field_text(self.schema.url, url));
        }
        writer.add_document(doc!(
            self.schema.doc_id => id.raw(),
            self.schema.url => url,
            self.schema.content => text,
        ))?;

        debug!(url, id = id.raw(), "indexed document");
        Ok(())
    }
}

#[async_trait]
impl EngineIndex for TantivyIndex {
    async fn add_with_text(
        &self,
        document: &DocumentRef,
        text: &str,
        replace: bool,
    ) -> Result<(), EngineError> {
        self.index_text(document, text, replace)
    }

    async fn add_from_source(
        &self,
        document: &DocumentRef,
        mime_hint: Option<&str>,
        replace: bool,
    ) -> Result<(), EngineError> {
        if let Some(hint) = mime_hint {
            if !hint.starts_with("text/") {
                debug!(hint, url = %document.url(), "non-text hint; reading source as plain text");
            }
        }
        let path = document
            .url()
            .to_file_path()
            .map_err(|()| EngineError::UnsupportedSource(document.url().clone()))?;
        let text = tokio::fs::read_to_string(&path).await?;
        self.index_text(document, &text, replace)
    }

    async fn flush(&self) -> Result<(), EngineError> {
        {
            let mut writer = self
                .writer
                .lock()
                .map_err(|e| EngineError::WriterLocked(e.to_string()))?;
            let opstamp = writer.commit()?;
            info!(opstamp, "committed index changes");
        }
        // Reload so document_count and new searches see the commit; flush
        // is the visibility barrier.
        self.reader.reload()?;
        Ok(())
    }

    fn document_count(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    async fn resolve_documents(
        &self,
        ids: &[DocumentId],
    ) -> Result<Vec<Option<DocumentRef>>, EngineError> {
        Ok(ids
            .iter()
            .map(|id| self.registry.url_of(*id).map(DocumentRef::new))
            .collect())
    }

    async fn resolve_urls(&self, ids: &[DocumentId]) -> Result<Vec<Option<Url>>, EngineError> {
        Ok(ids.iter().map(|id| self.registry.url_of(*id)).collect())
    }

    async fn begin_search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Arc<dyn EngineSearch>, EngineError> {
        let parsed = build_query(&self.schema, query, options)?;
        debug!(query, "engine search started");
        Ok(Arc::new(TantivySearch {
            searcher: self.reader.searcher(),
            schema: self.schema.clone(),
            query: parsed,
            uniform_scores: options.no_relevance_scores,
            cancelled: AtomicBool::new(false),
            pending: Mutex::new(None),
        }))
    }
}

/// One running query against a searcher snapshot.
///
/// Matches are enumerated once on the first fetch and served in bounded
/// batches, so the per-fetch wait cap is honored trivially.
struct TantivySearch {
    searcher: Searcher,
    schema: IndexSchema,
    query: Box<dyn Query>,
    uniform_scores: bool,
    cancelled: AtomicBool,
    pending: Mutex<Option<VecDeque<(DocumentId, f32)>>>,
}

impl TantivySearch {
    fn enumerate(&self) -> Result<VecDeque<(DocumentId, f32)>, EngineError> {
        let limit = self.searcher.num_docs().max(1) as usize;
        let hits = self.searcher.search(&self.query, &TopDocs::with_limit(limit))?;

        let mut queue = VecDeque::with_capacity(hits.len());
        for (score, address) in hits {
            let stored: TantivyDocument = self.searcher.doc(address)?;
            let Some(id) = stored
                .get_first(self.schema.doc_id)
                .and_then(|v| v.as_u64())
            else {
                warn!("match without a doc_id field; skipping");
                continue;
            };
            let score = if self.uniform_scores { 1.0 } else { score };
            queue.push_back((DocumentId::new(id), score));
        }
        Ok(queue)
    }
}

#[async_trait]
impl EngineSearch for TantivySearch {
    async fn fetch_matches(
        &self,
        limit: usize,
        _wait: Duration,
    ) -> Result<MatchBatch, EngineError> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Ok(MatchBatch::exhausted());
        }

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.is_none() {
            let enumerated = self.enumerate()?;
            debug!(total = enumerated.len(), "enumerated matches");
            *pending = Some(enumerated);
        }
        let queue = pending.get_or_insert_with(VecDeque::new);

        let take = limit.min(queue.len());
        let mut ids = Vec::with_capacity(take);
        let mut scores = Vec::with_capacity(take);
        for _ in 0..take {
            if let Some((id, score)) = queue.pop_front() {
                ids.push(id);
                scores.push(score);
            }
        }

        Ok(MatchBatch {
            ids,
            scores,
            more: !queue.is_empty(),
        })
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        debug!("engine search cancelled");
    }
}
