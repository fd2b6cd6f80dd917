//! Index and search configuration.
//!
//! The engine's recognized options are enumerated explicitly with
//! documented defaults; there is no dynamic key/value bag, so unknown
//! options cannot be smuggled in.

use serde::{Deserialize, Serialize};

/// Default memory budget for the engine's index writer (MB).
const DEFAULT_WRITER_MEMORY_MB: usize = 50;

/// The storage/scoring strategy an index uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Strategy left to the engine.
    Unspecified,
    /// Term -> document postings, the usual full-text layout.
    #[default]
    Inverted,
    /// Document -> term vectors.
    Vector,
    /// Both layouts maintained together.
    InvertedVector,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Unspecified => "unspecified",
            IndexKind::Inverted => "inverted",
            IndexKind::Vector => "vector",
            IndexKind::InvertedVector => "inverted_vector",
        }
    }
}

/// Engine options applied at index creation.
///
/// Defaults: 50 MB writer budget, no proximity indexing, no stop words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Memory budget for the engine's writer, in MB.
    #[serde(default = "default_writer_memory_mb")]
    pub writer_memory_mb: usize,
    /// Index term positions so the engine can answer phrase and
    /// proximity queries.
    #[serde(default)]
    pub proximity_indexing: bool,
    /// Terms excluded from indexing. Empty means keep everything.
    #[serde(default)]
    pub stop_words: Vec<String>,
}

fn default_writer_memory_mb() -> usize {
    DEFAULT_WRITER_MEMORY_MB
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexOptions {
    pub fn new() -> Self {
        Self {
            writer_memory_mb: DEFAULT_WRITER_MEMORY_MB,
            proximity_indexing: false,
            stop_words: Vec::new(),
        }
    }

    pub fn with_writer_memory_mb(mut self, mb: usize) -> Self {
        self.writer_memory_mb = mb;
        self
    }

    pub fn with_proximity_indexing(mut self, enabled: bool) -> Self {
        self.proximity_indexing = enabled;
        self
    }

    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(Into::into).collect();
        self
    }
}

/// Per-search behavior toggles.
///
/// All toggles default to off: scored results, whitespace means AND, exact
/// query semantics. `find_similar` treats the query string as example text
/// rather than a boolean query; combining it with `space_means_or` is
/// redundant since similarity search already unions terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Skip relevance scoring; matches carry a uniform placeholder score.
    #[serde(default)]
    pub no_relevance_scores: bool,
    /// Whitespace-separated terms are OR'd instead of AND'd.
    #[serde(default)]
    pub space_means_or: bool,
    /// Treat the query as example text and find similar documents.
    #[serde(default)]
    pub find_similar: bool,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_no_relevance_scores(mut self, enabled: bool) -> Self {
        self.no_relevance_scores = enabled;
        self
    }

    pub fn with_space_means_or(mut self, enabled: bool) -> Self {
        self.space_means_or = enabled;
        self
    }

    pub fn with_find_similar(mut self, enabled: bool) -> Self {
        self.find_similar = enabled;
        self
    }
}
