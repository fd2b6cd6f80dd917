//! Engine match batches.

use crate::DocumentId;

/// One bounded fetch of matches from a running engine search.
///
/// `ids` and `scores` are parallel: `ids[i]` scored `scores[i]`. `more`
/// reports whether further matches may remain; a batch with zero matches
/// and `more = true` is valid (sparse enumeration) and callers should
/// simply fetch again.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchBatch {
    pub ids: Vec<DocumentId>,
    pub scores: Vec<f32>,
    pub more: bool,
}

impl MatchBatch {
    /// A terminal batch carrying no matches.
    pub fn exhausted() -> Self {
        Self::default()
    }

    /// Number of matches found in this batch.
    pub fn found(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_batch() {
        let batch = MatchBatch::exhausted();
        assert_eq!(batch.found(), 0);
        assert!(batch.is_empty());
        assert!(!batch.more);
    }
}
