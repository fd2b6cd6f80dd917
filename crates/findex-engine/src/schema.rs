//! Tantivy schema for the embedded engine.
//!
//! Three fields per document:
//! - `doc_id`: the engine-assigned identifier (u64, indexed + stored + fast)
//! - `url`: the source location, the document's identity (raw string, stored)
//! - `content`: the searchable text

use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, FAST, INDEXED, STORED,
    STRING,
};

use findex_types::IndexOptions;

use crate::error::EngineError;

/// Tokenizer name the `content` field is indexed with. The analyzer must be
/// registered on every `Index` instance before indexing or searching.
pub const CONTENT_TOKENIZER: &str = "findex_text";

/// Schema field handles for efficient access.
#[derive(Debug, Clone)]
pub struct IndexSchema {
    schema: Schema,
    /// Engine-assigned document identifier (u64)
    pub doc_id: Field,
    /// Source URL, the document's identity (STRING | STORED)
    pub url: Field,
    /// Searchable text content (TEXT, custom tokenizer)
    pub content: Field,
}

impl IndexSchema {
    /// Get the underlying Tantivy schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Recover field handles from an existing Tantivy schema.
    pub fn from_schema(schema: Schema) -> Result<Self, EngineError> {
        let doc_id = schema
            .get_field("doc_id")
            .map_err(|_| EngineError::SchemaMismatch("missing doc_id field".into()))?;
        let url = schema
            .get_field("url")
            .map_err(|_| EngineError::SchemaMismatch("missing url field".into()))?;
        let content = schema
            .get_field("content")
            .map_err(|_| EngineError::SchemaMismatch("missing content field".into()))?;

        Ok(Self {
            schema,
            doc_id,
            url,
            content,
        })
    }
}

/// Build the index schema.
///
/// Term positions are only indexed when `proximity_indexing` is requested;
/// frequencies are always kept for scoring.
pub fn build_index_schema(options: &IndexOptions) -> IndexSchema {
    let mut schema_builder = Schema::builder();

    let doc_id = schema_builder.add_u64_field("doc_id", INDEXED | STORED | FAST);

    // Source URL doubles as the replacement key (delete_term on re-add)
    let url = schema_builder.add_text_field("url", STRING | STORED);

    let record = if options.proximity_indexing {
        IndexRecordOption::WithFreqsAndPositions
    } else {
        IndexRecordOption::WithFreqs
    };
    let indexing = TextFieldIndexing::default()
        .set_tokenizer(CONTENT_TOKENIZER)
        .set_index_option(record);
    let content =
        schema_builder.add_text_field("content", TextOptions::default().set_indexing_options(indexing));

    let schema = schema_builder.build();

    IndexSchema {
        schema,
        doc_id,
        url,
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_schema() {
        let schema = build_index_schema(&IndexOptions::default());
        assert!(schema.schema.get_field("doc_id").is_ok());
        assert!(schema.schema.get_field("url").is_ok());
        assert!(schema.schema.get_field("content").is_ok());
    }

    #[test]
    fn test_from_schema_roundtrip() {
        let original = build_index_schema(&IndexOptions::default());
        let rebuilt = IndexSchema::from_schema(original.schema().clone()).unwrap();
        assert_eq!(rebuilt.doc_id, original.doc_id);
        assert_eq!(rebuilt.url, original.url);
        assert_eq!(rebuilt.content, original.content);
    }

    #[test]
    fn test_from_schema_rejects_foreign_schema() {
        let schema = Schema::builder().build();
        assert!(matches!(
            IndexSchema::from_schema(schema),
            Err(EngineError::SchemaMismatch(_))
        ));
    }
}
