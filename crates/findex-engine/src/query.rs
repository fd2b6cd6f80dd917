//! Query construction for the embedded engine.
//!
//! Queries are whitespace-split into terms, lowercased to match the
//! content tokenizer. A trailing `*` turns a term into a prefix match;
//! everything else is an exact term. Terms combine with AND by default,
//! with OR when the search options say space means OR, and similarity
//! search treats the whole query as example text (all terms OR'd).

use tantivy::query::{BooleanQuery, Occur, Query, RegexQuery, TermQuery};
use tantivy::schema::IndexRecordOption;
use tantivy::Term;

use findex_types::SearchOptions;

use crate::error::EngineError;
use crate::schema::IndexSchema;

/// Build a Tantivy query for the given query string and options.
///
/// An all-whitespace query yields a query matching nothing.
pub fn build_query(
    schema: &IndexSchema,
    query: &str,
    options: &SearchOptions,
) -> Result<Box<dyn Query>, EngineError> {
    let occur = if options.space_means_or || options.find_similar {
        Occur::Should
    } else {
        Occur::Must
    };

    let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
    for raw in query.split_whitespace() {
        let term = raw.to_lowercase();
        if let Some(prefix) = term.strip_suffix('*') {
            let prefix = sanitize_prefix(prefix);
            if prefix.is_empty() {
                continue;
            }
            // The prefix is interpolated into a regex pattern, so it is
            // restricted to alphanumerics.
            let pattern = format!("{prefix}.*");
            let regex = RegexQuery::from_pattern(&pattern, schema.content)?;
            clauses.push((occur, Box::new(regex)));
        } else {
            let term = Term::from_field_text(schema.content, &term);
            clauses.push((occur, Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs))));
        }
    }

    Ok(Box::new(BooleanQuery::new(clauses)))
}

fn sanitize_prefix(raw: &str) -> String {
    raw.chars().filter(|c| c.is_alphanumeric()).collect()
}
