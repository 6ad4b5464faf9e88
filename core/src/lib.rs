//! Build a static, browser-side full-text search index.
//!
//! Documents are split into weighted zones by an [`Analyzer`], the zone text is
//! turned into tokens by a [`Tokenizer`], and the [`Indexer`] folds every token
//! occurrence into an [`InvertedIndex`]. Weights of repeated occurrences within a
//! document multiply. The finished [`SearchIndex`] holds the index, the document
//! metadata and a JavaScript description of the tokenizer for query-time use.

pub mod analyzer;
pub mod document;
pub mod error;
mod index;
pub mod indexer;
pub mod persist;
pub mod tokenizer;

pub use analyzer::{
    Analyzer, HtmlAnalyzer, MarkdownAnalyzer, PlainTextAnalyzer, Region, WeightedToken, ZoneRule,
};
pub use document::{DocumentSource, MetadataExtractor, RawDocument};
pub use error::{ConfigError, IndexError, Stage};
pub use index::*;
pub use indexer::Indexer;
pub use tokenizer::{NgramTokenizer, StandardTokenizer, Tokenizer};
