use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::analyzer::{Analyzer, HtmlAnalyzer, WeightedToken};
use crate::document::{DocumentSource, MetadataExtractor};
use crate::error::{IndexError, Result, Stage};
use crate::index::{DocumentTerms, InvertedIndex, SearchIndex};
use crate::tokenizer::{StandardTokenizer, Tokenizer};
use crate::DocId;

/// Accumulates documents into an inverted index and a metadata store.
///
/// Documents are numbered from 1 in the order they are indexed; ids keep counting
/// across calls to [`Indexer::index_documents`].
pub struct Indexer<M> {
    tokenizer: Box<dyn Tokenizer>,
    analyzer: Box<dyn Analyzer>,
    index: InvertedIndex,
    documents: BTreeMap<DocId, M>,
    inherited_descriptor: Option<String>,
}

impl<M> Default for Indexer<M> {
    fn default() -> Self { Self::new() }
}

impl<M> Indexer<M> {
    /// Standard tokenizer and HTML analyzer.
    pub fn new() -> Self {
        Self {
            tokenizer: Box::new(StandardTokenizer::new()),
            analyzer: Box::new(HtmlAnalyzer::new()),
            index: InvertedIndex::new(),
            documents: BTreeMap::new(),
            inherited_descriptor: None,
        }
    }

    /// Continue a previously serialized index. New documents get ids after the
    /// existing ones.
    pub fn resume(saved: SearchIndex<M>) -> Result<Self> {
        let SearchIndex { index, documents, normalization_descriptor } = saved;

        for (expected, id) in (1..).zip(documents.keys()) {
            if *id != expected {
                return Err(IndexError::Inconsistent(format!(
                    "document ids must be contiguous from 1: expected {expected}, found {id}"
                )));
            }
        }
        for (token, postings) in index.iter() {
            let mut previous = 0;
            for posting in postings {
                if !documents.contains_key(&posting.doc_id) {
                    return Err(IndexError::DanglingPosting {
                        token: token.to_owned(),
                        doc_id: posting.doc_id,
                    });
                }
                if posting.doc_id <= previous {
                    return Err(IndexError::Inconsistent(format!(
                        "postings for {token:?} are not in ascending document order"
                    )));
                }
                if !(posting.weight.is_finite() && posting.weight > 0.0) {
                    return Err(IndexError::Inconsistent(format!(
                        "posting for {token:?} in document {} has weight {}",
                        posting.doc_id, posting.weight
                    )));
                }
                previous = posting.doc_id;
            }
        }

        info!(documents = documents.len(), tokens = index.len(), "resumed index");
        Ok(Self {
            index,
            documents,
            inherited_descriptor: Some(normalization_descriptor),
            ..Self::new()
        })
    }

    /// Only documents indexed afterwards are affected.
    pub fn set_tokenizer(&mut self, tokenizer: Box<dyn Tokenizer>) {
        self.tokenizer = tokenizer;
    }

    pub fn set_analyzer(&mut self, analyzer: Box<dyn Analyzer>) {
        self.analyzer = analyzer;
    }

    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.set_tokenizer(tokenizer);
        self
    }

    pub fn with_analyzer(mut self, analyzer: Box<dyn Analyzer>) -> Self {
        self.set_analyzer(analyzer);
        self
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer { self.tokenizer.as_ref() }

    pub fn analyzer(&self) -> &dyn Analyzer { self.analyzer.as_ref() }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    pub fn documents(&self) -> &BTreeMap<DocId, M> { &self.documents }

    pub fn next_doc_id(&self) -> DocId { self.documents.len() as DocId + 1 }

    pub fn normalization_descriptor(&self) -> String {
        self.tokenizer.describe_normalization()
    }

    /// Index a batch in order and return how many documents were added.
    ///
    /// A failing document source or extractor aborts the batch. Documents before
    /// it stay indexed, and the failing document gets no id.
    pub fn index_documents<I, E>(&mut self, documents: I, extractor: &E) -> Result<usize>
    where
        I: IntoIterator,
        I::Item: DocumentSource,
        E: MetadataExtractor<Metadata = M> + ?Sized,
    {
        self.check_descriptor();
        let first_id = self.next_doc_id();
        let mut indexed = 0usize;

        for source in documents {
            let path = source.path();
            let content = source.load().map_err(|e| IndexError::Collaborator {
                path: path.to_path_buf(),
                stage: Stage::Load,
                source: e.into(),
            })?;
            let metadata =
                extractor.extract(path, &content).map_err(|e| IndexError::Collaborator {
                    path: path.to_path_buf(),
                    stage: Stage::Metadata,
                    source: e.into(),
                })?;

            let doc_id = self.next_doc_id();
            self.documents.insert(doc_id, metadata);

            let mut terms = DocumentTerms::new();
            for region in self.analyzer.analyze(&content, self.tokenizer.as_ref()) {
                for WeightedToken { token, weight } in region {
                    terms.add(token, weight);
                }
            }
            debug!(doc_id, path = %path.display(), tokens = terms.len(), "indexed document");
            self.index.commit_document(doc_id, terms);
            indexed += 1;
        }

        info!(
            documents = indexed,
            first_id,
            total_documents = self.documents.len(),
            tokens = self.index.len(),
            tokenizer = self.tokenizer.name(),
            analyzer = self.analyzer.name(),
            "indexed batch"
        );
        Ok(indexed)
    }

    fn check_descriptor(&mut self) {
        if let Some(inherited) = self.inherited_descriptor.take() {
            if inherited != self.normalization_descriptor() {
                warn!(
                    tokenizer = self.tokenizer.name(),
                    "resumed index was built with a different tokenizer; queries may not match older documents"
                );
            }
        }
    }

    pub fn search_index(&self) -> SearchIndex<M>
    where
        M: Clone,
    {
        SearchIndex {
            index: self.index.clone(),
            documents: self.documents.clone(),
            normalization_descriptor: self.normalization_descriptor(),
        }
    }

    pub fn into_search_index(self) -> SearchIndex<M> {
        let normalization_descriptor = self.normalization_descriptor();
        SearchIndex { index: self.index, documents: self.documents, normalization_descriptor }
    }
}
