use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub type DocId = u32;
pub type Weight = f64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    #[serde(rename = "f")]
    pub doc_id: DocId,
    /// Product of the weights of every occurrence of the token in the document.
    #[serde(rename = "w")]
    pub weight: Weight,
}

/// Token to postings, each list in ascending document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvertedIndex {
    postings: BTreeMap<String, Vec<Posting>>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn postings(&self, token: &str) -> Option<&[Posting]> {
        self.postings.get(token).map(Vec::as_slice)
    }

    /// Combined weight of `token` in `doc_id`, if the token occurs there.
    pub fn weight(&self, token: &str, doc_id: DocId) -> Option<Weight> {
        self.postings(token)?
            .iter()
            .find(|p| p.doc_id == doc_id)
            .map(|p| p.weight)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> + '_ {
        self.postings.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Posting])> + '_ {
        self.postings.iter().map(|(t, p)| (t.as_str(), p.as_slice()))
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize { self.postings.len() }

    pub fn is_empty(&self) -> bool { self.postings.is_empty() }

    pub fn num_postings(&self) -> usize {
        self.postings.values().map(Vec::len).sum()
    }

    /// Append one posting per token of a finished document.
    ///
    /// Callers index documents in ascending id order, so appending keeps every
    /// list sorted and free of duplicate ids.
    pub(crate) fn commit_document(&mut self, doc_id: DocId, scratch: DocumentTerms) {
        for (token, weight) in scratch.weights {
            self.postings.entry(token).or_default().push(Posting { doc_id, weight });
        }
    }
}

#[cfg(test)]
impl InvertedIndex {
    pub(crate) fn push_unchecked(&mut self, token: &str, posting: Posting) {
        self.postings.entry(token.to_owned()).or_default().push(posting);
    }
}

/// Per-document accumulation of token weights, discarded once committed.
#[derive(Debug, Default)]
pub(crate) struct DocumentTerms {
    weights: HashMap<String, Weight>,
}

impl DocumentTerms {
    pub(crate) fn new() -> Self { Self::default() }

    /// Occurrences combine multiplicatively, repeats in the same zone included.
    ///
    /// The product saturates at `f64::MAX`; JSON has no infinity.
    pub(crate) fn add(&mut self, token: String, weight: Weight) {
        self.weights
            .entry(token)
            .and_modify(|w| *w = (*w * weight).min(Weight::MAX))
            .or_insert(weight.min(Weight::MAX));
    }

    pub(crate) fn len(&self) -> usize { self.weights.len() }
}

/// The three values handed to a serializer at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndex<M> {
    pub index: InvertedIndex,
    pub documents: BTreeMap<DocId, M>,
    pub normalization_descriptor: String,
}
