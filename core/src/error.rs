use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::DocId;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which collaborator call failed for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Metadata,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Load => f.write_str("loading content"),
            Stage::Metadata => f.write_str("extracting metadata"),
        }
    }
}

#[derive(Debug, Error)]
pub enum IndexError {
    /// A document source or metadata extractor failed; the batch stops here.
    #[error("{stage} failed for {}", path.display())]
    Collaborator {
        path: PathBuf,
        stage: Stage,
        #[source]
        source: BoxError,
    },

    /// A previously serialized index does not satisfy the index invariants.
    #[error("inconsistent index: {0}")]
    Inconsistent(String),

    #[error("posting for token {token:?} refers to unknown document {doc_id}")]
    DanglingPosting { token: String, doc_id: DocId },
}

impl IndexError {
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            IndexError::Collaborator { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Rejected tokenizer or analyzer configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("minimum token length must be at least 1")]
    ZeroMinLength,

    #[error("n-gram size must be at least 1")]
    ZeroNgramSize,

    #[error("zone {zone:?} has invalid selector {selector:?}: {reason}")]
    InvalidSelector {
        zone: String,
        selector: String,
        reason: String,
    },

    #[error("zone {zone:?} has non-positive weight {weight}")]
    InvalidWeight { zone: String, weight: f64 },
}

pub type Result<T> = std::result::Result<T, IndexError>;
