use anyhow::{Context, Result};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

/// Something the indexer can read content from.
pub trait DocumentSource {
    /// Origin of the document, used for metadata and error reports.
    fn path(&self) -> &Path;

    fn load(&self) -> Result<Cow<'_, str>>;
}

/// A document whose content is already in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub path: PathBuf,
    pub content: String,
}

impl RawDocument {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self { path: path.into(), content: content.into() }
    }
}

impl DocumentSource for RawDocument {
    fn path(&self) -> &Path { &self.path }

    fn load(&self) -> Result<Cow<'_, str>> {
        Ok(Cow::Borrowed(&self.content))
    }
}

/// Files are read on demand; bytes that are not UTF-8 are replaced, not rejected.
impl DocumentSource for Path {
    fn path(&self) -> &Path { self }

    fn load(&self) -> Result<Cow<'_, str>> {
        let bytes = fs::read(self).with_context(|| format!("reading {}", self.display()))?;
        Ok(Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

impl DocumentSource for PathBuf {
    fn path(&self) -> &Path { self }

    fn load(&self) -> Result<Cow<'_, str>> {
        self.as_path().load()
    }
}

impl<T: DocumentSource + ?Sized> DocumentSource for &T {
    fn path(&self) -> &Path { (**self).path() }

    fn load(&self) -> Result<Cow<'_, str>> {
        (**self).load()
    }
}

/// Produces the metadata record stored for each indexed document.
///
/// The indexer never looks inside the record; it keys it by document id and hands
/// it to the serializer unchanged.
pub trait MetadataExtractor {
    type Metadata;

    fn extract(&self, path: &Path, content: &str) -> Result<Self::Metadata>;
}
