use crate::SearchIndex;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_tokens: u32,
    pub created_at: String,
    pub version: u32,
}

impl MetaFile {
    pub fn describe<M>(search_index: &SearchIndex<M>) -> Self {
        Self {
            num_docs: search_index.documents.len() as u32,
            num_tokens: search_index.index.len() as u32,
            created_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_default(),
            version: FORMAT_VERSION,
        }
    }
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn index(&self) -> PathBuf { self.root.join("index.json") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    pub fn script(&self) -> PathBuf { self.root.join("search-index.js") }
}

pub fn save_index<M: Serialize>(paths: &IndexPaths, search_index: &SearchIndex<M>) -> Result<()> {
    create_dir_all(&paths.root)
        .with_context(|| format!("creating {}", paths.root.display()))?;
    let file = paths.index();
    let f = File::create(&file).with_context(|| format!("creating {}", file.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer(&mut w, search_index)?;
    w.flush()?;
    Ok(())
}

pub fn load_index<M: DeserializeOwned>(paths: &IndexPaths) -> Result<SearchIndex<M>> {
    let file = paths.index();
    let f = File::open(&file).with_context(|| format!("opening {}", file.display()))?;
    let search_index = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parsing {}", file.display()))?;
    Ok(search_index)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)
        .with_context(|| format!("creating {}", paths.root.display()))?;
    let file = paths.meta();
    let json = serde_json::to_string_pretty(meta)?;
    fs::write(&file, json).with_context(|| format!("writing {}", file.display()))?;
    Ok(())
}

/// Read `meta.json` back; the file is informational and never needed to resume.
pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let file = paths.meta();
    let json = fs::read_to_string(&file).with_context(|| format!("opening {}", file.display()))?;
    let meta = serde_json::from_str(&json).with_context(|| format!("parsing {}", file.display()))?;
    Ok(meta)
}
