use anyhow::{Context, Result};
use serde::Serialize;
use sitesearch_core::persist::IndexPaths;
use sitesearch_core::SearchIndex;
use std::fs;

/// Script assigning the index to the `jssearch` object of the browser client.
pub fn render_script<M: Serialize>(search_index: &SearchIndex<M>) -> Result<String> {
    let index = serde_json::to_string(&search_index.index)?;
    let files = serde_json::to_string(&search_index.documents)?;
    Ok(format!(
        "jssearch.index = {index};\njssearch.files = {files};\njssearch.tokenizeString = {};\n",
        search_index.normalization_descriptor
    ))
}

pub fn write_script<M: Serialize>(paths: &IndexPaths, search_index: &SearchIndex<M>) -> Result<()> {
    fs::create_dir_all(&paths.root)?;
    let file = paths.script();
    fs::write(&file, render_script(search_index)?)
        .with_context(|| format!("writing {}", file.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitesearch_core::{Indexer, RawDocument};
    use crate::site::SiteMetadataExtractor;

    #[test]
    fn script_assigns_three_values() {
        let mut indexer = Indexer::new();
        indexer
            .index_documents(
                [RawDocument::new("/site/a.html", "<h1>Rust</h1>")],
                &SiteMetadataExtractor::new("/site", ""),
            )
            .unwrap();
        let script = render_script(&indexer.into_search_index()).unwrap();

        let lines: Vec<&str> = script.lines().collect();
        assert_eq!(lines[0], r#"jssearch.index = {"rust":[{"f":1,"w":3.0}]};"#);
        assert_eq!(
            lines[1],
            r#"jssearch.files = {"1":{"url":"/a.html","title":"Rust","category":"Page","excerpt":""}};"#
        );
        assert!(lines[2].starts_with("jssearch.tokenizeString = function(string) {"));
        assert!(script.trim_end().ends_with("};"));
    }
}
