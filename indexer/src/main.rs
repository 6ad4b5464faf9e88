mod export;
mod site;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sitesearch_core::persist::{load_index, save_index, save_meta, IndexPaths, MetaFile};
use sitesearch_core::{
    Analyzer, HtmlAnalyzer, Indexer, MarkdownAnalyzer, NgramTokenizer, PlainTextAnalyzer,
    StandardTokenizer, Tokenizer,
};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::path::{Path, PathBuf};

use crate::export::write_script;
use crate::site::{SiteMetadata, SiteMetadataExtractor};

#[derive(Parser)]
#[command(name = "sitesearch-indexer")]
#[command(about = "Build a client-side search index for a static site", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index every page below a directory
    Build {
        /// Site root to scan
        #[arg(long)]
        input: PathBuf,
        /// Output directory for index.json, meta.json and search-index.js
        #[arg(long, default_value = "./search-index")]
        output: PathBuf,
        /// Prefix for document URLs
        #[arg(long, default_value = "")]
        base_url: String,
        #[arg(long, value_enum, default_value_t = AnalyzerKind::Html)]
        analyzer: AnalyzerKind,
        #[arg(long, value_enum, default_value_t = TokenizerKind::Standard)]
        tokenizer: TokenizerKind,
        /// Drop tokens shorter than this (standard tokenizer)
        #[arg(long, default_value_t = 1)]
        min_token_length: usize,
        /// Gram size (ngram tokenizer)
        #[arg(long, default_value_t = 3)]
        ngram_size: usize,
        /// File extensions to index; defaults depend on the analyzer
        #[arg(long = "ext")]
        extensions: Vec<String>,
        /// Category label for a top-level directory, as KEY=LABEL; overrides the
        /// built-in labels for blogs, products, services, press-releases and jobs
        #[arg(long = "category", value_parser = parse_category)]
        categories: Vec<(String, String)>,
        /// Add to the index already in the output directory
        #[arg(long, default_value_t = false)]
        append: bool,
        /// Do not write search-index.js
        #[arg(long, default_value_t = false)]
        no_js: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AnalyzerKind {
    Html,
    Markdown,
    Text,
}

impl AnalyzerKind {
    fn build(self) -> Box<dyn Analyzer> {
        match self {
            AnalyzerKind::Html => Box::new(HtmlAnalyzer::new()),
            AnalyzerKind::Markdown => Box::new(MarkdownAnalyzer::new()),
            AnalyzerKind::Text => Box::new(PlainTextAnalyzer),
        }
    }

    fn default_extensions(self) -> &'static [&'static str] {
        match self {
            AnalyzerKind::Html => &["html", "htm"],
            AnalyzerKind::Markdown => &["md", "markdown"],
            AnalyzerKind::Text => &["txt"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TokenizerKind {
    Standard,
    Ngram,
}

fn parse_category(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, label)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), label.trim().to_string()))
        }
        _ => Err(format!("expected KEY=LABEL, got {s:?}")),
    }
}

struct BuildOptions {
    input: PathBuf,
    output: PathBuf,
    base_url: String,
    analyzer: AnalyzerKind,
    tokenizer: Box<dyn Tokenizer>,
    extensions: Vec<String>,
    categories: Vec<(String, String)>,
    append: bool,
    write_js: bool,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            output,
            base_url,
            analyzer,
            tokenizer,
            min_token_length,
            ngram_size,
            extensions,
            categories,
            append,
            no_js,
        } => {
            let tokenizer: Box<dyn Tokenizer> = match tokenizer {
                TokenizerKind::Standard => {
                    Box::new(StandardTokenizer::with_min_length(min_token_length)?)
                }
                TokenizerKind::Ngram => Box::new(NgramTokenizer::new(ngram_size)?),
            };
            build_index(BuildOptions {
                input,
                output,
                base_url,
                analyzer,
                tokenizer,
                extensions,
                categories,
                append,
                write_js: !no_js,
            })
        }
    }
}

fn collect_files(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|s| s.to_str())
                .map(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
                .unwrap_or(false)
        })
        .collect()
}

fn build_index(opts: BuildOptions) -> Result<()> {
    if !opts.input.is_dir() {
        bail!("input {} is not a directory", opts.input.display());
    }
    let out_paths = IndexPaths::new(&opts.output);

    let extensions: Vec<String> = if opts.extensions.is_empty() {
        opts.analyzer.default_extensions().iter().map(|s| s.to_string()).collect()
    } else {
        opts.extensions.iter().map(|s| s.trim_start_matches('.').to_string()).collect()
    };
    let files = collect_files(&opts.input, &extensions);
    tracing::info!(files = files.len(), input = %opts.input.display(), "collected documents");

    let mut indexer: Indexer<SiteMetadata> = if opts.append && out_paths.index().is_file() {
        Indexer::resume(load_index(&out_paths)?)?
    } else {
        if opts.append {
            tracing::info!(output = %opts.output.display(), "no existing index, starting fresh");
        }
        Indexer::new()
    };
    indexer.set_tokenizer(opts.tokenizer);
    indexer.set_analyzer(opts.analyzer.build());

    let extractor =
        SiteMetadataExtractor::new(&opts.input, &opts.base_url).with_categories(opts.categories);
    indexer
        .index_documents(&files, &extractor)
        .with_context(|| format!("indexing {}", opts.input.display()))?;

    let search_index = indexer.into_search_index();
    save_index(&out_paths, &search_index)?;
    save_meta(&out_paths, &MetaFile::describe(&search_index))?;
    if opts.write_js {
        write_script(&out_paths, &search_index)?;
    }

    tracing::info!(
        output = %opts.output.display(),
        documents = search_index.documents.len(),
        tokens = search_index.index.len(),
        "index build complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitesearch_core::SearchIndex;
    use std::fs;
    use tempfile::tempdir;

    fn options(input: &Path, output: &Path) -> BuildOptions {
        BuildOptions {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            base_url: "/docs".into(),
            analyzer: AnalyzerKind::Html,
            tokenizer: Box::new(StandardTokenizer::new()),
            extensions: Vec::new(),
            categories: Vec::new(),
            append: false,
            write_js: true,
        }
    }

    fn write_site(root: &Path) {
        fs::create_dir_all(root.join("blogs")).unwrap();
        let home = "<title>Home | Site</title><p>welcome home</p>";
        fs::write(root.join("index.html"), home).unwrap();
        fs::write(root.join("blogs/first.html"), "<h1>First post</h1><p>hello blog</p>").unwrap();
        fs::write(root.join("notes.txt"), "not indexed").unwrap();
    }

    #[test]
    fn categories_parse() {
        assert_eq!(parse_category("blogs=Blog Post"), Ok(("blogs".into(), "Blog Post".into())));
        assert!(parse_category("no-separator").is_err());
        assert!(parse_category("=Label").is_err());
    }

    #[test]
    fn files_are_filtered_and_sorted() {
        let dir = tempdir().unwrap();
        write_site(dir.path());
        let files = collect_files(dir.path(), &["HTML".to_string()]);
        let names: Vec<PathBuf> =
            files.iter().map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf()).collect();
        assert_eq!(names, vec![PathBuf::from("blogs/first.html"), PathBuf::from("index.html")]);
    }

    #[test]
    fn builds_and_appends() {
        let site = tempdir().unwrap();
        let out = tempdir().unwrap();
        write_site(site.path());

        build_index(options(site.path(), out.path())).unwrap();
        let paths = IndexPaths::new(out.path());
        let built: SearchIndex<SiteMetadata> = load_index(&paths).unwrap();
        assert_eq!(built.documents.len(), 2);
        assert_eq!(built.documents[&1].url, "/docs/blogs/first.html");
        assert_eq!(built.documents[&1].category, "Blog Post");
        assert_eq!(built.documents[&2].title, "Home");
        assert_eq!(built.index.weight("home", 2), Some(5.0));
        assert!(paths.script().is_file());
        assert!(paths.meta().is_file());

        let mut again = options(site.path(), out.path());
        again.append = true;
        build_index(again).unwrap();
        let appended: SearchIndex<SiteMetadata> = load_index(&paths).unwrap();
        assert_eq!(appended.documents.len(), 4);
        let ids: Vec<u32> =
            appended.index.postings("hello").unwrap().iter().map(|p| p.doc_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn missing_input_is_an_error() {
        let out = tempdir().unwrap();
        let err = build_index(options(&out.path().join("nope"), out.path())).unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
    }
}
