use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use sitesearch_core::MetadataExtractor;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

pub const NO_TITLE: &str = "<i>No title</i>";
pub const DEFAULT_CATEGORY: &str = "Page";

/// Top-level section to label, used unless overridden.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("blogs", "Blog Post"),
    ("product-cat", "Solution Category"),
    ("products", "Solution"),
    ("services", "Service"),
    ("press-releases", "News Article"),
    ("jobs", "Job"),
];

lazy_static! {
    static ref H1: Selector = Selector::parse("h1").expect("valid selector");
    static ref TITLE: Selector = Selector::parse("title").expect("valid selector");
    static ref EXCERPT: Selector = Selector::parse("div.excerpt").expect("valid selector");
    static ref MD_TITLE: Regex =
        Regex::new(r"(?m)^#[ \t]+(.+?)[ \t]*#*[ \t]*$").expect("valid regex");
}

/// What the search page shows for a hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteMetadata {
    pub url: String,
    pub title: String,
    pub category: String,
    pub excerpt: String,
}

pub struct SiteMetadataExtractor {
    base_path: PathBuf,
    base_url: String,
    categories: HashMap<String, String>,
}

impl SiteMetadataExtractor {
    pub fn new(base_path: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            base_path: base_path.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|(key, label)| (key.to_string(), label.to_string()))
                .collect(),
        }
    }

    /// Map the first path segment below the site root to a category label. Entries
    /// replace defaults with the same key.
    pub fn with_categories<I>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.categories.extend(categories);
        self
    }

    fn segments(&self, path: &Path) -> Vec<String> {
        let relative = path.strip_prefix(&self.base_path).unwrap_or(path);
        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect()
    }

    fn category(&self, segments: &[String]) -> String {
        segments
            .first()
            .and_then(|first| self.categories.get(first))
            .cloned()
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

fn html_title(document: &Html) -> Option<String> {
    first_text(document, &H1).or_else(|| {
        first_text(document, &TITLE).map(|t| t.split(" | ").next().unwrap_or_default().to_string())
    })
}

fn is_markdown(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase).as_deref(),
        Some("md" | "markdown")
    )
}

impl MetadataExtractor for SiteMetadataExtractor {
    type Metadata = SiteMetadata;

    fn extract(&self, path: &Path, content: &str) -> Result<SiteMetadata> {
        let segments = self.segments(path);
        let url = format!("{}/{}", self.base_url, segments.join("/"));
        let category = self.category(&segments);

        let (title, excerpt) = if is_markdown(path) {
            let title = MD_TITLE.captures(content).map(|c| collapse_whitespace(&c[1]));
            (title, None)
        } else {
            let document = Html::parse_document(content);
            (html_title(&document), first_text(&document, &EXCERPT))
        };

        Ok(SiteMetadata {
            url,
            title: title.unwrap_or_else(|| NO_TITLE.to_string()),
            category,
            excerpt: excerpt.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> SiteMetadataExtractor {
        SiteMetadataExtractor::new("/site", "https://example.com/")
    }

    #[test]
    fn h1_wins_over_title() {
        let html = "<title>Page | Site</title><h1>Heading <b>One</b></h1>";
        let meta = extractor().extract(Path::new("/site/blogs/post.html"), html).unwrap();
        assert_eq!(meta.title, "Heading One");
        assert_eq!(meta.url, "https://example.com/blogs/post.html");
        assert_eq!(meta.category, "Blog Post");
    }

    #[test]
    fn title_is_cut_at_site_name() {
        let html =
            "<title>Pricing | Example</title><div class=\"excerpt\">\n  Plans and   prices\n</div>";
        let meta = extractor().extract(Path::new("/site/pricing.html"), html).unwrap();
        assert_eq!(meta.title, "Pricing");
        assert_eq!(meta.excerpt, "Plans and prices");
        assert_eq!(meta.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn untitled_pages() {
        let meta = extractor().extract(Path::new("/site/misc/x.html"), "<p>text</p>").unwrap();
        assert_eq!(meta.title, NO_TITLE);
        assert_eq!(meta.excerpt, "");
        assert_eq!(meta.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn markdown_titles() {
        let md = "intro\n# Getting started #\n## Next\n";
        let meta = extractor().extract(Path::new("/site/docs/start.md"), md).unwrap();
        assert_eq!(meta.title, "Getting started");
    }

    #[test]
    fn paths_outside_the_root_are_used_as_is() {
        let meta = SiteMetadataExtractor::new("/site", "")
            .extract(Path::new("other/page.html"), "")
            .unwrap();
        assert_eq!(meta.url, "/other/page.html");
    }

    #[test]
    fn sections_have_default_categories_that_flags_override() {
        let page = Path::new("/site/press-releases/launch.html");
        assert_eq!(extractor().extract(page, "").unwrap().category, "News Article");
        assert_eq!(
            extractor().extract(Path::new("/site/product-cat/a.html"), "").unwrap().category,
            "Solution Category"
        );

        let custom = extractor().with_categories([
            ("press-releases".to_string(), "Press".to_string()),
            ("docs".to_string(), "Guide".to_string()),
        ]);
        assert_eq!(custom.extract(page, "").unwrap().category, "Press");
        assert_eq!(custom.extract(Path::new("/site/docs/a.md"), "").unwrap().category, "Guide");
        assert_eq!(custom.extract(Path::new("/site/jobs/a.html"), "").unwrap().category, "Job");
    }
}
