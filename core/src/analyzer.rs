//! Structural analysis: find the zones of a document and weight their tokens.
//!
//! An analyzer returns one region per zone occurrence it finds, each region holding
//! one [`WeightedToken`] per token occurrence. Nothing is deduplicated here; the
//! indexer combines repeated tokens of a document by multiplying their weights.
//! Zones may overlap (a heading inside a list item, say) and are then reported
//! once per matching rule.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};

use crate::error::ConfigError;
use crate::tokenizer::Tokenizer;
use crate::Weight;

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedToken {
    pub token: String,
    pub weight: Weight,
}

pub type Region = Vec<WeightedToken>;

pub trait Analyzer: Send + Sync {
    fn analyze(&self, content: &str, tokenizer: &dyn Tokenizer) -> Vec<Region>;

    fn name(&self) -> &'static str;
}

fn weighted_region(text: &str, weight: Weight, tokenizer: &dyn Tokenizer) -> Region {
    tokenizer
        .tokenize(text)
        .into_iter()
        .map(|token| WeightedToken { token, weight })
        .collect()
}

fn check_weight(zone: &str, weight: Weight) -> Result<(), ConfigError> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidWeight { zone: zone.to_owned(), weight })
    }
}

/// One HTML zone: every element matching `selector` contributes its text at `weight`.
#[derive(Debug, Clone)]
pub struct ZoneRule {
    name: String,
    selector_source: String,
    selector: Selector,
    weight: Weight,
    truncate_at: Option<String>,
}

impl ZoneRule {
    pub fn new(name: &str, selector: &str, weight: Weight) -> Result<Self, ConfigError> {
        check_weight(name, weight)?;
        let parsed = Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
            zone: name.to_owned(),
            selector: selector.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            name: name.to_owned(),
            selector_source: selector.to_owned(),
            selector: parsed,
            weight,
            truncate_at: None,
        })
    }

    /// Only index the text before the first `separator`, e.g. `"Page | Site"` -> `"Page"`.
    pub fn truncate_at(mut self, separator: &str) -> Self {
        self.truncate_at = Some(separator.to_owned());
        self
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn selector(&self) -> &str { &self.selector_source }

    pub fn weight(&self) -> Weight { self.weight }

    fn zone_text<'a>(&self, text: &'a str) -> &'a str {
        match &self.truncate_at {
            Some(sep) => text.split(sep.as_str()).next().unwrap_or(text),
            None => text,
        }
    }
}

/// Title, headings and body blocks of an HTML page.
#[derive(Debug, Clone)]
pub struct HtmlAnalyzer {
    zones: Vec<ZoneRule>,
}

pub const TITLE_WEIGHT: Weight = 5.0;
pub const HEADING_WEIGHT: Weight = 3.0;
pub const BODY_WEIGHT: Weight = 1.0;

impl HtmlAnalyzer {
    pub fn new() -> Self {
        Self { zones: Self::default_zones() }
    }

    /// Replace the zone rules; they are applied in the given order.
    pub fn with_zones(zones: Vec<ZoneRule>) -> Self {
        Self { zones }
    }

    pub fn zones(&self) -> &[ZoneRule] { &self.zones }

    pub fn default_zones() -> Vec<ZoneRule> {
        vec![
            ZoneRule::new("title", "title", TITLE_WEIGHT)
                .expect("valid selector")
                .truncate_at(" | "),
            ZoneRule::new("heading", "h1, h2, h3, h4, h5, h6", HEADING_WEIGHT)
                .expect("valid selector"),
            ZoneRule::new("body", "p, li, dt, dd, td, th, blockquote, figcaption", BODY_WEIGHT)
                .expect("valid selector"),
        ]
    }
}

impl Default for HtmlAnalyzer {
    fn default() -> Self { Self::new() }
}

impl Analyzer for HtmlAnalyzer {
    fn analyze(&self, content: &str, tokenizer: &dyn Tokenizer) -> Vec<Region> {
        let document = Html::parse_document(content);
        let mut regions = Vec::new();
        for zone in &self.zones {
            for element in document.select(&zone.selector) {
                let text = element.text().collect::<String>();
                let region = weighted_region(zone.zone_text(&text), zone.weight, tokenizer);
                if !region.is_empty() {
                    regions.push(region);
                }
            }
        }
        regions
    }

    fn name(&self) -> &'static str { "html" }
}

lazy_static! {
    static ref MD_HEADING: Regex = Regex::new(r"^(#{1,6})\s+(.*?)\s*#*\s*$").expect("valid regex");
    static ref MD_LINK_TARGET: Regex = Regex::new(r"\]\([^)]*\)").expect("valid regex");
}

/// Line-oriented Markdown: `# ` title, `##`..`######` headings, everything else body.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownAnalyzer {
    title: Weight,
    heading: Weight,
    body: Weight,
}

impl Default for MarkdownAnalyzer {
    fn default() -> Self {
        Self { title: TITLE_WEIGHT, heading: HEADING_WEIGHT, body: BODY_WEIGHT }
    }
}

impl MarkdownAnalyzer {
    pub fn new() -> Self { Self::default() }

    pub fn with_weights(title: Weight, heading: Weight, body: Weight) -> Result<Self, ConfigError> {
        check_weight("title", title)?;
        check_weight("heading", heading)?;
        check_weight("body", body)?;
        Ok(Self { title, heading, body })
    }
}

impl Analyzer for MarkdownAnalyzer {
    fn analyze(&self, content: &str, tokenizer: &dyn Tokenizer) -> Vec<Region> {
        let mut regions = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("```") {
                continue;
            }
            let line = MD_LINK_TARGET.replace_all(line, "]");
            let (text, weight) = match MD_HEADING.captures(&line) {
                Some(caps) => {
                    let weight = if caps[1].len() == 1 { self.title } else { self.heading };
                    (caps.get(2).map_or("", |m| m.as_str()).to_owned(), weight)
                }
                None => (line.to_string(), self.body),
            };
            let region = weighted_region(&text, weight, tokenizer);
            if !region.is_empty() {
                regions.push(region);
            }
        }
        regions
    }

    fn name(&self) -> &'static str { "markdown" }
}

/// The whole content as a single body region.
#[derive(Debug, Clone, Default)]
pub struct PlainTextAnalyzer;

impl Analyzer for PlainTextAnalyzer {
    fn analyze(&self, content: &str, tokenizer: &dyn Tokenizer) -> Vec<Region> {
        let region = weighted_region(content, BODY_WEIGHT, tokenizer);
        if region.is_empty() { Vec::new() } else { vec![region] }
    }

    fn name(&self) -> &'static str { "text" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::StandardTokenizer;

    fn flatten(regions: &[Region]) -> Vec<(String, Weight)> {
        regions
            .iter()
            .flatten()
            .map(|wt| (wt.token.clone(), wt.weight))
            .collect()
    }

    #[test]
    fn html_zones_are_weighted() {
        let html = "<title>Hello | Site</title><h1>World</h1><p>hello world</p>";
        let regions = HtmlAnalyzer::new().analyze(html, &StandardTokenizer::new());
        assert_eq!(regions.len(), 3);
        assert_eq!(
            flatten(&regions),
            vec![
                ("hello".to_string(), 5.0),
                ("world".to_string(), 3.0),
                ("hello".to_string(), 1.0),
                ("world".to_string(), 1.0),
            ]
        );
    }

    #[test]
    fn markup_and_entities_are_stripped() {
        let html = "<p>Fish &amp; <b>chi</b>ps</p>";
        let regions = HtmlAnalyzer::new().analyze(html, &StandardTokenizer::new());
        let tokens: Vec<String> = flatten(&regions).into_iter().map(|(t, _)| t).collect();
        assert_eq!(tokens, vec!["fish", "chips"]);
    }

    #[test]
    fn overlapping_zones_report_each_match() {
        let html = "<ul><li><p>nested</p></li></ul>";
        let regions = HtmlAnalyzer::new().analyze(html, &StandardTokenizer::new());
        // once for <li>, once for <p>
        assert_eq!(regions.len(), 2);
    }

    #[test]
    fn unstructured_content_has_no_zones() {
        let tok = StandardTokenizer::new();
        assert!(HtmlAnalyzer::new().analyze("just some words", &tok).is_empty());
        assert!(HtmlAnalyzer::new().analyze("", &tok).is_empty());
        assert!(HtmlAnalyzer::new().analyze("<div><span>x</span></div>", &tok).is_empty());
    }

    #[test]
    fn invalid_zone_rules_are_rejected() {
        assert!(matches!(
            ZoneRule::new("bad", "h1[", 2.0),
            Err(ConfigError::InvalidSelector { .. })
        ));
        assert!(matches!(
            ZoneRule::new("neg", "h1", -1.0),
            Err(ConfigError::InvalidWeight { .. })
        ));
        assert!(matches!(
            ZoneRule::new("nan", "h1", f64::NAN),
            Err(ConfigError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn custom_zones() {
        let analyzer = HtmlAnalyzer::with_zones(vec![ZoneRule::new("code", "code", 2.0).unwrap()]);
        let regions = analyzer.analyze("<p>skip</p><code>Vec</code>", &StandardTokenizer::new());
        assert_eq!(flatten(&regions), vec![("vec".to_string(), 2.0)]);
    }

    #[test]
    fn default_zones_are_complete() {
        let analyzer = HtmlAnalyzer::new();
        let names: Vec<&str> = analyzer.zones().iter().map(ZoneRule::name).collect();
        assert_eq!(names, vec!["title", "heading", "body"]);
        let weights: Vec<Weight> = analyzer.zones().iter().map(ZoneRule::weight).collect();
        assert_eq!(weights, vec![TITLE_WEIGHT, HEADING_WEIGHT, BODY_WEIGHT]);
    }

    #[test]
    fn markdown_lines() {
        let md = "# Guide\n\n## Install it ##\nRun [cargo](https://doc.rust-lang.org) now.\n```\n";
        let regions = MarkdownAnalyzer::new().analyze(md, &StandardTokenizer::new());
        assert_eq!(
            flatten(&regions),
            vec![
                ("guide".to_string(), 5.0),
                ("install".to_string(), 3.0),
                ("it".to_string(), 3.0),
                ("run".to_string(), 1.0),
                ("cargo".to_string(), 1.0),
                ("now".to_string(), 1.0),
            ]
        );
    }

    #[test]
    fn plain_text_is_one_region() {
        let regions = PlainTextAnalyzer.analyze("one two", &StandardTokenizer::new());
        assert_eq!(regions.len(), 1);
        assert!(PlainTextAnalyzer.analyze("  ", &StandardTokenizer::new()).is_empty());
    }
}
