use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::ConfigError;

lazy_static! {
    // Mirrors the `/[^\p{L}\p{N}]+/u` split in the generated JavaScript.
    static ref SEPARATORS: Regex = Regex::new(r"[^\p{L}\p{N}]+").expect("valid regex");
}

/// Splits text into normalized tokens.
///
/// The same normalization must be reproducible by the in-browser client, so every
/// tokenizer also describes itself as a JavaScript function taking the query string
/// and returning an array of tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// JavaScript function source performing the same tokenization.
    fn describe_normalization(&self) -> String;

    fn name(&self) -> &'static str;
}

/// NFKC, lower-case, NFKC again.
///
/// Lower-casing can make a base letter composable with a following combining mark
/// (`W` + U+030A becomes `ẘ`), so the second pass is needed for the result to be a
/// fixed point.
pub fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase().nfkc().collect()
}

fn words(normalized: &str, min_length: usize) -> impl Iterator<Item = &str> + '_ {
    SEPARATORS
        .split(normalized)
        .filter(move |w| !w.is_empty() && w.chars().count() >= min_length)
}

/// Lower-cases, splits on anything that is not a letter or digit, and drops
/// tokens shorter than `min_length` characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardTokenizer {
    min_length: usize,
}

impl Default for StandardTokenizer {
    fn default() -> Self { Self { min_length: 1 } }
}

impl StandardTokenizer {
    pub fn new() -> Self { Self::default() }

    pub fn with_min_length(min_length: usize) -> Result<Self, ConfigError> {
        if min_length == 0 {
            return Err(ConfigError::ZeroMinLength);
        }
        Ok(Self { min_length })
    }

    pub fn min_length(&self) -> usize { self.min_length }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = normalize(text);
        words(&normalized, self.min_length).map(str::to_owned).collect()
    }

    fn describe_normalization(&self) -> String {
        format!(
            "function(string) {{\n    \
             return string.normalize('NFKC').toLowerCase().normalize('NFKC').split(/[^\\p{{L}}\\p{{N}}]+/u).filter(function(t) {{\n        \
             return Array.from(t).length >= {};\n    \
             }});\n}}",
            self.min_length
        )
    }

    fn name(&self) -> &'static str { "standard" }
}

/// Character n-grams of each standard word; words shorter than `size` are kept whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NgramTokenizer {
    size: usize,
}

impl Default for NgramTokenizer {
    fn default() -> Self { Self { size: 3 } }
}

impl NgramTokenizer {
    pub fn new(size: usize) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::ZeroNgramSize);
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> usize { self.size }
}

impl Tokenizer for NgramTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = normalize(text);
        let mut tokens = Vec::new();
        for word in words(&normalized, 1) {
            let chars: Vec<char> = word.chars().collect();
            if chars.len() <= self.size {
                tokens.push(word.to_owned());
                continue;
            }
            tokens.extend(chars.windows(self.size).map(|w| w.iter().collect::<String>()));
        }
        tokens
    }

    fn describe_normalization(&self) -> String {
        format!(
            "function(string) {{\n    \
             var n = {};\n    \
             var tokens = [];\n    \
             string.normalize('NFKC').toLowerCase().normalize('NFKC').split(/[^\\p{{L}}\\p{{N}}]+/u).forEach(function(word) {{\n        \
             var chars = Array.from(word);\n        \
             if (chars.length === 0) {{ return; }}\n        \
             if (chars.length <= n) {{ tokens.push(word); return; }}\n        \
             for (var i = 0; i + n <= chars.length; i++) {{ tokens.push(chars.slice(i, i + n).join('')); }}\n    \
             }});\n    \
             return tokens;\n}}",
            self.size
        )
    }

    fn name(&self) -> &'static str { "ngram" }
}
