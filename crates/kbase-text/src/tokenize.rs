//! Word segmentation used by the lexical scorer.
//!
//! [`JiebaTokenizer`] segments Han text with a dictionary + HMM model and
//! passes whitespace-delimited words through, so mixed Chinese/English corpora
//! work out of the box. [`AnalyzerTokenizer`] is the tantivy pipeline
//! (simple tokenizer, lowercasing, English stop words) for English-only data.

use jieba_rs::Jieba;
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer, TokenStream};

use kbase_core::settings::TokenizerKind;

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

pub struct JiebaTokenizer {
    jieba: Jieba,
}

impl JiebaTokenizer {
    /// Loads the bundled dictionary; construct once and share.
    pub fn new() -> Self {
        Self { jieba: Jieba::new() }
    }
}

impl Default for JiebaTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for JiebaTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        self.jieba.cut(text, true).into_iter().filter_map(normalize).collect()
    }
}

/// Lowercase and drop tokens without any letter or digit (spaces, punctuation).
fn normalize(token: &str) -> Option<String> {
    let token = token.trim();
    if token.chars().any(char::is_alphanumeric) {
        Some(token.to_lowercase())
    } else {
        None
    }
}

pub const STOP_WORDS: &[&str] = &[
    "a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
];

pub struct AnalyzerTokenizer {
    analyzer: TextAnalyzer,
}

impl AnalyzerTokenizer {
    pub fn new() -> Self {
        let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(LowerCaser)
            .filter(StopWordFilter::remove(STOP_WORDS.iter().map(|s| s.to_string())))
            .build();
        Self { analyzer }
    }
}

impl Default for AnalyzerTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for AnalyzerTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        // token_stream needs &mut; analyzers are cheap to clone
        let mut analyzer = self.analyzer.clone();
        let mut stream = analyzer.token_stream(text);
        let mut tokens = Vec::new();
        while stream.advance() {
            tokens.push(stream.token().text.clone());
        }
        tokens
    }
}

pub fn tokenizer_for(kind: TokenizerKind) -> Box<dyn Tokenizer> {
    match kind {
        TokenizerKind::Jieba => Box::new(JiebaTokenizer::new()),
        TokenizerKind::Analyzer => Box::new(AnalyzerTokenizer::new()),
    }
}
