//! kbase-text
//!
//! Lexical scoring of a query against a small candidate set: segmentation in
//! [`tokenize`], BM25 in [`bm25`], and the [`LexicalScorer`] facade used by the
//! retrieval pipeline.

pub mod bm25;
pub mod tokenize;

use std::sync::Arc;
use std::time::Instant;

use kbase_core::settings::LexicalConfig;
use kbase_core::types::LexicalScore;

pub use bm25::{Bm25, Bm25Params};
pub use tokenize::{tokenizer_for, AnalyzerTokenizer, JiebaTokenizer, Tokenizer};

#[derive(Clone)]
pub struct LexicalScorer {
    tokenizer: Arc<dyn Tokenizer>,
    params: Bm25Params,
}

impl LexicalScorer {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { tokenizer, params: Bm25Params::default() }
    }

    pub fn from_config(config: &LexicalConfig) -> Self {
        Self::new(Arc::from(tokenizer_for(config.tokenizer)))
    }

    /// Score every candidate against `query`. The result holds all
    /// candidates, highest score first; equal scores keep input order.
    pub fn score<S: AsRef<str>>(&self, query: &str, texts: &[S]) -> Vec<LexicalScore> {
        if texts.is_empty() {
            return Vec::new();
        }
        let start = Instant::now();
        let corpus: Vec<Vec<String>> = texts.iter().map(|t| self.tokenizer.tokenize(t.as_ref())).collect();
        let query_tokens = self.tokenizer.tokenize(query);
        let bm25 = Bm25::new(&corpus, self.params);
        let mut scored: Vec<LexicalScore> = bm25
            .scores(&query_tokens)
            .into_iter()
            .zip(texts)
            .enumerate()
            .map(|(index, (score, text))| LexicalScore { index, text: text.as_ref().to_string(), score: score as f32 })
            .collect();
        // sort_by is stable: ties stay in input order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        tracing::debug!(
            candidates = scored.len(),
            query_terms = query_tokens.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "lexical scoring done"
        );
        scored
    }
}
