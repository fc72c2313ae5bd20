use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Instant;

use kbase_core::error::{Error, Result};
use kbase_core::traits::Generator;
use kbase_core::types::Candidate;

/// Relevance of one document to a query, higher is better.
#[async_trait]
pub trait RerankScorer: Send + Sync {
    async fn score(&self, query: &str, text: &str) -> Result<f32>;
}

pub fn rerank_prompt(query: &str, text: &str) -> String {
    format!("Query: {query}\nDocument: {text}\nScore:")
}

/// The trimmed reply must be a finite number.
pub fn parse_score(reply: &str) -> Result<f32> {
    let trimmed = reply.trim();
    match trimmed.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(Error::MalformedInput(format!("expected a score, got {trimmed:?}"))),
    }
}

/// Scores with a text-generation model asked to reply with a bare number.
pub struct GenerationScorer {
    generator: Arc<dyn Generator>,
}

impl GenerationScorer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl RerankScorer for GenerationScorer {
    async fn score(&self, query: &str, text: &str) -> Result<f32> {
        let reply = self.generator.generate(&rerank_prompt(query, text)).await?;
        parse_score(&reply)
    }
}

pub struct Reranker {
    scorer: Arc<dyn RerankScorer>,
    concurrency: usize,
}

impl Reranker {
    pub fn new(scorer: Arc<dyn RerankScorer>, concurrency: usize) -> Self {
        Self { scorer, concurrency: concurrency.max(1) }
    }

    /// Score every candidate and sort by rerank score, highest first.
    ///
    /// A malformed score counts as `0.0`; any other scorer error fails the
    /// whole pass.
    pub async fn rerank(&self, query: &str, mut candidates: Vec<Candidate>) -> Result<Vec<Candidate>> {
        if candidates.is_empty() {
            return Ok(candidates);
        }
        let started = Instant::now();
        let scores: Vec<f32> = stream::iter(candidates.iter())
            .map(|c| self.score_one(query, c))
            .buffered(self.concurrency)
            .try_collect()
            .await?;
        for (c, s) in candidates.iter_mut().zip(scores) {
            c.rerank_score = Some(s);
        }
        candidates.sort_by(|a, b| b.ranking_score().total_cmp(&a.ranking_score()));
        tracing::debug!(
            candidates = candidates.len(),
            concurrency = self.concurrency,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "rerank done"
        );
        Ok(candidates)
    }

    async fn score_one(&self, query: &str, candidate: &Candidate) -> Result<f32> {
        match self.scorer.score(query, &candidate.content).await {
            Ok(score) => Ok(score),
            Err(Error::MalformedInput(reason)) => {
                tracing::warn!(id = %candidate.id, %reason, "unparseable rerank score, using 0.0");
                Ok(0.0)
            }
            Err(e) => Err(e),
        }
    }
}
