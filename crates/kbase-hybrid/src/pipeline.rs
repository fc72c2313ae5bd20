use std::sync::Arc;
use std::time::Instant;

use kbase_core::error::Result;
use kbase_core::settings::RetrievalConfig;
use kbase_core::traits::{Embedder, VectorStore};
use kbase_core::types::{Candidate, Passage, Query};
use kbase_text::LexicalScorer;

use crate::fusion::fuse;
use crate::rerank::Reranker;

/// Query-time retrieval: embed, vector search, lexical scoring of the hits,
/// fusion, optional rerank, truncation. Holds no per-query state.
pub struct RetrievalPipeline {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    lexical: LexicalScorer,
    reranker: Option<Reranker>,
    rerank_candidates: usize,
    config: RetrievalConfig,
}

impl RetrievalPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        lexical: LexicalScorer,
        config: RetrievalConfig,
    ) -> Self {
        Self { embedder, store, lexical, reranker: None, rerank_candidates: 0, config }
    }

    /// Rerank the best `candidates` fused results (capped at `top_k`).
    /// A cap of zero leaves the fused order untouched.
    pub fn with_reranker(mut self, reranker: Reranker, candidates: usize) -> Self {
        self.reranker = Some(reranker);
        self.rerank_candidates = candidates;
        self
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub async fn retrieve(&self, query: &Query) -> Result<Vec<Passage>> {
        Ok(self.retrieve_candidates(query).await?.into_iter().map(Passage::from).collect())
    }

    /// Same as [`Self::retrieve`] but keeps every per-stage score.
    pub async fn retrieve_candidates(&self, query: &Query) -> Result<Vec<Candidate>> {
        let started = Instant::now();
        let query_vec = self.embedder.embed(&query.text).await?;
        let hits = self.store.search(&query_vec, self.config.top_k).await?;
        tracing::debug!(hits = hits.len(), elapsed_ms = started.elapsed().as_millis() as u64, "vector search done");
        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = hits.iter().map(|h| h.content.as_str()).collect();
        let lexical = self.lexical.score(&query.text, &texts);
        let mut fused = fuse(&hits, &lexical, self.config.vector_weight, self.config.lexical_weight);

        let limit = self.rerank_candidates.min(self.config.top_k);
        let mut ranked = match &self.reranker {
            Some(reranker) if limit > 0 => {
                fused.truncate(limit);
                reranker.rerank(&query.text, fused).await?
            }
            _ => fused,
        };
        ranked.truncate(self.config.final_count);
        tracing::debug!(
            returned = ranked.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "retrieval done"
        );
        Ok(ranked)
    }
}
