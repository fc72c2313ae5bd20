use async_trait::async_trait;

use crate::error::Result;
use crate::types::{StoredChunk, VectorHit};

/// Turns text into a fixed-dimension dense vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// The nearest-neighbour index the pipeline consumes. Similarity is cosine.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(&self, chunks: &[StoredChunk], vectors: &[Vec<f32>]) -> Result<()>;
    async fn search(&self, query_vec: &[f32], top_k: usize) -> Result<Vec<VectorHit>>;
    async fn delete_by_document(&self, doc_id: &str) -> Result<()>;
}

/// A text-completion model, used for answers and repurposed for reranking.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
