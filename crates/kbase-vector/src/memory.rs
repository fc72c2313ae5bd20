use async_trait::async_trait;
use tokio::sync::RwLock;

use kbase_core::error::{Error, Result};
use kbase_core::traits::VectorStore;
use kbase_core::types::{StoredChunk, VectorHit};

use crate::lance::check_upsert;

struct Entry {
    chunk: StoredChunk,
    vector: Vec<f32>,
}

/// Brute-force cosine search over an in-process list. Nothing is persisted.
pub struct MemoryVectorStore {
    dim: usize,
    entries: RwLock<Vec<Entry>>,
}

impl MemoryVectorStore {
    pub fn new(dim: usize) -> Self {
        Self { dim, entries: RwLock::new(Vec::new()) }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, chunks: &[StoredChunk], vectors: &[Vec<f32>]) -> Result<()> {
        check_upsert(chunks, vectors, self.dim)?;
        let mut entries = self.entries.write().await;
        for (chunk, vector) in chunks.iter().zip(vectors) {
            match entries.iter_mut().find(|e| e.chunk.id == chunk.id) {
                Some(existing) => {
                    existing.chunk = chunk.clone();
                    existing.vector = vector.clone();
                }
                None => entries.push(Entry { chunk: chunk.clone(), vector: vector.clone() }),
            }
        }
        Ok(())
    }

    async fn search(&self, query_vec: &[f32], top_k: usize) -> Result<Vec<VectorHit>> {
        if query_vec.len() != self.dim {
            return Err(Error::InvalidInput(format!(
                "query vector has {} dimensions, index expects {}",
                query_vec.len(),
                self.dim
            )));
        }
        let entries = self.entries.read().await;
        let mut hits: Vec<VectorHit> = entries
            .iter()
            .map(|e| VectorHit {
                id: e.chunk.id.clone(),
                doc_id: e.chunk.doc_id.clone(),
                content: e.chunk.content.clone(),
                score: cosine(query_vec, &e.vector),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn delete_by_document(&self, doc_id: &str) -> Result<()> {
        self.entries.write().await.retain(|e| e.chunk.doc_id != doc_id);
        Ok(())
    }
}
