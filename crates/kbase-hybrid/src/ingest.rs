use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

use kbase_core::error::Result;
use kbase_core::traits::{Embedder, VectorStore};
use kbase_core::types::{DocId, StoredChunk};
use kbase_core::Chunker;
use kbase_model::embed_batch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub doc_id: DocId,
    pub chunks: usize,
}

/// Chunk, embed and store documents.
pub struct Ingestor {
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    batch_size: usize,
}

impl Ingestor {
    pub fn new(chunker: Chunker, embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, batch_size: usize) -> Self {
        Self { chunker, embedder, store, batch_size }
    }

    /// Store `text` as a new document with a fresh id.
    pub async fn ingest_text(&self, text: &str) -> Result<IngestReport> {
        let started = Instant::now();
        let doc_id = Uuid::new_v4().to_string();
        let chunks: Vec<StoredChunk> = self
            .chunker
            .split(text)
            .into_iter()
            .map(|c| StoredChunk {
                id: Uuid::new_v4().to_string(),
                doc_id: doc_id.clone(),
                ordinal: c.ordinal,
                content: c.content,
            })
            .collect();
        if chunks.is_empty() {
            tracing::info!(%doc_id, "document has no text, nothing stored");
            return Ok(IngestReport { doc_id, chunks: 0 });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = embed_batch(self.embedder.as_ref(), &texts, self.batch_size).await?;
        self.store.upsert(&chunks, &vectors).await?;
        tracing::info!(
            %doc_id,
            chunks = chunks.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "document ingested"
        );
        Ok(IngestReport { doc_id, chunks: chunks.len() })
    }

    pub async fn delete_document(&self, doc_id: &str) -> Result<()> {
        self.store.delete_by_document(doc_id).await?;
        tracing::info!(doc_id, "document deleted");
        Ok(())
    }
}
