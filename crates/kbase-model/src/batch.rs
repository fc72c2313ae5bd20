use futures::stream::{self, StreamExt, TryStreamExt};
use std::time::Instant;

use kbase_core::error::{Error, Result, Service};
use kbase_core::traits::Embedder;

/// Embed `texts` with at most `concurrency` calls in flight.
///
/// The i-th vector always belongs to the i-th text, whatever order the calls
/// complete in. The first failure aborts the batch.
pub async fn embed_batch(embedder: &dyn Embedder, texts: &[String], concurrency: usize) -> Result<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }
    let started = Instant::now();
    let vectors: Vec<Vec<f32>> = stream::iter(texts.iter())
        .map(|text| embedder.embed(text))
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;
    let dim = embedder.dim();
    if let Some((i, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dim) {
        return Err(Error::external(
            Service::Embedding,
            format!("vector {i} has {} dimensions, expected {dim}", v.len()),
        ));
    }
    tracing::debug!(
        texts = texts.len(),
        concurrency,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch embedding done"
    );
    Ok(vectors)
}
