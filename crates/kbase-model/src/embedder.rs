use async_trait::async_trait;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use twox_hash::XxHash64;

use kbase_core::error::{Error, Result, Service};
use kbase_core::settings::Settings;
use kbase_core::traits::Embedder;

use crate::client::OllamaClient;

/// Embeddings from the model server's `/api/embeddings` endpoint.
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
    dim: usize,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient, model: impl Into<String>, dim: usize) -> Self {
        Self { client, model: model.into(), dim }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.client.embeddings(&self.model, text).await?;
        if vector.len() != self.dim {
            return Err(Error::external(
                Service::Embedding,
                format!("model {} returned {} dimensions, expected {}", self.model, vector.len(), self.dim),
            ));
        }
        Ok(vector)
    }
}

/// Deterministic, model-free embedder: hashed bag of words, L2-normalized.
/// Same text always maps to the same vector; texts sharing words are close.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace() {
            let token = token.to_lowercase();
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            v[idx] += 0.5 + (((h >> 32) as u32) as f32) / (u32::MAX as f32);
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }
}

/// `APP_USE_FAKE_EMBEDDINGS=1` switches to [`HashEmbedder`] for offline runs.
pub fn get_default_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        tracing::info!(dim = settings.embedding.dim, "using hash embedder");
        return Ok(Arc::new(HashEmbedder::new(settings.embedding.dim)));
    }
    let client = OllamaClient::new(&settings.ollama)?;
    Ok(Arc::new(OllamaEmbedder::new(client, settings.embedding.model.clone(), settings.embedding.dim)))
}
