#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use kbase_core::error::{Error, Result, Service};
use kbase_core::traits::{Embedder, Generator, VectorStore};
use kbase_core::types::{StoredChunk, VectorHit};

pub fn hit(id: &str, content: &str, score: f32) -> VectorHit {
    VectorHit { id: id.into(), doc_id: format!("doc-{id}"), content: content.into(), score }
}

pub struct ConstEmbedder {
    pub dim: usize,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl ConstEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim, fail: false, calls: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { dim: 4, fail: true, calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl Embedder for ConstEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::external(Service::Embedding, "connection refused"));
        }
        Ok(vec![1.0; self.dim])
    }
}

/// Returns a fixed hit list (cut to `top_k`) for every query.
pub struct StubStore {
    pub hits: Vec<VectorHit>,
    pub fail: bool,
    pub searches: AtomicUsize,
}

impl StubStore {
    pub fn with_hits(hits: Vec<VectorHit>) -> Self {
        Self { hits, fail: false, searches: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { hits: Vec::new(), fail: true, searches: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl VectorStore for StubStore {
    async fn upsert(&self, _chunks: &[StoredChunk], _vectors: &[Vec<f32>]) -> Result<()> {
        Ok(())
    }

    async fn search(&self, _query_vec: &[f32], top_k: usize) -> Result<Vec<VectorHit>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::external(Service::VectorIndex, "index offline"));
        }
        Ok(self.hits.iter().take(top_k).cloned().collect())
    }

    async fn delete_by_document(&self, _doc_id: &str) -> Result<()> {
        Ok(())
    }
}

/// Replies by looking up the `Document:` line of a rerank prompt; any other
/// prompt gets `default`. Records every prompt.
pub struct ScriptedGenerator {
    pub replies: HashMap<String, Result<String>>,
    pub default: String,
    pub delay: Duration,
    pub prompts: Mutex<Vec<String>>,
    pub in_flight: AtomicUsize,
    pub peak: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(default: &str) -> Self {
        Self {
            replies: HashMap::new(),
            default: default.to_string(),
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn reply(mut self, document: &str, reply: &str) -> Self {
        self.replies.insert(document.to_string(), Ok(reply.to_string()));
        self
    }

    pub fn fail_on(mut self, document: &str) -> Self {
        self.replies.insert(document.to_string(), Err(Error::external(Service::Generation, "model crashed")));
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().ok().and_then(|p| p.last().cloned())
    }
}

fn document_line(prompt: &str) -> Option<&str> {
    prompt.lines().find_map(|l| l.strip_prefix("Document: "))
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if let Ok(mut p) = self.prompts.lock() {
            p.push(prompt.to_string());
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match document_line(prompt).and_then(|d| self.replies.get(d)) {
            Some(Ok(reply)) => Ok(reply.clone()),
            Some(Err(_)) => Err(Error::external(Service::Generation, "model crashed")),
            None => Ok(self.default.clone()),
        }
    }
}
