//! Typed, read-only settings tree.
//!
//! Every section is defaulted so an empty `config.toml` yields a working
//! setup against a local Ollama. Components receive the section they need at
//! construction and never look the values up again.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub rerank: RerankConfig,
    pub lexical: LexicalConfig,
    pub ollama: OllamaConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub vector_store: VectorStoreConfig,
    pub upload: UploadConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Sizes are measured in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 500, chunk_overlap: 50 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub vector_weight: f32,
    pub lexical_weight: f32,
    pub final_count: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5, vector_weight: 0.7, lexical_weight: 0.3, final_count: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    pub enabled: bool,
    /// How many of the top fused candidates are sent to the scoring model.
    pub candidates: usize,
    /// Maximum number of scoring calls in flight for one query.
    pub concurrency: usize,
    pub model: String,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self { enabled: true, candidates: 5, concurrency: 4, model: "bge-reranker-v2-m3".to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    #[default]
    Jieba,
    Analyzer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalConfig {
    pub tokenizer: TokenizerKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:11434".to_string(), timeout_secs: 120 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dim: usize,
    /// Maximum number of embedding calls in flight during ingestion.
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { model: "bge-m3".to_string(), dim: 1024, batch_size: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub model: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { model: "deepseek-coder:7b".to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Lance,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub backend: StoreBackend,
    pub uri: String,
    pub table: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self { backend: StoreBackend::Lance, uri: "data/lancedb".to_string(), table: "document_chunks".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: usize,
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { max_bytes: 30 * 1024 * 1024, allowed_extensions: vec!["txt".to_string(), "md".to_string()] }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8000 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info".to_string() }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        let c = &self.chunking;
        if c.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunking.chunk_size must be > 0".into()));
        }
        if c.chunk_overlap >= c.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                c.chunk_overlap, c.chunk_size
            )));
        }
        let r = &self.retrieval;
        if r.top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.top_k must be > 0".into()));
        }
        if r.final_count == 0 {
            return Err(Error::InvalidConfig("retrieval.final_count must be > 0".into()));
        }
        for (name, w) in [("vector_weight", r.vector_weight), ("lexical_weight", r.lexical_weight)] {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::InvalidConfig(format!("retrieval.{name} must be a non-negative number, got {w}")));
            }
        }
        if self.rerank.concurrency == 0 {
            return Err(Error::InvalidConfig("rerank.concurrency must be > 0".into()));
        }
        if self.embedding.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be > 0".into()));
        }
        if self.embedding.dim == 0 {
            return Err(Error::InvalidConfig("embedding.dim must be > 0".into()));
        }
        Ok(())
    }
}
