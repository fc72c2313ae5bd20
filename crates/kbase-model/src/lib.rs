//! kbase-model
//!
//! Clients for the model server: embeddings, text generation, and the
//! bounded-concurrency batch embedding used at ingestion time.

pub mod batch;
pub mod client;
pub mod embedder;
pub mod generator;

pub use batch::embed_batch;
pub use client::OllamaClient;
pub use embedder::{get_default_embedder, HashEmbedder, OllamaEmbedder};
pub use generator::OllamaGenerator;
