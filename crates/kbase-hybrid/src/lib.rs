//! kbase-hybrid
//!
//! Hybrid retrieval over the vector index and lexical scorer, plus the
//! document ingestion and answering services built on it.

pub mod answer;
pub mod fusion;
pub mod ingest;
pub mod pipeline;
pub mod rerank;
pub mod upload;

pub use answer::{Answer, AnswerService};
pub use fusion::fuse;
pub use ingest::{IngestReport, Ingestor};
pub use pipeline::RetrievalPipeline;
pub use rerank::{GenerationScorer, RerankScorer, Reranker};
