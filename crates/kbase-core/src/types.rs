//! Domain types shared by the chunker, the engines and the retrieval pipeline.

use serde::{Deserialize, Serialize};

pub type ChunkId = String;
pub type DocId = String;

/// A bounded segment of one document's text.
///
/// `ordinal` is the position within the parent document. Identity is assigned
/// later by the ingestion caller (see [`StoredChunk`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub ordinal: usize,
}

/// A chunk after the ingestion caller assigned identity to it.
///
/// - `id`: globally unique chunk identifier
/// - `doc_id`: identity of the uploaded document the chunk came from
/// - `ordinal`: position within the parent document
/// - `content`: the text payload that gets embedded and returned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredChunk {
    pub id: ChunkId,
    pub doc_id: DocId,
    pub ordinal: usize,
    pub content: String,
}

/// One result of a nearest-neighbour search.
///
/// `score` is cosine similarity in `[-1, 1]`, higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorHit {
    pub id: ChunkId,
    pub doc_id: DocId,
    pub content: String,
    pub score: f32,
}

/// One candidate text scored by the lexical engine.
///
/// `index` is the position of `text` in the scorer's input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalScore {
    pub index: usize,
    pub text: String,
    pub score: f32,
}

/// One passage under consideration during a single query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: ChunkId,
    pub doc_id: DocId,
    pub content: String,
    pub vector_score: Option<f32>,
    pub lexical_score: Option<f32>,
    pub fused_score: f32,
    pub rerank_score: Option<f32>,
}

impl Candidate {
    /// The score that decides final ordering: rerank wins over fusion.
    pub fn ranking_score(&self) -> f32 {
        self.rerank_score.unwrap_or(self.fused_score)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A passage returned by the retrieval pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub id: ChunkId,
    pub doc_id: DocId,
    pub content: String,
    pub score: f32,
}

impl From<Candidate> for Passage {
    fn from(c: Candidate) -> Self {
        let score = c.ranking_score();
        Self { id: c.id, doc_id: c.doc_id, content: c.content, score }
    }
}
