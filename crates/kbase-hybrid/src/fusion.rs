//! Weighted linear fusion of dense and lexical scores.

use std::collections::{HashMap, HashSet};

use kbase_core::types::{Candidate, LexicalScore, VectorHit};

/// Join key between a vector hit and its lexical score.
pub fn content_key(text: &str) -> blake3::Hash {
    blake3::hash(text.as_bytes())
}

/// One [`Candidate`] per distinct hit id, sorted by
/// `vector_weight * vector_score + lexical_weight * lexical_score` descending.
///
/// Lexical scores attach by content, so two hits with different ids and the
/// same text share one lexical score. Equal fused scores keep vector order.
pub fn fuse(
    vector_hits: &[VectorHit],
    lexical_scores: &[LexicalScore],
    vector_weight: f32,
    lexical_weight: f32,
) -> Vec<Candidate> {
    let mut by_content: HashMap<blake3::Hash, f32> = HashMap::with_capacity(lexical_scores.len());
    for s in lexical_scores {
        by_content.entry(content_key(&s.text)).or_insert(s.score);
    }

    let mut seen = HashSet::with_capacity(vector_hits.len());
    let mut candidates: Vec<Candidate> = vector_hits
        .iter()
        .filter(|h| seen.insert(h.id.as_str()))
        .map(|h| {
            let lexical = by_content.get(&content_key(&h.content)).copied().unwrap_or(0.0);
            Candidate {
                id: h.id.clone(),
                doc_id: h.doc_id.clone(),
                content: h.content.clone(),
                vector_score: Some(h.score),
                lexical_score: Some(lexical),
                fused_score: vector_weight * h.score + lexical_weight * lexical,
                rerank_score: None,
            }
        })
        .collect();
    candidates.sort_by(|a, b| b.fused_score.total_cmp(&a.fused_score));
    candidates
}
