mod common;

use common::hit;
use kbase_core::types::LexicalScore;
use kbase_hybrid::fuse;

fn lex(text: &str, score: f32) -> LexicalScore {
    LexicalScore { index: 0, text: text.into(), score }
}

#[test]
fn weighted_sum_of_both_scores() {
    let out = fuse(&[hit("a", "alpha", 0.9)], &[lex("alpha", 0.2)], 0.7, 0.3);
    assert_eq!(out.len(), 1);
    assert!((out[0].fused_score - 0.69).abs() < 1e-6, "got {}", out[0].fused_score);
    assert_eq!(out[0].vector_score, Some(0.9));
    assert_eq!(out[0].lexical_score, Some(0.2));
    assert_eq!(out[0].rerank_score, None);
}

#[test]
fn missing_lexical_score_counts_as_zero() {
    let out = fuse(&[hit("a", "alpha", 0.5)], &[lex("something else", 3.0)], 0.7, 0.3);
    assert_eq!(out[0].lexical_score, Some(0.0));
    assert!((out[0].fused_score - 0.35).abs() < 1e-6);
}

#[test]
fn empty_vector_hits_give_nothing() {
    assert!(fuse(&[], &[lex("alpha", 1.0)], 0.7, 0.3).is_empty());
}

#[test]
fn lexical_evidence_can_reorder_hits() {
    let hits = [hit("a", "alpha", 0.8), hit("b", "beta", 0.7)];
    let lexical = [lex("beta", 2.0), lex("alpha", 0.0)];
    let out = fuse(&hits, &lexical, 0.7, 0.3);
    let ids: Vec<&str> = out.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
}

#[test]
fn fused_score_grows_with_vector_weight() {
    let hits = [hit("a", "alpha", 0.9), hit("b", "beta", 0.2)];
    let lexical = [lex("alpha", 0.1), lex("beta", 0.9)];
    let mut previous = f32::MIN;
    let mut a_first_at = None;
    for step in 0..=10 {
        let w = step as f32 / 10.0;
        let out = fuse(&hits, &lexical, w, 0.3);
        let a = out.iter().find(|c| c.id == "a").map(|c| c.fused_score).unwrap_or(f32::MIN);
        assert!(a >= previous, "fused score dropped at weight {w}");
        previous = a;
        if out[0].id == "a" && a_first_at.is_none() {
            a_first_at = Some(step);
        }
        if let Some(first) = a_first_at {
            assert!(step < first || out[0].id == "a", "higher vector weight lost the lead at {w}");
        }
    }
    assert!(a_first_at.is_some());
}

#[test]
fn ties_keep_vector_order() {
    let hits = [hit("a", "x", 0.5), hit("b", "y", 0.5), hit("c", "z", 0.5)];
    let out = fuse(&hits, &[], 0.7, 0.3);
    let ids: Vec<&str> = out.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
}

#[test]
fn identical_text_under_different_ids_shares_one_lexical_score() {
    let hits = [hit("a", "same words", 0.9), hit("b", "same words", 0.4)];
    let lexical = [lex("same words", 1.5), lex("same words", 1.5)];
    let out = fuse(&hits, &lexical, 0.7, 0.3);
    assert_eq!(out.len(), 2, "both ids survive");
    assert_eq!(out[0].lexical_score, Some(1.5));
    assert_eq!(out[1].lexical_score, Some(1.5));
    assert_eq!(out[0].id, "a");
}

#[test]
fn repeated_id_keeps_the_first_occurrence() {
    let hits = [hit("a", "first copy", 0.9), hit("b", "other", 0.5), hit("a", "first copy", 0.1)];
    let out = fuse(&hits, &[], 1.0, 0.0);
    assert_eq!(out.len(), 2);
    let a = out.iter().find(|c| c.id == "a").map(|c| c.vector_score);
    assert_eq!(a, Some(Some(0.9)));
}
