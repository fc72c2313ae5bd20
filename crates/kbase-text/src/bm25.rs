//! BM25 Okapi over an in-memory corpus of pre-tokenized documents.
//!
//! Document frequency and average length come from the corpus handed to
//! [`Bm25::new`] only. Negative IDF values (terms in more than half of the
//! documents) are floored to `epsilon * mean_idf`.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
    pub epsilon: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75, epsilon: 0.25 }
    }
}

pub struct Bm25 {
    params: Bm25Params,
    term_freqs: Vec<HashMap<String, usize>>,
    doc_lens: Vec<usize>,
    avgdl: f64,
    idf: HashMap<String, f64>,
}

impl Bm25 {
    pub fn new(corpus: &[Vec<String>], params: Bm25Params) -> Self {
        let mut term_freqs = Vec::with_capacity(corpus.len());
        let mut doc_lens = Vec::with_capacity(corpus.len());
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut total_len = 0usize;
        for doc in corpus {
            let mut tf: HashMap<String, usize> = HashMap::new();
            for token in doc {
                *tf.entry(token.clone()).or_insert(0) += 1;
            }
            for term in tf.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            total_len += doc.len();
            doc_lens.push(doc.len());
            term_freqs.push(tf);
        }

        let n = corpus.len() as f64;
        let avgdl = if corpus.is_empty() { 0.0 } else { total_len as f64 / n };

        // Summed in term order so the mean, and every floored IDF, is
        // bit-identical across builds.
        let mut terms: Vec<(String, usize)> = doc_freq.into_iter().collect();
        terms.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        let mut idf = HashMap::with_capacity(terms.len());
        let mut idf_sum = 0.0;
        let mut negative = Vec::new();
        for (term, df) in terms {
            let df = df as f64;
            let value = ((n - df + 0.5) / (df + 0.5)).ln();
            idf_sum += value;
            if value < 0.0 {
                negative.push(term.clone());
            }
            idf.insert(term, value);
        }
        if !idf.is_empty() {
            let floor = params.epsilon * (idf_sum / idf.len() as f64);
            for term in negative {
                idf.insert(term, floor);
            }
        }

        Self { params, term_freqs, doc_lens, avgdl, idf }
    }

    pub fn len(&self) -> usize {
        self.doc_lens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_lens.is_empty()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }

    /// One score per corpus document, in corpus order. Repeated query terms
    /// contribute once per occurrence.
    pub fn scores(&self, query: &[String]) -> Vec<f64> {
        let Bm25Params { k1, b, .. } = self.params;
        let mut scores = vec![0.0; self.len()];
        for term in query {
            let Some(idf) = self.idf.get(term) else { continue };
            for (i, tf) in self.term_freqs.iter().enumerate() {
                let Some(&freq) = tf.get(term) else { continue };
                let freq = freq as f64;
                let len_norm = if self.avgdl > 0.0 { self.doc_lens[i] as f64 / self.avgdl } else { 0.0 };
                scores[i] += idf * (freq * (k1 + 1.0)) / (freq + k1 * (1.0 - b + b * len_norm));
            }
        }
        scores
    }
}
