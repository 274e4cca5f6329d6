//! TF-IDF vectors with cosine similarity ranking
//!
//! Weighting follows the usual smoothed scheme: `idf(t) = ln((1 + n) / (1 + df(t))) + 1`,
//! raw term counts, and L2-normalized rows. Vectors are stored sparse, one
//! `(column, weight)` list per document sorted by column.

use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
pub struct TfIdf {
    vocab: HashMap<String, usize>,
    idf: Vec<f64>,
    doc_vecs: Vec<Vec<(usize, f64)>>,
}

impl TfIdf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fits the vocabulary and document vectors, replacing any prior state.
    pub fn index(&mut self, documents: &[Vec<String>]) {
        *self = Self::new();
        if documents.is_empty() {
            return;
        }

        let vocab_set: BTreeSet<&str> = documents
            .iter()
            .flat_map(|tokens| tokens.iter().map(String::as_str))
            .collect();
        self.vocab = vocab_set
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();

        let doc_count = documents.len();
        let mut doc_freq = vec![0usize; self.vocab.len()];
        let counts: Vec<HashMap<usize, usize>> = documents
            .iter()
            .map(|tokens| self.term_counts(tokens))
            .collect();
        for tf in &counts {
            for &col in tf.keys() {
                doc_freq[col] += 1;
            }
        }

        self.idf = doc_freq
            .iter()
            .map(|&df| ((doc_count + 1) as f64 / (df + 1) as f64).ln() + 1.0)
            .collect();

        self.doc_vecs = counts.iter().map(|tf| self.weigh(tf)).collect();
    }

    pub fn len(&self) -> usize {
        self.doc_vecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_vecs.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocab.len()
    }

    /// Cosine similarity of the query against every document. Tokens outside
    /// the fitted vocabulary carry no weight.
    pub fn similarities(&self, query_tokens: &[String]) -> Vec<f64> {
        let query_vec: HashMap<usize, f64> = self
            .weigh(&self.term_counts(query_tokens))
            .into_iter()
            .collect();
        if query_vec.is_empty() {
            return vec![0.0; self.doc_vecs.len()];
        }

        self.doc_vecs
            .iter()
            .map(|doc_vec| {
                doc_vec
                    .iter()
                    .filter_map(|(col, w)| query_vec.get(col).map(|q| q * w))
                    .sum()
            })
            .collect()
    }

    /// Top `top_k` documents by descending similarity, excluding zero
    /// similarity. Ties keep corpus order.
    pub fn search(&self, query_tokens: &[String], top_k: usize) -> Vec<(usize, f64)> {
        if self.doc_vecs.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mut results: Vec<(usize, f64)> = self
            .similarities(query_tokens)
            .into_iter()
            .enumerate()
            .filter(|(_, score)| *score > 0.0)
            .collect();

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);
        results
    }

    fn term_counts(&self, tokens: &[String]) -> HashMap<usize, usize> {
        let mut tf = HashMap::new();
        for token in tokens {
            if let Some(&col) = self.vocab.get(token) {
                *tf.entry(col).or_insert(0) += 1;
            }
        }
        tf
    }

    fn weigh(&self, tf: &HashMap<usize, usize>) -> Vec<(usize, f64)> {
        let mut vec: Vec<(usize, f64)> = tf
            .iter()
            .map(|(&col, &count)| (col, count as f64 * self.idf[col]))
            .collect();
        vec.sort_by_key(|(col, _)| *col);

        let n = norm(&vec);
        if n > 0.0 {
            for (_, w) in &mut vec {
                *w /= n;
            }
        }
        vec
    }
}

fn norm(v: &[(usize, f64)]) -> f64 {
    v.iter().map(|(_, x)| x * x).sum::<f64>().sqrt()
}
