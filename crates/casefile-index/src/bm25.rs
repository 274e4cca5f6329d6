//! Hand-rolled Okapi BM25 over position-keyed documents

use std::collections::HashMap;

const K1: f64 = 1.5;
const B: f64 = 0.75;

/// BM25 index. Documents are identified by their position in the slice passed
/// to [`BM25::index`], which callers keep aligned with their own storage.
#[derive(Debug, Clone, Default)]
pub struct BM25 {
    doc_count: usize,
    avg_doc_len: f64,
    doc_lens: Vec<usize>,
    term_freqs: Vec<HashMap<String, usize>>,
    doc_freq: HashMap<String, usize>,
    idf: HashMap<String, f64>,
}

impl BM25 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds all term statistics from scratch.
    pub fn index(&mut self, documents: &[Vec<String>]) {
        *self = Self::new();
        self.doc_count = documents.len();
        if self.doc_count == 0 {
            return;
        }

        let mut total_len = 0;
        for tokens in documents {
            let mut freqs: HashMap<String, usize> = HashMap::new();
            for token in tokens {
                *freqs.entry(token.clone()).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *self.doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            self.doc_lens.push(tokens.len());
            self.term_freqs.push(freqs);
            total_len += tokens.len();
        }

        self.avg_doc_len = total_len as f64 / self.doc_count as f64;

        let n = self.doc_count as f64;
        for (term, &df) in &self.doc_freq {
            let df = df as f64;
            let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
            self.idf.insert(term.clone(), idf);
        }
    }

    pub fn len(&self) -> usize {
        self.doc_count
    }

    pub fn is_empty(&self) -> bool {
        self.doc_count == 0
    }

    pub fn avg_doc_len(&self) -> f64 {
        self.avg_doc_len
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }

    pub fn doc_freq(&self, term: &str) -> usize {
        self.doc_freq.get(term).copied().unwrap_or(0)
    }

    /// Scores every document against the query. Repeated query tokens count
    /// once per repetition.
    pub fn scores(&self, query_tokens: &[String]) -> Vec<f64> {
        let mut scores = vec![0.0; self.doc_count];
        if self.doc_count == 0 {
            return scores;
        }

        let mut query_freqs: Vec<(&str, usize)> = Vec::new();
        for token in query_tokens {
            match query_freqs.iter_mut().find(|(t, _)| *t == token.as_str()) {
                Some((_, count)) => *count += 1,
                None => query_freqs.push((token.as_str(), 1)),
            }
        }

        for (term, query_freq) in query_freqs {
            let Some(&idf) = self.idf.get(term) else {
                continue;
            };
            for (idx, freqs) in self.term_freqs.iter().enumerate() {
                let Some(&tf) = freqs.get(term) else {
                    continue;
                };
                let tf = tf as f64;
                let doc_len = self.doc_lens[idx] as f64;
                let norm = tf + K1 * (1.0 - B + B * doc_len / self.avg_doc_len);
                scores[idx] += idf * tf * (K1 + 1.0) / norm * query_freq as f64;
            }
        }

        scores
    }

    /// Top `k` documents by descending score. Zero-score documents are never
    /// returned; ties keep corpus order.
    pub fn search(&self, query_tokens: &[String], k: usize) -> Vec<(usize, f64)> {
        if self.doc_count == 0 || k == 0 {
            return Vec::new();
        }

        let mut ranked: Vec<(usize, f64)> = self
            .scores(query_tokens)
            .into_iter()
            .enumerate()
            .filter(|(_, score)| *score > 0.0)
            .collect();

        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(k);
        ranked
    }
}
