//! Lexical (BM25) and vector-space (TF-IDF) indexes over tokenized documents

mod bm25;
mod tfidf;
mod tokenizer;

pub use bm25::BM25;
pub use tfidf::TfIdf;
pub use tokenizer::{JiebaTokenizer, Tokenizer, WhitespaceTokenizer};
