//! Word segmentation used for both corpus text and queries

use jieba_rs::Jieba;
use std::sync::OnceLock;

static JIEBA: OnceLock<Jieba> = OnceLock::new();

/// Splits text into search tokens.
///
/// Implementations must be deterministic: the same tokenizer is applied to
/// indexed text and to queries, and the two sides only meet on exact tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Chinese/English mixed segmentation backed by jieba.
///
/// Whitespace-only segments are dropped and every token is lowercased.
#[derive(Debug, Clone, Copy, Default)]
pub struct JiebaTokenizer;

impl JiebaTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for JiebaTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let jieba = JIEBA.get_or_init(Jieba::new);
        jieba
            .cut(text, true)
            .into_iter()
            .map(str::trim)
            .filter(|word| !word.is_empty())
            .map(str::to_lowercase)
            .collect()
    }
}

/// Splits on Unicode whitespace only.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_lowercase).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jieba_english_lowercased() {
        let tokens = JiebaTokenizer::new().tokenize("Hello World");
        assert_eq!(tokens, vec!["hello", "world"]);
    }

    #[test]
    fn test_jieba_drops_whitespace() {
        let tokens = JiebaTokenizer::new().tokenize("  alice   bob \t");
        assert!(tokens.iter().all(|t| !t.trim().is_empty()));
        assert!(tokens.contains(&"alice".to_string()));
        assert!(tokens.contains(&"bob".to_string()));
    }

    #[test]
    fn test_jieba_chinese() {
        let tokens = JiebaTokenizer::new().tokenize("我们明天去北京开会");
        assert!(tokens.len() > 1);
        assert!(tokens.contains(&"北京".to_string()));
    }

    #[test]
    fn test_jieba_empty() {
        assert!(JiebaTokenizer::new().tokenize("").is_empty());
    }

    #[test]
    fn test_whitespace_tokenizer() {
        let tokens = WhitespaceTokenizer.tokenize("A b  C");
        assert_eq!(tokens, vec!["a", "b", "c"]);
    }
}
