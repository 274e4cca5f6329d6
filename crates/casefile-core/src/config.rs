//! Configuration for search presentation and ranking

use serde::{Deserialize, Serialize};

/// Markers used when rendering highlighted snippets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightStyle {
    pub open: String,
    pub close: String,
    pub ellipsis: String,
}

impl HighlightStyle {
    pub fn new() -> Self {
        Self {
            open: "【".to_string(),
            close: "】".to_string(),
            ellipsis: "...".to_string(),
        }
    }
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Characters of context kept on each side of a highlighted match
    pub highlight_window: usize,

    /// Messages kept on each side of a target in conversation context
    pub context_window: usize,

    /// Per-strategy candidate pool for combined search, as a multiple of top_n
    pub candidate_multiplier: usize,

    /// Number of entries in the keyword frequency table of an analysis
    pub keyword_stats_limit: usize,

    pub highlight: HighlightStyle,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            highlight_window: 20,
            context_window: 3,
            candidate_multiplier: 2,
            keyword_stats_limit: 50,
            highlight: HighlightStyle::new(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = EngineConfig::new();
        assert_eq!(config.highlight_window, 20);
        assert_eq!(config.context_window, 3);
        assert_eq!(config.candidate_multiplier, 2);
        assert_eq!(config.keyword_stats_limit, 50);
        assert_eq!(config.highlight.open, "【");
    }

    #[test]
    fn test_config_partial_json() {
        let parsed: EngineConfig =
            serde_json::from_str(r#"{"candidate_multiplier":4,"highlight":{"open":"<b>"}}"#)
                .unwrap();
        assert_eq!(parsed.candidate_multiplier, 4);
        assert_eq!(parsed.context_window, 3);
        assert_eq!(parsed.highlight.open, "<b>");
        assert_eq!(parsed.highlight.close, "】");
    }
}
