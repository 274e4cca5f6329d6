//! Aggregate statistics over (optionally filtered) messages

use crate::store::DocumentStore;
use crate::time::parse_timestamp;
use casefile_index::Tokenizer;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Inclusive time bounds. Either side may be absent; an unparseable bound is
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl TimeRange {
    pub fn new(start: Option<String>, end: Option<String>) -> Self {
        Self { start, end }
    }

    fn bounds(&self) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
        (parse_bound(self.start.as_deref()), parse_bound(self.end.as_deref()))
    }
}

fn parse_bound(bound: Option<&str>) -> Option<NaiveDateTime> {
    let text = bound?.trim();
    if text.is_empty() {
        return None;
    }
    let parsed = parse_timestamp(text);
    if parsed.is_none() {
        tracing::warn!(bound = text, "ignoring unparseable time bound");
    }
    parsed
}

/// A key and how often it occurred
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationAnalysis {
    pub total_messages: usize,
    /// Messages per sender, most frequent first
    pub sender_stats: Vec<Tally>,
    /// Messages per calendar day (`YYYY-MM-DD`), for messages with a usable time
    pub time_stats: BTreeMap<String, usize>,
    /// Most frequent content tokens longer than one character
    pub keyword_stats: Vec<Tally>,
}

pub(crate) fn analyze(
    store: &DocumentStore,
    tokenizer: &dyn Tokenizer,
    query: Option<&str>,
    range: Option<&TimeRange>,
    keyword_limit: usize,
) -> ConversationAnalysis {
    let query_tokens: Vec<String> = query
        .map(|q| tokenizer.tokenize(q))
        .unwrap_or_default();
    let (start, end) = range.map(TimeRange::bounds).unwrap_or((None, None));
    let time_filtered = start.is_some() || end.is_some();

    let mut senders = Counter::default();
    let mut days: BTreeMap<String, usize> = BTreeMap::new();
    let mut words = Counter::default();
    let mut total = 0;

    for row in store.message_rows() {
        let Some(meta) = store.message_meta(row.position) else {
            continue;
        };

        if !query_tokens.is_empty() {
            let content = meta.content.to_lowercase();
            if !query_tokens.iter().any(|t| content.contains(t.as_str())) {
                continue;
            }
        }

        if time_filtered {
            let Some(time) = row.time else {
                continue;
            };
            if start.is_some_and(|s| time < s) || end.is_some_and(|e| time > e) {
                continue;
            }
        }

        total += 1;
        senders.add(&meta.sender);
        if let Some(time) = row.time {
            *days.entry(time.date().format("%Y-%m-%d").to_string()).or_insert(0) += 1;
        }
        for token in tokenizer.tokenize(&meta.content) {
            if token.chars().count() > 1 {
                words.add(&token);
            }
        }
    }

    ConversationAnalysis {
        total_messages: total,
        sender_stats: senders.most_common(usize::MAX),
        time_stats: days,
        keyword_stats: words.most_common(keyword_limit),
    }
}

/// Counts keys, remembering first-seen order to break ties
#[derive(Default)]
struct Counter {
    counts: HashMap<String, (usize, usize)>,
}

impl Counter {
    fn add(&mut self, key: &str) {
        let next = self.counts.len();
        self.counts.entry(key.to_string()).or_insert((0, next)).0 += 1;
    }

    fn most_common(self, limit: usize) -> Vec<Tally> {
        let mut entries: Vec<(String, (usize, usize))> = self.counts.into_iter().collect();
        entries.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
        entries
            .into_iter()
            .take(limit)
            .map(|(key, (count, _))| Tally { key, count })
            .collect()
    }
}
