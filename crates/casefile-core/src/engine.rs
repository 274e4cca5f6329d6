//! Search engine: owns the published corpus and both indexes
//!
//! A load builds a complete [`PreparedCorpus`] off to the side and then swaps
//! it in under a write lock held only for the pointer swap. Queries clone the
//! current `Arc` and run lock-free against that snapshot, so a reader sees
//! either the old corpus or the new one, never a mix.

use crate::analysis::{analyze, ConversationAnalysis, TimeRange};
use crate::config::EngineConfig;
use crate::context::conversation_context;
use crate::error::{EngineError, Result};
use crate::highlight::highlight_matches;
use crate::records::RecordBatch;
use crate::store::{DocumentStore, LoadReport};
use crate::types::{
    ContextMessage, DocKey, DocMetadata, DocType, Document, Favorite, FavoriteLookup, Highlight,
    MatchType, MessageMeta, Page, ResolvedFavorite, SearchRequest, SearchResult, Strategy,
};
use casefile_index::{JiebaTokenizer, TfIdf, Tokenizer, BM25};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

/// Corpus and indexes built from one record batch, ready to publish.
///
/// Dropping it abandons the load without touching the published state.
pub struct PreparedCorpus {
    snapshot: Snapshot,
    report: LoadReport,
}

impl PreparedCorpus {
    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}

struct Snapshot {
    store: DocumentStore,
    bm25: BM25,
    tfidf: TfIdf,
    loaded_at: DateTime<Utc>,
}

/// Readiness and size of the published corpus
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineStats {
    pub ready: bool,
    pub documents: usize,
    pub messages: usize,
    pub contacts: usize,
    pub social_groups: usize,
    pub social_contacts: usize,
    pub vocabulary_size: usize,
    pub loaded_at: Option<DateTime<Utc>>,
}

pub struct SearchEngine {
    config: EngineConfig,
    tokenizer: Arc<dyn Tokenizer>,
    state: RwLock<Option<Arc<Snapshot>>>,
}

impl SearchEngine {
    /// Engine with default configuration and jieba segmentation
    pub fn new() -> Self {
        Self::with_tokenizer(EngineConfig::new(), Arc::new(JiebaTokenizer::new()))
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_tokenizer(config, Arc::new(JiebaTokenizer::new()))
    }

    pub fn with_tokenizer(config: EngineConfig, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            config,
            tokenizer,
            state: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        self.state.read().is_some()
    }

    /// Builds the corpus and both indexes without publishing them.
    pub fn prepare(&self, batch: &RecordBatch) -> PreparedCorpus {
        let started = Instant::now();
        let (store, report) = DocumentStore::from_records(batch);

        let tokenized: Vec<Vec<String>> = store
            .documents()
            .iter()
            .map(|doc| self.tokenizer.tokenize(&doc.text))
            .collect();

        let mut bm25 = BM25::new();
        bm25.index(&tokenized);
        let mut tfidf = TfIdf::new();
        tfidf.index(&tokenized);

        tracing::debug!(
            documents = store.len(),
            vocabulary = tfidf.vocabulary_size(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "prepared corpus"
        );

        PreparedCorpus {
            snapshot: Snapshot {
                store,
                bm25,
                tfidf,
                loaded_at: Utc::now(),
            },
            report,
        }
    }

    /// Replaces the published corpus in one step.
    pub fn publish(&self, prepared: PreparedCorpus) -> LoadReport {
        let PreparedCorpus { snapshot, report } = prepared;
        *self.state.write() = Some(Arc::new(snapshot));
        tracing::info!(
            documents = report.documents,
            messages = report.messages,
            contacts = report.contacts,
            social_groups = report.social_groups,
            social_contacts = report.social_contacts,
            skipped = report.skipped.len(),
            "published corpus"
        );
        report
    }

    /// Rebuilds everything from `batch` and publishes it.
    pub fn load(&self, batch: &RecordBatch) -> LoadReport {
        self.publish(self.prepare(batch))
    }

    fn snapshot(&self) -> Result<Arc<Snapshot>> {
        self.state.read().clone().ok_or(EngineError::NotReady)
    }

    /// BM25 ranking
    pub fn keyword_search(&self, query: &str, top_n: usize) -> Result<Vec<SearchResult>> {
        let snap = self.snapshot()?;
        Ok(self.keyword_in(&snap, query, top_n))
    }

    /// TF-IDF cosine ranking
    pub fn semantic_search(&self, query: &str, top_n: usize) -> Result<Vec<SearchResult>> {
        let snap = self.snapshot()?;
        Ok(self.semantic_in(&snap, query, top_n))
    }

    /// Keyword and semantic results merged by `(type, id)`, keeping the
    /// higher score per key. Items found by both strategies are tagged
    /// [`MatchType::Combined`].
    pub fn combined_search(&self, query: &str, top_n: usize) -> Result<Vec<SearchResult>> {
        let snap = self.snapshot()?;
        Ok(self.combined_in(&snap, query, top_n))
    }

    /// Case-insensitive substring match on message senders, in corpus order.
    /// Every hit scores 1.0, which is not comparable with other strategies.
    pub fn search_by_sender(&self, name: &str, top_n: usize) -> Result<Vec<SearchResult>> {
        let snap = self.snapshot()?;
        Ok(sender_in(&snap, name, top_n))
    }

    fn keyword_in(&self, snap: &Snapshot, query: &str, top_n: usize) -> Vec<SearchResult> {
        let tokens = self.tokenizer.tokenize(query);
        if tokens.is_empty() {
            return Vec::new();
        }
        to_results(
            &snap.store,
            snap.bm25.search(&tokens, top_n),
            MatchType::Keyword,
        )
    }

    fn semantic_in(&self, snap: &Snapshot, query: &str, top_n: usize) -> Vec<SearchResult> {
        let tokens = self.tokenizer.tokenize(query);
        if tokens.is_empty() {
            return Vec::new();
        }
        to_results(
            &snap.store,
            snap.tfidf.search(&tokens, top_n),
            MatchType::Semantic,
        )
    }

    fn combined_in(&self, snap: &Snapshot, query: &str, top_n: usize) -> Vec<SearchResult> {
        if top_n == 0 {
            return Vec::new();
        }
        let pool = top_n.saturating_mul(self.config.candidate_multiplier.max(1));
        let keyword = self.keyword_in(snap, query, pool);
        let semantic = self.semantic_in(snap, query, pool);

        let mut merged: Vec<SearchResult> = Vec::with_capacity(keyword.len() + semantic.len());
        let mut slots: HashMap<DocKey, usize> = HashMap::new();
        for result in keyword.into_iter().chain(semantic) {
            match slots.get(&result.key()) {
                Some(&slot) => {
                    let existing = &mut merged[slot];
                    let both = existing.match_type != result.match_type;
                    if result.score > existing.score {
                        *existing = result;
                    }
                    if both {
                        existing.match_type = MatchType::Combined;
                    }
                }
                None => {
                    slots.insert(result.key(), merged.len());
                    merged.push(result);
                }
            }
        }

        merged.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        merged.truncate(top_n);
        merged
    }

    /// Highlights query tokens in `text`; see [`highlight_matches`].
    pub fn highlight_matches(&self, text: &str, query: &str, window_size: usize) -> String {
        if query.trim().is_empty() {
            return text.to_string();
        }
        let tokens = self.tokenizer.tokenize(query);
        highlight_matches(text, &tokens, window_size, &self.config.highlight)
    }

    /// Time-ordered messages around `message_id` from the same source,
    /// at most `window_size` on each side.
    pub fn find_conversation_context(
        &self,
        message_id: &str,
        window_size: usize,
    ) -> Result<Vec<ContextMessage>> {
        let snap = self.snapshot()?;
        Ok(conversation_context(&snap.store, message_id, window_size))
    }

    pub fn analyze_conversation(
        &self,
        query: Option<&str>,
        time_range: Option<&TimeRange>,
    ) -> Result<ConversationAnalysis> {
        let snap = self.snapshot()?;
        Ok(analyze(
            &snap.store,
            self.tokenizer.as_ref(),
            query.filter(|q| !q.trim().is_empty()),
            time_range,
            self.config.keyword_stats_limit,
        ))
    }

    /// Runs the requested strategy and prepares one page of results for
    /// display: de-duplicated, favorite-flagged, highlighted, and for
    /// messages with conversation context attached. `total` counts every
    /// de-duplicated hit. The whole request reads one snapshot.
    pub fn search(
        &self,
        request: &SearchRequest,
        favorites: &dyn FavoriteLookup,
    ) -> Result<Page<SearchResult>> {
        let started = Instant::now();
        let snap = self.snapshot()?;
        let query = request.query.trim();
        let hits = match request.strategy {
            Strategy::Keyword => self.keyword_in(&snap, query, request.top_n),
            Strategy::Semantic => self.semantic_in(&snap, query, request.top_n),
            Strategy::Sender => sender_in(&snap, query, request.top_n),
            Strategy::Combined => self.combined_in(&snap, query, request.top_n),
        };

        let tokens = self.tokenizer.tokenize(query);
        let style = &self.config.highlight;
        let window = self.config.highlight_window;
        let context_window = request.context_window.unwrap_or(self.config.context_window);
        let mut seen = HashSet::new();
        let hits: Vec<SearchResult> = hits
            .into_iter()
            .filter(|hit| seen.insert(hit.key()))
            .collect();
        let mut page = Page::slice(hits, request.offset, request.limit);

        for hit in &mut page.items {
            hit.is_favorite = favorites.is_favorite(&hit.key());
            hit.highlights = hit
                .metadata
                .highlight_fields()
                .into_iter()
                .map(|(field, text)| Highlight {
                    field: field.to_string(),
                    text: highlight_matches(text, &tokens, window, style),
                })
                .collect();

            if hit.doc_type == DocType::Message && context_window > 0 {
                let mut context = conversation_context(&snap.store, &hit.id, context_window);
                for msg in &mut context {
                    msg.highlighted_content = Some(highlight_matches(
                        &msg.message.content,
                        &tokens,
                        window,
                        style,
                    ));
                }
                hit.context = Some(context);
            }
        }

        tracing::debug!(
            query,
            strategy = ?request.strategy,
            total = page.total,
            returned = page.items.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search"
        );
        Ok(page)
    }

    /// Messages newest first. Messages without a parseable time sort last,
    /// keeping corpus order among themselves.
    pub fn list_messages(&self, offset: usize, limit: Option<usize>) -> Result<Page<MessageMeta>> {
        let snap = self.snapshot()?;
        let mut rows: Vec<_> = snap.store.message_rows().iter().collect();
        rows.sort_by(|a, b| b.time.cmp(&a.time));
        let messages = rows
            .into_iter()
            .filter_map(|row| snap.store.message_meta(row.position).cloned())
            .collect();
        Ok(Page::slice(messages, offset, limit))
    }

    pub fn document(&self, key: &DocKey) -> Result<Option<Document>> {
        let snap = self.snapshot()?;
        Ok(snap.store.lookup(key).cloned())
    }

    /// Resolves bookmarks against the loaded corpus. Returns the resolved
    /// favorites and the number that no longer match any document.
    pub fn resolve_favorites(
        &self,
        favorites: &[Favorite],
    ) -> Result<(Vec<ResolvedFavorite>, usize)> {
        let snap = self.snapshot()?;
        let mut resolved = Vec::with_capacity(favorites.len());
        let mut missing = 0;
        for fav in favorites {
            match snap.store.lookup(&fav.key()) {
                Some(doc) => resolved.push(ResolvedFavorite {
                    favorite: fav.clone(),
                    metadata: doc.metadata.clone(),
                }),
                None => {
                    tracing::warn!(doc_type = %fav.doc_type, id = %fav.id, "favorite not found");
                    missing += 1;
                }
            }
        }
        Ok((resolved, missing))
    }

    pub fn stats(&self) -> EngineStats {
        let Ok(snap) = self.snapshot() else {
            return EngineStats::default();
        };
        EngineStats {
            ready: true,
            documents: snap.store.len(),
            messages: snap.store.count(DocType::Message),
            contacts: snap.store.count(DocType::Contact),
            social_groups: snap.store.count(DocType::SocialGroup),
            social_contacts: snap.store.count(DocType::SocialContact),
            vocabulary_size: snap.tfidf.vocabulary_size(),
            loaded_at: Some(snap.loaded_at),
        }
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn sender_in(snap: &Snapshot, name: &str, top_n: usize) -> Vec<SearchResult> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    snap.store
        .message_rows()
        .iter()
        .filter_map(|row| snap.store.get(row.position))
        .filter(|doc| match &doc.metadata {
            DocMetadata::Message(meta) => meta.sender.to_lowercase().contains(&needle),
            _ => false,
        })
        .take(top_n)
        .map(|doc| SearchResult::from_document(doc, 1.0, MatchType::Sender))
        .collect()
}

fn to_results(
    store: &DocumentStore,
    ranked: Vec<(usize, f64)>,
    match_type: MatchType,
) -> Vec<SearchResult> {
    ranked
        .into_iter()
        .filter_map(|(pos, score)| {
            store
                .get(pos)
                .map(|doc| SearchResult::from_document(doc, score, match_type))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{MessageRecord, RawTime, SocialGroupRecord};
    use casefile_index::WhitespaceTokenizer;

    fn engine() -> SearchEngine {
        SearchEngine::with_tokenizer(EngineConfig::new(), Arc::new(WhitespaceTokenizer))
    }

    fn msg(id: &str, sender: &str, content: &str, time: &str) -> MessageRecord {
        MessageRecord {
            id: id.to_string(),
            sender: sender.to_string(),
            content: content.to_string(),
            time: Some(RawTime::Text(time.to_string())),
            is_sent: false,
            source_file: "f1".to_string(),
        }
    }

    fn scenario() -> RecordBatch {
        RecordBatch {
            messages: vec![
                msg("m1", "Alice", "hello world", "2024-01-01 10:00:00"),
                msg("m2", "Bob", "hello there", "2024-01-01 10:05:00"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_not_ready_before_load() {
        let engine = engine();
        assert!(!engine.is_ready());
        assert_eq!(engine.keyword_search("x", 5), Err(EngineError::NotReady));
        assert_eq!(engine.semantic_search("x", 5), Err(EngineError::NotReady));
        assert_eq!(engine.combined_search("x", 5), Err(EngineError::NotReady));
        assert_eq!(engine.combined_search("x", 0), Err(EngineError::NotReady));
        assert_eq!(engine.search_by_sender("x", 5), Err(EngineError::NotReady));
        assert!(engine.find_conversation_context("m1", 1).is_err());
        assert!(engine.analyze_conversation(None, None).is_err());
        assert!(!engine.stats().ready);
    }

    #[test]
    fn test_empty_load_is_ready_with_no_results() {
        let engine = engine();
        engine.load(&RecordBatch::new());
        assert!(engine.is_ready());
        assert!(engine.keyword_search("hello", 10).unwrap().is_empty());
        assert!(engine.semantic_search("hello", 10).unwrap().is_empty());
        let analysis = engine.analyze_conversation(None, None).unwrap();
        assert_eq!(analysis.total_messages, 0);
    }

    #[test]
    fn test_scenario_keyword_sender_context() {
        let engine = engine();
        engine.load(&scenario());

        let hits = engine.keyword_search("hello", 10).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.match_type == MatchType::Keyword));

        let by_sender = engine.search_by_sender("ali", 10).unwrap();
        assert_eq!(by_sender.len(), 1);
        assert_eq!(by_sender[0].id, "m1");
        assert_eq!(by_sender[0].score, 1.0);

        let ctx = engine.find_conversation_context("m2", 1).unwrap();
        let ids: Vec<&str> = ctx.iter().map(|c| c.message.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2"]);
    }

    #[test]
    fn test_zero_top_n_yields_nothing() {
        let engine = engine();
        engine.load(&scenario());
        assert!(engine.keyword_search("hello", 0).unwrap().is_empty());
        assert!(engine.semantic_search("hello", 0).unwrap().is_empty());
        assert!(engine.combined_search("hello", 0).unwrap().is_empty());
        assert!(engine.search_by_sender("a", 0).unwrap().is_empty());
    }

    #[test]
    fn test_combined_dedups_and_takes_max() {
        let engine = engine();
        engine.load(&scenario());

        let keyword = engine.keyword_search("world", 10).unwrap();
        let semantic = engine.semantic_search("world", 10).unwrap();
        let combined = engine.combined_search("world", 10).unwrap();

        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].id, "m1");
        assert_eq!(combined[0].match_type, MatchType::Combined);
        let expected = keyword[0].score.max(semantic[0].score);
        assert!((combined[0].score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_combined_truncates() {
        let engine = engine();
        engine.load(&scenario());
        assert_eq!(engine.combined_search("hello", 1).unwrap().len(), 1);
    }

    #[test]
    fn test_reload_replaces_corpus() {
        let engine = engine();
        engine.load(&scenario());
        assert!(!engine.keyword_search("world", 10).unwrap().is_empty());

        engine.load(&RecordBatch {
            messages: vec![msg("n1", "Dave", "goodbye moon", "2024-02-01 08:00:00")],
            ..Default::default()
        });
        assert!(engine.keyword_search("world", 10).unwrap().is_empty());
        assert!(engine.combined_search("world", 10).unwrap().is_empty());
        assert_eq!(engine.keyword_search("moon", 10).unwrap().len(), 1);
    }

    #[test]
    fn test_prepare_does_not_publish() {
        let engine = engine();
        engine.load(&scenario());
        let prepared = engine.prepare(&RecordBatch::new());
        assert_eq!(prepared.report().documents, 0);
        assert_eq!(engine.keyword_search("hello", 10).unwrap().len(), 2);
        drop(prepared);
        assert_eq!(engine.stats().documents, 2);
    }

    #[test]
    fn test_search_presentation() {
        let engine = engine();
        engine.load(&scenario());
        let mut favorites = HashSet::new();
        favorites.insert(DocKey::new(DocType::Message, "m1"));

        let request = SearchRequest::new("world", Strategy::Keyword, 10);
        let page = engine.search(&request, &favorites).unwrap();
        assert_eq!(page.total, 1);
        let hit = &page.items[0];
        assert!(hit.is_favorite);
        assert_eq!(hit.highlights[0].field, "content");
        assert_eq!(hit.highlights[0].text, "hello 【world】");
        let context = hit.context.as_ref().unwrap();
        assert_eq!(context.len(), 2);
        assert_eq!(
            context[0].highlighted_content.as_deref(),
            Some("hello 【world】")
        );
    }

    #[test]
    fn test_search_context_disabled() {
        let engine = engine();
        engine.load(&scenario());
        let mut request = SearchRequest::new("hello", Strategy::from("bogus"), 10);
        request.context_window = Some(0);
        let results = engine
            .search(&request, &HashSet::<DocKey>::new())
            .unwrap()
            .items;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.context.is_none() && !r.is_favorite));
    }

    #[test]
    fn test_search_pages_after_dedup() {
        let engine = engine();
        engine.load(&RecordBatch {
            messages: (0..5)
                .map(|i| msg(&format!("m{i}"), "Ann", "hello", "2024-01-01 10:00:00"))
                .collect(),
            ..Default::default()
        });
        let all = engine
            .search(
                &SearchRequest::new("hello", Strategy::Keyword, 10),
                &HashSet::<DocKey>::new(),
            )
            .unwrap();
        let request = SearchRequest::new("hello", Strategy::Keyword, 10).with_page(2, 2);
        let page = engine.search(&request, &HashSet::<DocKey>::new()).unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages(), 3);
        let ids: Vec<&str> = page.items.iter().map(|r| r.id.as_str()).collect();
        let expected: Vec<&str> = all.items[2..4].iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, expected);
        assert!(page.items.iter().all(|r| !r.highlights.is_empty()));

        let beyond = engine
            .search(&request.clone().with_page(9, 2), &HashSet::<DocKey>::new())
            .unwrap();
        assert_eq!(beyond.total, 5);
        assert!(beyond.items.is_empty());
    }

    #[test]
    fn test_list_messages_newest_first() {
        let engine = engine();
        let mut undated = msg("m0", "Eve", "no time", "");
        undated.time = None;
        engine.load(&RecordBatch {
            messages: vec![
                undated,
                msg("m1", "Alice", "a", "2024-01-01 10:00:00"),
                msg("m2", "Bob", "b", "2024-01-03 09:00:00"),
                msg("m3", "Carol", "c", "garbled"),
                msg("m4", "Dan", "d", "2024-01-02 12:00:00"),
            ],
            ..Default::default()
        });

        let page = engine.list_messages(0, None).unwrap();
        let ids: Vec<&str> = page.items.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m4", "m1", "m0", "m3"]);

        let second = engine.list_messages(2, Some(2)).unwrap();
        assert_eq!(second.total, 5);
        let ids: Vec<&str> = second.items.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m0"]);
        assert_eq!(
            SearchEngine::with_tokenizer(EngineConfig::new(), Arc::new(WhitespaceTokenizer))
                .list_messages(0, None),
            Err(EngineError::NotReady)
        );
    }

    #[test]
    fn test_message_with_malformed_time_is_searchable() {
        let (batch, skipped) = RecordBatch::from_json(
            &serde_json::json!([
                {"id": "m1", "sender": "Ann", "content": "lost timestamp", "time": {}},
                {"id": "m2", "sender": "Ben", "content": "lost timestamp too", "time": true}
            ]),
            &serde_json::Value::Null,
            &serde_json::Value::Null,
            &serde_json::Value::Null,
        )
        .unwrap();
        assert!(skipped.is_empty());

        let engine = engine();
        engine.load(&batch);
        let hits = engine.keyword_search("timestamp", 10).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(engine.find_conversation_context("m1", 2).unwrap().is_empty());
    }

    #[test]
    fn test_group_highlight_fields() {
        let engine = engine();
        engine.load(&RecordBatch {
            social_groups: vec![SocialGroupRecord {
                group_id: "g1".to_string(),
                group_name: "Hiking Club".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        });
        let request = SearchRequest::new("hiking", Strategy::Combined, 5);
        let results = engine
            .search(&request, &HashSet::<DocKey>::new())
            .unwrap()
            .items;
        assert_eq!(results[0].highlights[0].text, "【Hiking】 Club");
        assert!(results[0].context.is_none());
    }

    #[test]
    fn test_resolve_favorites() {
        let engine = engine();
        engine.load(&scenario());
        let favorites = vec![
            Favorite {
                doc_type: DocType::Message,
                id: "m2".to_string(),
                saved_query: "hello".to_string(),
            },
            Favorite {
                doc_type: DocType::Contact,
                id: "gone".to_string(),
                saved_query: String::new(),
            },
        ];
        let (resolved, missing) = engine.resolve_favorites(&favorites).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(missing, 1);
        assert_eq!(resolved[0].metadata.id(), "m2");
    }

    #[test]
    fn test_stats() {
        let engine = engine();
        engine.load(&scenario());
        let stats = engine.stats();
        assert!(stats.ready);
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.messages, 2);
        assert!(stats.vocabulary_size >= 4);
        assert!(stats.loaded_at.is_some());
    }

    #[test]
    fn test_highlight_via_engine() {
        let engine = engine();
        assert_eq!(engine.highlight_matches("Hello World", "world", 20), "Hello 【World】");
        assert_eq!(engine.highlight_matches("Hello World", "", 20), "Hello World");
    }

    mod properties {
        use super::{engine, msg};
        use crate::engine::SearchEngine;
        use crate::records::RecordBatch;
        use crate::types::DocKey;
        use proptest::prelude::*;
        use std::collections::HashSet;

        const WORDS: &[&str] = &["alpha", "beta", "gamma", "delta", "omega"];

        fn corpus_strategy() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec(
                prop::collection::vec(prop::sample::select(WORDS), 1..6)
                    .prop_map(|words| words.join(" ")),
                1..12,
            )
        }

        fn load(contents: &[String]) -> SearchEngine {
            let engine = engine();
            let messages = contents
                .iter()
                .enumerate()
                .map(|(i, c)| msg(&format!("m{i}"), "s", c, "2024-01-01 10:00:00"))
                .collect();
            engine.load(&RecordBatch {
                messages,
                ..Default::default()
            });
            engine
        }

        proptest! {
            /// Combined results are bounded, unique per key, and sorted by score
            #[test]
            fn prop_combined_bounded_unique_sorted(
                contents in corpus_strategy(),
                query in prop::sample::select(WORDS),
                top_n in 0usize..8,
            ) {
                let engine = load(&contents);
                let results = engine.combined_search(query, top_n).unwrap();
                prop_assert!(results.len() <= top_n);
                let keys: HashSet<DocKey> = results.iter().map(|r| r.key()).collect();
                prop_assert_eq!(keys.len(), results.len());
                for pair in results.windows(2) {
                    prop_assert!(pair[0].score >= pair[1].score);
                }
            }

            /// Every keyword hit has a positive score and contains a query token
            #[test]
            fn prop_keyword_hits_contain_query(
                contents in corpus_strategy(),
                query in prop::sample::select(WORDS),
            ) {
                let engine = load(&contents);
                for hit in engine.keyword_search(query, 50).unwrap() {
                    prop_assert!(hit.score > 0.0);
                    let doc = engine.document(&hit.key()).unwrap().unwrap();
                    prop_assert!(doc.text.contains(query));
                }
            }

            /// Context never exceeds the window on either side and contains the target once
            #[test]
            fn prop_context_bounded(
                contents in corpus_strategy(),
                pick in 0usize..12,
                window in 0usize..4,
            ) {
                let engine = load(&contents);
                let id = format!("m{}", pick % contents.len());
                let context = engine.find_conversation_context(&id, window).unwrap();
                prop_assert!(context.len() <= 2 * window + 1);
                prop_assert_eq!(context.iter().filter(|c| c.is_current).count(), 1);
            }

            /// Semantic similarities are strictly positive and never exceed one
            #[test]
            fn prop_semantic_scores_in_range(
                contents in corpus_strategy(),
                query in prop::sample::select(WORDS),
            ) {
                let engine = load(&contents);
                for hit in engine.semantic_search(query, 50).unwrap() {
                    prop_assert!(hit.score > 0.0 && hit.score <= 1.0 + 1e-9);
                }
            }
        }
    }
}
