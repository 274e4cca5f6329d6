//! Hybrid keyword + vector search over normalized forensic extraction records

mod analysis;
mod config;
mod context;
mod engine;
mod error;
mod highlight;
mod records;
mod store;
mod time;
mod types;

pub use analysis::{ConversationAnalysis, Tally, TimeRange};
pub use config::{EngineConfig, HighlightStyle};
pub use engine::{EngineStats, PreparedCorpus, SearchEngine};
pub use error::{EngineError, Result};
pub use casefile_index::{JiebaTokenizer, Tokenizer, WhitespaceTokenizer};
pub use highlight::highlight_matches;
pub use records::{
    ContactRecord, MessageRecord, RawTime, RecordBatch, SkippedRecord, SocialContactRecord,
    SocialGroupRecord,
};
pub use store::{DocumentStore, LoadReport};
pub use time::parse_timestamp;
pub use types::{
    ContactMeta, ContextMessage, DocKey, DocMetadata, DocType, Document, Favorite,
    FavoriteLookup, GroupMeta, Highlight, MatchType, MessageMeta, Page, ResolvedFavorite,
    SearchRequest, SearchResult, SocialContactMeta, Strategy,
};
