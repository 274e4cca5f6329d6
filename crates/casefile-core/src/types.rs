//! Documents, search results and favorites

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Kind of record a document was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Message,
    Contact,
    #[serde(alias = "wechat_group")]
    SocialGroup,
    #[serde(alias = "wechat_contact")]
    SocialContact,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Message => "message",
            DocType::Contact => "contact",
            DocType::SocialGroup => "social_group",
            DocType::SocialContact => "social_contact",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "message" => Ok(DocType::Message),
            "contact" => Ok(DocType::Contact),
            "social_group" | "wechat_group" => Ok(DocType::SocialGroup),
            "social_contact" | "wechat_contact" => Ok(DocType::SocialContact),
            other => Err(format!("unknown document type: {other}")),
        }
    }
}

/// Identity of a document across reloads: `(type, id)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocKey {
    #[serde(rename = "type")]
    pub doc_type: DocType,
    pub id: String,
}

impl DocKey {
    pub fn new(doc_type: DocType, id: impl Into<String>) -> Self {
        Self {
            doc_type,
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageMeta {
    pub id: String,
    pub sender: String,
    pub content: String,
    /// Timestamp as supplied, unparsed
    pub time: String,
    pub source: String,
    pub is_sent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMeta {
    pub id: String,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMeta {
    pub id: String,
    pub name: String,
    pub announcement: String,
    pub member_count: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialContactMeta {
    pub id: String,
    pub nickname: String,
    pub remark: String,
    pub group_name: String,
    pub phone: String,
}

/// Display fields retained per document type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocMetadata {
    Message(MessageMeta),
    Contact(ContactMeta),
    SocialGroup(GroupMeta),
    SocialContact(SocialContactMeta),
}

impl DocMetadata {
    pub fn doc_type(&self) -> DocType {
        match self {
            DocMetadata::Message(_) => DocType::Message,
            DocMetadata::Contact(_) => DocType::Contact,
            DocMetadata::SocialGroup(_) => DocType::SocialGroup,
            DocMetadata::SocialContact(_) => DocType::SocialContact,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            DocMetadata::Message(m) => &m.id,
            DocMetadata::Contact(c) => &c.id,
            DocMetadata::SocialGroup(g) => &g.id,
            DocMetadata::SocialContact(s) => &s.id,
        }
    }

    /// Fields worth highlighting, in display order
    pub fn highlight_fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            DocMetadata::Message(m) => vec![("content", m.content.as_str())],
            DocMetadata::Contact(c) => vec![("name", c.name.as_str()), ("phone", c.phone.as_str())],
            DocMetadata::SocialGroup(g) => vec![
                ("name", g.name.as_str()),
                ("announcement", g.announcement.as_str()),
            ],
            DocMetadata::SocialContact(s) => vec![
                ("nickname", s.nickname.as_str()),
                ("remark", s.remark.as_str()),
                ("phone", s.phone.as_str()),
            ],
        }
    }
}

/// The unit of retrieval. Immutable once indexed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    #[serde(rename = "type")]
    pub doc_type: DocType,
    pub id: String,
    /// Concatenated searchable fields; empty but never absent
    pub text: String,
    pub metadata: DocMetadata,
}

impl Document {
    pub fn new(text: String, metadata: DocMetadata) -> Self {
        Self {
            doc_type: metadata.doc_type(),
            id: metadata.id().to_string(),
            text,
            metadata,
        }
    }

    pub fn key(&self) -> DocKey {
        DocKey::new(self.doc_type, self.id.clone())
    }
}

/// Which retrieval strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Keyword,
    Semantic,
    Sender,
    /// Found by both keyword and semantic search
    Combined,
}

/// Strategy selector for [`crate::SearchEngine::search`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Keyword,
    Semantic,
    Sender,
    #[default]
    Combined,
}

impl From<&str> for Strategy {
    /// Unknown selectors fall back to combined search.
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "keyword" => Strategy::Keyword,
            "semantic" => Strategy::Semantic,
            "sender" => Strategy::Sender,
            _ => Strategy::Combined,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub strategy: Strategy,
    pub top_n: usize,
    /// Messages of conversation context per message hit; `None` uses the
    /// configured default, `Some(0)` disables context
    pub context_window: Option<usize>,
    /// Ranked hits to skip before the returned page
    #[serde(default)]
    pub offset: usize,
    /// Page length; `None` returns everything after `offset`
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, strategy: Strategy, top_n: usize) -> Self {
        Self {
            query: query.into(),
            strategy,
            top_n,
            context_window: None,
            offset: 0,
            limit: None,
        }
    }

    /// Restricts the request to 1-based page `page` of `page_size` hits.
    pub fn with_page(mut self, page: usize, page_size: usize) -> Self {
        self.offset = page.saturating_sub(1).saturating_mul(page_size);
        self.limit = Some(page_size);
        self
    }
}

/// A window onto a longer ordered list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Length of the full list
    pub total: usize,
    pub offset: usize,
    pub limit: Option<usize>,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Cuts `[offset, offset + limit)` out of `items`.
    pub fn slice(items: Vec<T>, offset: usize, limit: Option<usize>) -> Self {
        let total = items.len();
        let items = items
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .collect();
        Self {
            total,
            offset,
            limit,
            items,
        }
    }

    pub fn total_pages(&self) -> usize {
        match self.limit {
            Some(0) => 0,
            Some(limit) => self.total.div_ceil(limit),
            None => usize::from(self.total > 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub field: String,
    pub text: String,
}

/// One message of a conversation context window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMessage {
    #[serde(flatten)]
    pub message: MessageMeta,
    pub is_current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted_content: Option<String>,
}

/// A ranked hit, built fresh per query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub doc_type: DocType,
    pub id: String,
    pub score: f64,
    pub match_type: MatchType,
    pub metadata: DocMetadata,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<Highlight>,
    pub is_favorite: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<ContextMessage>>,
}

impl SearchResult {
    pub(crate) fn from_document(doc: &Document, score: f64, match_type: MatchType) -> Self {
        Self {
            doc_type: doc.doc_type,
            id: doc.id.clone(),
            score,
            match_type,
            metadata: doc.metadata.clone(),
            highlights: Vec::new(),
            is_favorite: false,
            context: None,
        }
    }

    pub fn key(&self) -> DocKey {
        DocKey::new(self.doc_type, self.id.clone())
    }
}

/// A bookmarked document and the query it was found with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    #[serde(rename = "type")]
    pub doc_type: DocType,
    pub id: String,
    #[serde(default, alias = "query")]
    pub saved_query: String,
}

impl Favorite {
    pub fn key(&self) -> DocKey {
        DocKey::new(self.doc_type, self.id.clone())
    }
}

/// A favorite resolved against the currently loaded corpus
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedFavorite {
    #[serde(flatten)]
    pub favorite: Favorite,
    pub metadata: DocMetadata,
}

/// Membership test for bookmarked documents, owned by the caller
pub trait FavoriteLookup {
    fn is_favorite(&self, key: &DocKey) -> bool;
}

impl FavoriteLookup for HashSet<DocKey> {
    fn is_favorite(&self, key: &DocKey) -> bool {
        self.contains(key)
    }
}
