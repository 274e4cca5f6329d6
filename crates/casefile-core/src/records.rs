//! Typed input records and boundary validation of loosely typed JSON
//!
//! Every scalar field is optional and tolerant of strings, numbers, booleans
//! and null. A record whose shape cannot be read is skipped with a reason
//! rather than read into the wrong field.

use crate::error::{EngineError, Result};
use crate::types::DocType;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

const PHONE_KEY: &str = "电话号码";
const ANNOUNCEMENT_KEY: &str = "群公告";
const MEMBER_COUNT_KEY: &str = "人数";

/// Message timestamp exactly as supplied by the extraction layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTime {
    Epoch(f64),
    Text(String),
}

impl fmt::Display for RawTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawTime::Epoch(secs) if secs.fract() == 0.0 => write!(f, "{}", *secs as i64),
            RawTime::Epoch(secs) => write!(f, "{}", secs),
            RawTime::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub sender: String,
    #[serde(deserialize_with = "lenient_string")]
    pub content: String,
    #[serde(deserialize_with = "lenient_time")]
    pub time: Option<RawTime>,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_sent: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub source_file: String,
}

impl MessageRecord {
    pub fn time_text(&self) -> String {
        self.time.as_ref().map(ToString::to_string).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    pub details: BTreeMap<String, Value>,
}

impl ContactRecord {
    pub fn phone(&self) -> String {
        detail(&self.details, PHONE_KEY)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialGroupRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub group_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub group_name: String,
    pub details: BTreeMap<String, Value>,
}

impl SocialGroupRecord {
    pub fn announcement(&self) -> String {
        detail(&self.details, ANNOUNCEMENT_KEY)
    }

    pub fn member_count(&self) -> String {
        detail(&self.details, MEMBER_COUNT_KEY)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialContactRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub wechat_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub nickname: String,
    #[serde(deserialize_with = "lenient_string")]
    pub remark: String,
    #[serde(deserialize_with = "lenient_string")]
    pub group_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    pub details: BTreeMap<String, Value>,
}

/// A record dropped during validation or normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    #[serde(rename = "type")]
    pub kind: DocType,
    pub position: usize,
    pub reason: String,
}

/// The four record collections handed to [`crate::SearchEngine::load`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordBatch {
    pub messages: Vec<MessageRecord>,
    pub contacts: Vec<ContactRecord>,
    pub social_groups: Vec<SocialGroupRecord>,
    pub social_contacts: Vec<SocialContactRecord>,
}

impl RecordBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len() + self.contacts.len() + self.social_groups.len() + self.social_contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends every record of `other`.
    pub fn extend(&mut self, other: RecordBatch) {
        self.messages.extend(other.messages);
        self.contacts.extend(other.contacts);
        self.social_groups.extend(other.social_groups);
        self.social_contacts.extend(other.social_contacts);
    }

    /// Validates four loosely typed collections.
    ///
    /// `null` counts as an empty collection. Any other non-array value fails
    /// the whole call; individual unreadable records are skipped.
    pub fn from_json(
        messages: &Value,
        contacts: &Value,
        social_groups: &Value,
        social_contacts: &Value,
    ) -> Result<(Self, Vec<SkippedRecord>)> {
        let mut skipped = Vec::new();
        let batch = Self {
            messages: parse_collection(messages, DocType::Message, &mut skipped)?,
            contacts: parse_collection(contacts, DocType::Contact, &mut skipped)?,
            social_groups: parse_collection(social_groups, DocType::SocialGroup, &mut skipped)?,
            social_contacts: parse_collection(
                social_contacts,
                DocType::SocialContact,
                &mut skipped,
            )?,
        };
        Ok((batch, skipped))
    }
}

fn parse_collection<T: DeserializeOwned>(
    value: &Value,
    kind: DocType,
    skipped: &mut Vec<SkippedRecord>,
) -> Result<Vec<T>> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(EngineError::InvalidInput(format!(
                "{} collection must be an array, got {}",
                kind,
                json_type_name(other)
            )))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        if !item.is_object() {
            skipped.push(SkippedRecord {
                kind,
                position,
                reason: format!("expected an object, got {}", json_type_name(item)),
            });
            continue;
        }
        match T::deserialize(item) {
            Ok(record) => records.push(record),
            Err(e) => skipped.push(SkippedRecord {
                kind,
                position,
                reason: e.to_string(),
            }),
        }
    }
    Ok(records)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Renders a scalar JSON value as text; containers are rejected.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn detail(details: &BTreeMap<String, Value>, key: &str) -> String {
    details.get(key).and_then(scalar_text).unwrap_or_default()
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_text(&value).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "expected a scalar, got {}",
            json_type_name(&value)
        ))
    })
}

/// Any time that is neither text nor a number is dropped, not the record.
fn lenient_time<'de, D>(deserializer: D) -> std::result::Result<Option<RawTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => Some(RawTime::Text(text)),
        Value::Number(n) => n.as_f64().map(RawTime::Epoch),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    })
}
