//! Schema-sniffing extractors for forensic dumps
//!
//! A dump announces what it holds through its `type` field and its `parents`
//! breadcrumb (the path of report sections leading to it, e.g.
//! `[["微信"], ["联系人"]]`). Tabular sections keep their rows under
//! `contents.contents`, each row shaped `[[label, id], [label, name],
//! [[[key, value], ...]]]`.

use casefile_core::{
    ContactRecord, MessageRecord, RawTime, RecordBatch, SocialContactRecord, SocialGroupRecord,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

const CONTACT_KEYWORDS: &[&str] = &["通讯录", "联系人", "contact"];
const SOCIAL_KEYWORDS: &[&str] = &["微信", "wechat", "weixin"];
const GROUP_KEYWORDS: &[&str] = &["群组", "group"];
const SOCIAL_CONTACT_KEYWORDS: &[&str] = &["联系人", "contact"];
const ADDRESS_BOOK: &str = "通讯录";
const APP_KEYWORDS: &[&str] = &["应用", "app", "摘要", "summary"];
const CALL_LOG_KEYWORDS: &[&str] = &["通话记录", "call log", "call record"];

const UNKNOWN_SENDER: &str = "Unknown";
const UNKNOWN_GROUP: &str = "Unknown Group";
const UNKNOWN: &str = "Unknown";

/// Everything recognized in one dump
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    pub records: RecordBatch,
    /// Device properties (model, OS version, ...) from a device summary dump
    pub device_info: BTreeMap<String, String>,
    pub app_summary: Vec<AppSummary>,
    pub call_records: Vec<CallRecord>,
}

/// An installed application listed in an app summary section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppSummary {
    pub id: String,
    pub name: String,
    pub details: BTreeMap<String, Value>,
}

/// One call log entry. Known detail fields are lifted out of `details`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallRecord {
    pub id: String,
    pub phone: String,
    pub duration: Option<String>,
    pub time: Option<String>,
    pub call_type: Option<String>,
    pub is_deleted: Option<String>,
    pub details: BTreeMap<String, Value>,
}

/// Runs every extractor over a parsed dump. `source_file` is recorded on
/// each message.
pub fn extract(dump: &Value, source_file: &str) -> Extracted {
    let labels = parent_labels(dump);
    let mut records = RecordBatch::new();

    let mut seen = HashSet::new();
    for message in extract_messages(dump, source_file) {
        if seen.insert(message.id.clone()) {
            records.messages.push(message);
        }
    }

    if mentions(&labels, CONTACT_KEYWORDS) {
        records.contacts = table_rows(dump).filter_map(contact_from_row).collect();
    }

    if mentions(&labels, SOCIAL_KEYWORDS) {
        if mentions(&labels, GROUP_KEYWORDS) {
            records.social_groups = table_rows(dump).filter_map(group_from_row).collect();
        }
        let social_contacts = labels.iter().any(|label| {
            !label.contains(ADDRESS_BOOK)
                && SOCIAL_CONTACT_KEYWORDS.iter().any(|kw| label.contains(kw))
        });
        if social_contacts {
            records.social_contacts = table_rows(dump)
                .filter_map(social_contact_from_row)
                .collect();
        }
    }

    Extracted {
        records,
        device_info: extract_device_info(dump),
        app_summary: extract_app_summary(dump),
        call_records: extract_call_records(dump),
    }
}

/// Applications from a dump whose parents mention an app summary.
pub fn extract_app_summary(dump: &Value) -> Vec<AppSummary> {
    if !mentions(&parent_labels(dump), APP_KEYWORDS) {
        return Vec::new();
    }
    table_rows(dump)
        .filter_map(Row::new)
        .map(|row| AppSummary {
            id: row.text(0).unwrap_or_else(new_id),
            name: row.text(1).unwrap_or_else(|| UNKNOWN.to_string()),
            details: row.details(),
        })
        .collect()
}

/// Call log entries, shaped `[[label, id], [label, number], [[details]]]`.
pub fn extract_call_records(dump: &Value) -> Vec<CallRecord> {
    if !mentions(&parent_labels(dump), CALL_LOG_KEYWORDS) {
        return Vec::new();
    }
    table_rows(dump)
        .filter_map(Row::new)
        .filter(|row| row.len() >= 3)
        .map(call_from_row)
        .collect()
}

fn call_from_row(row: Row<'_>) -> CallRecord {
    let details = row.details();
    let mut call = CallRecord {
        id: row.text(0).unwrap_or_else(new_id),
        phone: row.text(1).unwrap_or_else(|| UNKNOWN.to_string()),
        ..Default::default()
    };
    for (key, value) in &details {
        let lower = key.to_lowercase();
        let Some(value) = scalar(value) else {
            continue;
        };
        if key.contains("时长") || lower.contains("duration") {
            call.duration = Some(value.clone());
        }
        if key.contains("时间") || lower.contains("time") {
            call.time = Some(value.clone());
        }
        if key.contains("类型") || lower.contains("type") {
            call.call_type = Some(value.clone());
        }
        if key.contains("删除") || lower.contains("delete") {
            call.is_deleted = Some(value);
        }
    }
    call.details = details;
    call
}

/// Chat messages from a `type == 1` dump, a nested `page` object, or a
/// top-level array of message objects.
pub fn extract_messages(dump: &Value, source_file: &str) -> Vec<MessageRecord> {
    match dump {
        Value::Object(obj) if type_is(obj, 1) && obj.get("contents").is_some_and(Value::is_array) => {
            obj.get("contents")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(Value::as_object)
                .filter_map(|msg| message_from(msg, source_file))
                .collect()
        }
        Value::Object(obj) => match obj.get("page") {
            Some(page @ Value::Object(_)) => extract_messages(page, source_file),
            _ => Vec::new(),
        },
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_object)
            .filter(|msg| msg.contains_key("content"))
            .filter_map(|msg| message_from(msg, source_file))
            .collect(),
        _ => Vec::new(),
    }
}

/// Key/value properties from a `type == 0` device summary.
pub fn extract_device_info(dump: &Value) -> BTreeMap<String, String> {
    let mut info = BTreeMap::new();
    let Some(obj) = dump.as_object().filter(|obj| type_is(obj, 0)) else {
        return info;
    };
    let rows = obj
        .get("contents")
        .and_then(|c| c.get("contents"))
        .and_then(Value::as_array);
    for row in rows.into_iter().flatten().filter_map(Value::as_array) {
        if row.len() < 3 {
            continue;
        }
        let Some(key) = row[1].as_array().and_then(|cell| cell.get(1)).and_then(Value::as_str)
        else {
            continue;
        };
        let value = match row[2].as_array().map(Vec::as_slice) {
            Some([_, value, ..]) => scalar(value),
            Some([Value::String(value)]) => Some(value.clone()),
            _ => None,
        };
        if let Some(value) = value {
            info.insert(key.to_string(), value);
        }
    }
    info
}

fn message_from(msg: &Map<String, Value>, source_file: &str) -> Option<MessageRecord> {
    let content = match msg.get("content")? {
        Value::String(text) => text.clone(),
        Value::Object(inner) => scalar(inner.get("text")?)?,
        _ => return None,
    };
    let time = match msg.get("time") {
        Some(Value::String(text)) => Some(RawTime::Text(text.clone())),
        Some(Value::Number(n)) => n.as_f64().map(RawTime::Epoch),
        _ => None,
    };
    Some(MessageRecord {
        id: msg.get("id").and_then(scalar).unwrap_or_else(new_id),
        sender: msg
            .get("user_name")
            .and_then(scalar)
            .unwrap_or_else(|| UNKNOWN_SENDER.to_string()),
        content,
        time,
        is_sent: msg.get("position").and_then(Value::as_f64) == Some(1.0),
        source_file: source_file.to_string(),
    })
}

fn contact_from_row(row: &Value) -> Option<ContactRecord> {
    let row = Row::new(row)?;
    Some(ContactRecord {
        id: row.text(0).unwrap_or_else(new_id),
        name: row.text(1).unwrap_or_else(|| UNKNOWN_SENDER.to_string()),
        details: row.details(),
    })
}

fn group_from_row(row: &Value) -> Option<SocialGroupRecord> {
    let row = Row::new(row)?;
    Some(SocialGroupRecord {
        group_id: row.text(0).unwrap_or_else(new_id),
        group_name: row.text(1).unwrap_or_else(|| UNKNOWN_GROUP.to_string()),
        details: row.details(),
    })
}

fn social_contact_from_row(row: &Value) -> Option<SocialContactRecord> {
    let row = Row::new(row)?;
    let details = row.details();
    let mut contact = SocialContactRecord {
        wechat_id: row.text(0).unwrap_or_else(new_id),
        nickname: row.text(1).unwrap_or_else(|| UNKNOWN_SENDER.to_string()),
        ..Default::default()
    };
    for (key, value) in &details {
        let lower = key.to_lowercase();
        let Some(value) = scalar(value) else {
            continue;
        };
        if key.contains("备注") || lower.contains("remark") {
            contact.remark = value.clone();
        }
        if key.contains('群') || lower.contains("group") {
            contact.group_name = value.clone();
        }
        if key.contains("电话") || lower.contains("phone") {
            contact.phone = value;
        }
    }
    contact.details = details;
    Some(contact)
}

/// Typed view of one table row
struct Row<'a> {
    cells: &'a [Value],
}

impl<'a> Row<'a> {
    /// Rows need at least an id cell and a name cell.
    fn new(value: &'a Value) -> Option<Self> {
        let cells = value.as_array()?;
        if cells.len() < 2 {
            tracing::debug!("skipping malformed table row");
            return None;
        }
        Some(Self { cells })
    }

    fn len(&self) -> usize {
        self.cells.len()
    }

    /// Value half of a `[label, value]` cell
    fn text(&self, index: usize) -> Option<String> {
        let value = self.cells.get(index)?.as_array()?.get(1)?;
        scalar(value)
    }

    /// `[key, value]` pairs from the third cell's first element
    fn details(&self) -> BTreeMap<String, Value> {
        let pairs = self
            .cells
            .get(2)
            .and_then(Value::as_array)
            .and_then(|cell| cell.first())
            .and_then(Value::as_array);
        pairs
            .into_iter()
            .flatten()
            .filter_map(|pair| match pair.as_array().map(Vec::as_slice) {
                Some([Value::String(key), value, ..]) => Some((key.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }
}

fn table_rows(dump: &Value) -> impl Iterator<Item = &Value> {
    dump.get("contents")
        .filter(|c| c.is_object())
        .and_then(|c| c.get("contents"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

/// Lowercased first element of every `parents` entry
fn parent_labels(dump: &Value) -> Vec<String> {
    dump.get("parents")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|parent| parent.as_array()?.first()?.as_str())
        .map(str::to_lowercase)
        .collect()
}

fn mentions(labels: &[String], keywords: &[&str]) -> bool {
    labels
        .iter()
        .any(|label| keywords.iter().any(|kw| label.contains(kw)))
}

fn type_is(obj: &Map<String, Value>, expected: i64) -> bool {
    obj.get("type").and_then(Value::as_f64) == Some(expected as f64)
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_messages_from_type_one() {
        let dump = json!({
            "type": 1,
            "contents": [
                {"id": "m1", "user_name": "Alice", "content": "hello", "time": "2024-01-01 10:00:00", "position": 1},
                {"id": "m2", "content": {"text": "structured"}, "time": 1704103200},
                {"id": "m3", "content": {"image": "x.jpg"}},
                "not a message"
            ]
        });
        let messages = extract_messages(&dump, "chat.js");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, "Alice");
        assert!(messages[0].is_sent);
        assert_eq!(messages[0].source_file, "chat.js");
        assert_eq!(messages[1].sender, "Unknown");
        assert_eq!(messages[1].content, "structured");
        assert!(!messages[1].is_sent);
        assert_eq!(messages[1].time, Some(RawTime::Epoch(1704103200.0)));
    }

    #[test]
    fn test_messages_nested_page_and_list() {
        let nested = json!({"page": {"type": 1, "contents": [{"id": "a", "content": "x"}]}});
        assert_eq!(extract_messages(&nested, "f").len(), 1);

        let list = json!([{"id": "b", "content": "y"}, {"id": "c", "body": "z"}]);
        let messages = extract_messages(&list, "f");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, "b");
    }

    #[test]
    fn test_missing_message_id_gets_uuid() {
        let dump = json!([{"content": "no id"}]);
        let messages = extract_messages(&dump, "f");
        assert!(Uuid::parse_str(&messages[0].id).is_ok());
    }

    #[test]
    fn test_duplicate_message_ids_dropped() {
        let dump = json!({
            "type": 1,
            "parents": [["微信"]],
            "contents": [{"id": "m1", "content": "a"}, {"id": "m1", "content": "a"}]
        });
        assert_eq!(extract(&dump, "f").records.messages.len(), 1);
    }

    #[test]
    fn test_contacts() {
        let dump = json!({
            "parents": [["通讯录"]],
            "contents": {"contents": [
                [["ID", "c1"], ["姓名", "张三"], [[["电话号码", "13800000000"], ["备注", "同事"]]]],
                [["ID"], ["姓名", "李四"]],
                ["too short"]
            ]}
        });
        let records = extract(&dump, "f").records;
        assert_eq!(records.contacts.len(), 2);
        assert_eq!(records.contacts[0].id, "c1");
        assert_eq!(records.contacts[0].phone(), "13800000000");
        assert_eq!(records.contacts[1].name, "李四");
        assert!(Uuid::parse_str(&records.contacts[1].id).is_ok());
        assert!(records.social_contacts.is_empty());
    }

    #[test]
    fn test_social_groups() {
        let dump = json!({
            "parents": [["微信"], ["群组"]],
            "contents": {"contents": [
                [["群ID", "g1"], ["群名", "家庭群"], [[["群公告", "周末聚餐"], ["人数", 8]]]]
            ]}
        });
        let records = extract(&dump, "f").records;
        assert_eq!(records.social_groups.len(), 1);
        assert_eq!(records.social_groups[0].group_name, "家庭群");
        assert_eq!(records.social_groups[0].announcement(), "周末聚餐");
        assert_eq!(records.social_groups[0].member_count(), "8");
    }

    #[test]
    fn test_social_contacts_pull_detail_fields() {
        let dump = json!({
            "parents": [["WeChat"], ["Contacts"]],
            "contents": {"contents": [
                [["id", "wx1"], ["nick", "bobby"], [[["备注", "cousin"], ["所在群", "family"], ["Phone", "555"]]]]
            ]}
        });
        let records = extract(&dump, "f").records;
        let contact = &records.social_contacts[0];
        assert_eq!(contact.wechat_id, "wx1");
        assert_eq!(contact.remark, "cousin");
        assert_eq!(contact.group_name, "family");
        assert_eq!(contact.phone, "555");
        assert_eq!(contact.details.len(), 3);
    }

    #[test]
    fn test_address_book_under_social_is_not_social_contact() {
        let dump = json!({
            "parents": [["微信"], ["通讯录联系人"]],
            "contents": {"contents": [[["id", "x"], ["name", "y"]]]}
        });
        let records = extract(&dump, "f").records;
        assert!(records.social_contacts.is_empty());
        assert_eq!(records.contacts.len(), 1);
    }

    #[test]
    fn test_device_info() {
        let dump = json!({
            "type": 0,
            "contents": {"contents": [
                [0, ["k", "型号"], ["v", "Pixel 7"]],
                [1, ["k", "系统版本"], ["Android 14"]],
                [2, ["k"], ["v", "ignored"]]
            ]}
        });
        let info = extract_device_info(&dump);
        assert_eq!(info.get("型号").map(String::as_str), Some("Pixel 7"));
        assert_eq!(info.get("系统版本").map(String::as_str), Some("Android 14"));
        assert_eq!(info.len(), 2);
    }

    #[test]
    fn test_app_summary() {
        let dump = json!({
            "parents": [["应用摘要"]],
            "contents": {"contents": [
                [["包名", "com.tencent.mm"], ["名称", "微信"], [[["版本", "8.0.1"], ["安装时间", "2023-05-01"]]]],
                [["包名", "com.example"], ["名称"]],
                "junk"
            ]}
        });
        let apps = extract(&dump, "apps.json").app_summary;
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].id, "com.tencent.mm");
        assert_eq!(apps[0].name, "微信");
        assert_eq!(apps[0].details.get("版本"), Some(&json!("8.0.1")));
        assert_eq!(apps[1].name, "Unknown");
        assert!(apps[1].details.is_empty());
    }

    #[test]
    fn test_call_records_lift_detail_fields() {
        let dump = json!({
            "parents": [["Call Log"]],
            "contents": {"contents": [
                [["ID", "call-1"], ["号码", "13900000000"], [[
                    ["通话时长", 65],
                    ["通话时间", "2024-01-01 10:00:00"],
                    ["呼叫类型", "呼出"],
                    ["是否删除", "否"]
                ]]],
                [["ID"], ["号码", "110"], [[["Duration", "3s"], ["Deleted", true]]]],
                [["ID", "short"], ["号码", "120"]]
            ]}
        });
        let calls = extract(&dump, "calls.json").call_records;
        assert_eq!(calls.len(), 2);

        let first = &calls[0];
        assert_eq!(first.id, "call-1");
        assert_eq!(first.phone, "13900000000");
        assert_eq!(first.duration.as_deref(), Some("65"));
        assert_eq!(first.time.as_deref(), Some("2024-01-01 10:00:00"));
        assert_eq!(first.call_type.as_deref(), Some("呼出"));
        assert_eq!(first.is_deleted.as_deref(), Some("否"));
        assert_eq!(first.details.len(), 4);

        let second = &calls[1];
        assert!(Uuid::parse_str(&second.id).is_ok());
        assert_eq!(second.duration.as_deref(), Some("3s"));
        assert_eq!(second.is_deleted.as_deref(), Some("true"));
        assert_eq!(second.call_type, None);
    }

    #[test]
    fn test_call_log_is_not_contacts() {
        let dump = json!({
            "parents": [["通话记录"]],
            "contents": {"contents": [[["ID", "c"], ["号码", "1"], [[]]]]}
        });
        let extracted = extract(&dump, "f");
        assert_eq!(extracted.call_records.len(), 1);
        assert!(extracted.records.is_empty());
        assert!(extracted.app_summary.is_empty());
    }

    #[test]
    fn test_unrecognized_dump_yields_nothing() {
        let extracted = extract(&json!({"parents": [["相册"]], "type": 3}), "f");
        assert!(extracted.records.is_empty());
        assert!(extracted.device_info.is_empty());
        assert!(extracted.app_summary.is_empty());
        assert!(extracted.call_records.is_empty());
    }
}
