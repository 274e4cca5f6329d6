//! Document store: flattens typed records into the position-indexed corpus

use crate::records::{RecordBatch, SkippedRecord};
use crate::time::parse_raw_time;
use crate::types::{
    ContactMeta, DocKey, DocMetadata, DocType, Document, GroupMeta, MessageMeta,
    SocialContactMeta,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;

/// Position of a message document plus its parsed timestamp
#[derive(Debug, Clone)]
pub(crate) struct MessageRow {
    pub position: usize,
    pub time: Option<NaiveDateTime>,
}

/// Counts from one normalization pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub documents: usize,
    pub messages: usize,
    pub contacts: usize,
    pub social_groups: usize,
    pub social_contacts: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// Ordered corpus. A document's position is its key into both indexes.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
    messages: Vec<MessageRow>,
    by_key: HashMap<DocKey, usize>,
}

impl DocumentStore {
    /// Builds the corpus in a fixed order: messages, contacts, social groups,
    /// social contacts. Records without an id are skipped and reported.
    pub fn from_records(batch: &RecordBatch) -> (Self, LoadReport) {
        let mut store = Self::default();
        let mut report = LoadReport::default();

        for (position, msg) in batch.messages.iter().enumerate() {
            if !has_id(&msg.id, DocType::Message, position, &mut report) {
                continue;
            }
            let text = join_fields(&[&msg.sender, &msg.content]);
            let doc_position = store.push(Document::new(
                text,
                DocMetadata::Message(MessageMeta {
                    id: msg.id.clone(),
                    sender: msg.sender.clone(),
                    content: msg.content.clone(),
                    time: msg.time_text(),
                    source: msg.source_file.clone(),
                    is_sent: msg.is_sent,
                }),
            ));
            store.messages.push(MessageRow {
                position: doc_position,
                time: msg.time.as_ref().and_then(parse_raw_time),
            });
            report.messages += 1;
        }

        for (position, contact) in batch.contacts.iter().enumerate() {
            if !has_id(&contact.id, DocType::Contact, position, &mut report) {
                continue;
            }
            let phone = contact.phone();
            store.push(Document::new(
                join_fields(&[&contact.name, &phone]),
                DocMetadata::Contact(ContactMeta {
                    id: contact.id.clone(),
                    name: contact.name.clone(),
                    phone,
                }),
            ));
            report.contacts += 1;
        }

        for (position, group) in batch.social_groups.iter().enumerate() {
            if !has_id(&group.group_id, DocType::SocialGroup, position, &mut report) {
                continue;
            }
            let announcement = group.announcement();
            store.push(Document::new(
                join_fields(&[&group.group_name, &announcement]),
                DocMetadata::SocialGroup(GroupMeta {
                    id: group.group_id.clone(),
                    name: group.group_name.clone(),
                    announcement,
                    member_count: group.member_count(),
                }),
            ));
            report.social_groups += 1;
        }

        for (position, contact) in batch.social_contacts.iter().enumerate() {
            if !has_id(&contact.wechat_id, DocType::SocialContact, position, &mut report) {
                continue;
            }
            store.push(Document::new(
                join_fields(&[&contact.nickname, &contact.remark, &contact.group_name]),
                DocMetadata::SocialContact(SocialContactMeta {
                    id: contact.wechat_id.clone(),
                    nickname: contact.nickname.clone(),
                    remark: contact.remark.clone(),
                    group_name: contact.group_name.clone(),
                    phone: contact.phone.clone(),
                }),
            ));
            report.social_contacts += 1;
        }

        report.documents = store.documents.len();
        (store, report)
    }

    fn push(&mut self, doc: Document) -> usize {
        let position = self.documents.len();
        self.by_key.entry(doc.key()).or_insert(position);
        self.documents.push(doc);
        position
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, position: usize) -> Option<&Document> {
        self.documents.get(position)
    }

    /// First document with this key, in corpus order
    pub fn lookup(&self, key: &DocKey) -> Option<&Document> {
        self.by_key.get(key).and_then(|&pos| self.documents.get(pos))
    }

    pub fn count(&self, doc_type: DocType) -> usize {
        self.documents
            .iter()
            .filter(|d| d.doc_type == doc_type)
            .count()
    }

    pub(crate) fn message_rows(&self) -> &[MessageRow] {
        &self.messages
    }

    pub(crate) fn message_meta(&self, position: usize) -> Option<&MessageMeta> {
        match self.documents.get(position).map(|d| &d.metadata) {
            Some(DocMetadata::Message(meta)) => Some(meta),
            _ => None,
        }
    }
}

fn has_id(id: &str, kind: DocType, position: usize, report: &mut LoadReport) -> bool {
    if !id.trim().is_empty() {
        return true;
    }
    tracing::warn!(%kind, position, "skipping record without id");
    report.skipped.push(SkippedRecord {
        kind,
        position,
        reason: "missing id".to_string(),
    });
    false
}

fn join_fields(fields: &[&str]) -> String {
    fields.join(" ")
}
