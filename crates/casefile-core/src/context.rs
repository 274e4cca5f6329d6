//! Conversation context: time-ordered neighbours of a message within its source

use crate::store::DocumentStore;
use crate::types::ContextMessage;

/// Returns up to `window` messages on each side of `message_id`, taken from
/// the same source and ordered by time ascending (ties keep corpus order).
///
/// Messages with unparseable times take no part in the ordering. An unknown
/// id, or a target without a usable time, yields an empty list.
pub(crate) fn conversation_context(
    store: &DocumentStore,
    message_id: &str,
    window: usize,
) -> Vec<ContextMessage> {
    let rows = store.message_rows();
    let Some(target) = rows.iter().find(|row| {
        store
            .message_meta(row.position)
            .is_some_and(|meta| meta.id == message_id)
    }) else {
        tracing::warn!(message_id, "context lookup: message not found");
        return Vec::new();
    };
    let Some(source) = store.message_meta(target.position).map(|m| m.source.as_str()) else {
        return Vec::new();
    };
    if target.time.is_none() {
        tracing::warn!(message_id, "context lookup: message has no parseable time");
        return Vec::new();
    }

    let mut thread: Vec<_> = rows
        .iter()
        .filter(|row| row.time.is_some())
        .filter(|row| {
            store
                .message_meta(row.position)
                .is_some_and(|meta| meta.source == source)
        })
        .collect();
    thread.sort_by_key(|row| row.time);

    let Some(idx) = thread.iter().position(|row| row.position == target.position) else {
        return Vec::new();
    };
    let start = idx.saturating_sub(window);
    let end = thread.len().min(idx + window + 1);

    thread[start..end]
        .iter()
        .filter_map(|row| {
            store.message_meta(row.position).map(|meta| ContextMessage {
                message: meta.clone(),
                is_current: row.position == target.position,
                highlighted_content: None,
            })
        })
        .collect()
}
