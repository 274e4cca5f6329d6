//! Forensic dump loader: decoding, cleanup, JSON parse
//!
//! Extraction tools write dumps as JSON wrapped in a JavaScript assignment
//! (`var page = {...};`), in whatever encoding the workstation used, with
//! stray control characters. The loader undoes all of that before parsing.

use crate::error::IngestError;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::path::Path;
use std::sync::OnceLock;

static CONTROL_RE: OnceLock<Regex> = OnceLock::new();

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const PAGE_PREFIX: &str = "var page = ";
const PICO_PREFIX: &str = ";static.mypico.json.";

/// Reads and parses one dump file.
pub fn load_dump(path: &Path) -> Result<Value, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(IngestError::Empty(path.to_path_buf()));
    }

    let text = decode(&bytes);
    let cleaned = strip_control(&text);
    let payload = unwrap_payload(&cleaned);
    if payload.is_empty() {
        return Err(IngestError::Empty(path.to_path_buf()));
    }
    serde_json::from_str(payload).map_err(|source| IngestError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Decodes dump bytes: UTF-8, then BOM-marked UTF-16, then GB18030, then
/// lossy UTF-8.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }

    if let Some((encoding, bom_len)) = encoding_rs::Encoding::for_bom(bytes) {
        if let Some(text) =
            encoding.decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        {
            return text;
        }
    }

    if let Some(text) =
        encoding_rs::GB18030.decode_without_bom_handling_and_without_replacement(bytes)
    {
        return text;
    }

    tracing::warn!("dump is in no known encoding, decoding lossily");
    String::from_utf8_lossy(bytes)
}

/// Removes C0 and C1 control characters, including newlines and tabs.
pub fn strip_control(text: &str) -> Cow<'_, str> {
    let re = CONTROL_RE.get_or_init(|| Regex::new(r"[\x00-\x1F\x7F-\x9F]").unwrap());
    re.replace_all(text, "")
}

/// Strips the JavaScript wrapper around the JSON payload.
pub fn unwrap_payload(text: &str) -> &str {
    let mut payload = text.trim();
    if let Some(rest) = payload.strip_prefix(PAGE_PREFIX) {
        payload = rest;
    } else if payload.starts_with(PICO_PREFIX) {
        if let Some(eq) = payload.find('=') {
            payload = payload[eq + 1..].trim();
        }
    }
    match payload.strip_suffix(';') {
        Some(rest) => rest.trim(),
        None => payload,
    }
}
