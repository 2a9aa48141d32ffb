use log::{debug, warn};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde_json::Value as JSValue;

use vote_merge::{Record, WireRecord};

pub fn simplify_file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// The current instant, as the voting page writes it: `2024-03-01T10:00:00.000Z`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn default_origin() -> String {
    format!("votemerge/{}", env!("CARGO_PKG_VERSION"))
}

/// The elements of a JSON array. Anything else gives no elements.
pub fn json_items(contents: &str, source: &str) -> Vec<JSValue> {
    match serde_json::from_str::<JSValue>(contents) {
        Ok(JSValue::Array(items)) => items,
        Ok(other) => {
            warn!(
                "json_items: {}: expected an array, found {}",
                source,
                json_kind(&other)
            );
            vec![]
        }
        Err(e) => {
            warn!("json_items: {}: invalid JSON: {}", source, e);
            vec![]
        }
    }
}

fn json_kind(js: &JSValue) -> &'static str {
    match js {
        JSValue::Null => "null",
        JSValue::Bool(_) => "a boolean",
        JSValue::Number(_) => "a number",
        JSValue::String(_) => "a string",
        JSValue::Array(_) => "an array",
        JSValue::Object(_) => "an object",
    }
}

/// Converts array elements to records, skipping the malformed ones and the
/// ones with an unknown group.
pub fn records_from_items(items: Vec<JSValue>) -> Vec<Record> {
    let num_items = items.len();
    let res: Vec<Record> = items
        .into_iter()
        .filter_map(|js| serde_json::from_value::<WireRecord>(js).ok())
        .filter_map(|w| w.into_record())
        .collect();
    if res.len() < num_items {
        debug!(
            "records_from_items: skipped {} of {} elements",
            num_items - res.len(),
            num_items
        );
    }
    res
}

pub fn records_from_json(contents: &str, source: &str) -> Vec<Record> {
    records_from_items(json_items(contents, source))
}
