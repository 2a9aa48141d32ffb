//! Reading and writing the flat export table.
//!
//! The table has a header row and one row per vote. Every field is written as
//! a JSON string and fields are joined with a comma:
//!
//! ```text
//! "variant","choice","timestamp","userAgent"
//! "nudged","mental-health","2024-03-01T10:00:00.000Z","Mozilla/5.0"
//! ```

use log::debug;
use serde_json::Value as JSValue;

use crate::model::{loose_text, Group, Record};

/// The column names, in the order they are written.
pub const HEADER: [&str; 4] = ["variant", "choice", "timestamp", "userAgent"];

/// Writes the records as a table. An absent origin is written as `""`.
///
/// An empty slice gives the header row alone, which reads back as no records.
pub fn serialize(records: &[Record]) -> String {
    let mut rows: Vec<String> = Vec::with_capacity(records.len() + 1);
    rows.push(encode_row(&HEADER));
    for r in records.iter() {
        rows.push(encode_row(&[
            r.group().label(),
            r.category(),
            r.timestamp(),
            r.origin().unwrap_or(""),
        ]));
    }
    rows.join("\n")
}

/// Reads a table back into records.
///
/// This never fails. Columns are looked up by name in the header, so they may
/// be missing or reordered; a missing column reads as an empty string. A
/// field that is not valid JSON is kept as raw text. Rows whose `variant` is
/// not a known group are dropped.
pub fn parse(text: &str) -> Vec<Record> {
    // Spreadsheet programs often save with a byte-order mark.
    let lines: Vec<&str> = text.trim_start_matches('\u{feff}').trim().lines().collect();
    if lines.len() <= 1 {
        return Vec::new();
    }

    let header: Vec<String> = split_fields(lines[0])
        .into_iter()
        .map(decode_field)
        .collect();
    let columns = Columns::from_header(&header);
    debug!("parse: header: {:?} columns: {:?}", header, columns);

    let mut res: Vec<Record> = Vec::new();
    for (idx, line) in lines.iter().enumerate().skip(1) {
        let fields: Vec<String> = split_fields(line).into_iter().map(decode_field).collect();
        let variant = Columns::get(&fields, columns.variant);
        let group = match Group::from_label(variant) {
            Some(g) => g,
            None => {
                debug!("parse: line {}: dropping row with variant {:?}", idx + 1, variant);
                continue;
            }
        };
        let record = Record::new(
            group,
            Columns::get(&fields, columns.choice),
            Columns::get(&fields, columns.timestamp),
        )
        .with_origin(Columns::get(&fields, columns.user_agent));
        res.push(record);
    }
    res
}

// Positions of the known columns in the header.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
struct Columns {
    variant: Option<usize>,
    choice: Option<usize>,
    timestamp: Option<usize>,
    user_agent: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> Columns {
        let find = |name: &str| header.iter().position(|h| h == name);
        Columns {
            variant: find(HEADER[0]),
            choice: find(HEADER[1]),
            timestamp: find(HEADER[2]),
            user_agent: find(HEADER[3]),
        }
    }

    fn get(fields: &[String], idx: Option<usize>) -> &str {
        idx.and_then(|i| fields.get(i))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

fn encode_row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| JSValue::String(f.to_string()).to_string())
        .collect::<Vec<String>>()
        .join(",")
}

// Try JSON first, then fall back to the raw text of the field.
fn decode_field(raw: &str) -> String {
    match serde_json::from_str::<JSValue>(raw) {
        Ok(js) => loose_text(js),
        Err(_) => raw.to_string(),
    }
}

// Splits a row on the commas that are not inside a JSON string.
// A field that opens a string without closing it is split on the next comma.
fn split_fields(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut fields: Vec<&str> = Vec::new();
    let mut start = 0;
    loop {
        let end = field_end(bytes, start);
        fields.push(&line[start..end]);
        if end >= bytes.len() {
            break;
        }
        start = end + 1;
    }
    fields
}

fn field_end(bytes: &[u8], start: usize) -> usize {
    let next_comma = |from: usize| {
        bytes[from..]
            .iter()
            .position(|b| *b == b',')
            .map(|p| from + p)
            .unwrap_or(bytes.len())
    };
    if bytes.get(start) != Some(&b'"') {
        return next_comma(start);
    }
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return next_comma(i + 1),
            _ => i += 1,
        }
    }
    next_comma(start)
}
