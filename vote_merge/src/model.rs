// ********* Input data structures ***********

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::fmt::Display;

/// The presentation condition a vote was cast under.
///
/// The set of groups is closed. Readers must drop anything that does not map
/// to one of these variants instead of inventing a new group: the tally table
/// always has exactly one column per group.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Group {
    /// Options shown with neutral copy, in shuffled order.
    Baseline,
    /// One option highlighted and pre-selected.
    Treatment,
}

impl Group {
    pub const ALL: [Group; 2] = [Group::Baseline, Group::Treatment];

    /// The name written in exports and stores.
    pub fn label(&self) -> &'static str {
        match self {
            Group::Baseline => "neutral",
            Group::Treatment => "nudged",
        }
    }

    /// Maps a wire value to a group, or None when the value is outside of the
    /// closed set.
    pub fn from_label(label: &str) -> Option<Group> {
        match label {
            "neutral" | "baseline" => Some(Group::Baseline),
            "nudged" | "treatment" => Some(Group::Treatment),
            _ => None,
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Group::Baseline => 0,
            Group::Treatment => 1,
        }
    }
}

impl Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One vote event.
///
/// The fields are fixed at construction. Two records describe the same event
/// when their [RecordKey] is equal; the origin does not take part in that.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Record {
    group: Group,
    category: String,
    timestamp: String,
    origin: Option<String>,
}

impl Record {
    pub fn new(group: Group, category: &str, timestamp: &str) -> Record {
        Record {
            group,
            category: category.to_string(),
            timestamp: timestamp.to_string(),
            origin: None,
        }
    }

    /// Attaches a description of the submitting client.
    /// An empty origin is the same as no origin.
    pub fn with_origin(self, origin: &str) -> Record {
        Record {
            origin: if origin.is_empty() {
                None
            } else {
                Some(origin.to_string())
            },
            ..self
        }
    }

    pub fn group(&self) -> Group {
        self.group
    }

    pub fn category(&self) -> &str {
        self.category.as_str()
    }

    pub fn timestamp(&self) -> &str {
        self.timestamp.as_str()
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// The identity of this event.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            group: self.group,
            category: self.category.clone(),
            timestamp: self.timestamp.clone(),
        }
    }
}

/// The identity of a vote event: (group, category, timestamp).
///
/// Timestamps are millisecond ISO strings, fine enough that distinct events
/// practically never share a key. The expected collision is the same export
/// being read twice.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct RecordKey {
    pub group: Group,
    pub category: String,
    pub timestamp: String,
}

/// A vote as it is stored locally and served by the collection endpoint.
///
/// Every field is loose, so that one bad element does not spoil the array
/// around it. Values that are not strings are read with [loose_text], the
/// same rule as the fields of the export table. Use
/// [WireRecord::into_record] to apply the group guard.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct WireRecord {
    #[serde(default)]
    pub variant: JSValue,
    #[serde(default)]
    pub choice: JSValue,
    #[serde(default)]
    pub ts: JSValue,
    #[serde(rename = "userAgent", default)]
    pub user_agent: JSValue,
}

/// The text of a JSON value: a string as is, null as empty, anything else as
/// its JSON form.
pub fn loose_text(js: JSValue) -> String {
    match js {
        JSValue::String(s) => s,
        JSValue::Null => String::new(),
        other => other.to_string(),
    }
}

impl WireRecord {
    /// None if the variant is not a known group.
    pub fn into_record(self) -> Option<Record> {
        let group = Group::from_label(self.variant.as_str()?)?;
        let record = Record::new(
            group,
            loose_text(self.choice).as_str(),
            loose_text(self.ts).as_str(),
        );
        Some(record.with_origin(loose_text(self.user_agent).as_str()))
    }
}

impl From<&Record> for WireRecord {
    fn from(r: &Record) -> WireRecord {
        WireRecord {
            variant: JSValue::from(r.group.label()),
            choice: JSValue::from(r.category.as_str()),
            ts: JSValue::from(r.timestamp.as_str()),
            user_agent: r
                .origin
                .as_deref()
                .map(JSValue::from)
                .unwrap_or(JSValue::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_not_part_of_the_key() {
        let a = Record::new(Group::Baseline, "politics", "2024-03-01T10:00:00.000Z")
            .with_origin("Mozilla/5.0");
        let b = Record::new(Group::Baseline, "politics", "2024-03-01T10:00:00.000Z");
        assert_ne!(a, b);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn group_is_part_of_the_key() {
        let a = Record::new(Group::Baseline, "politics", "2024-03-01T10:00:00.000Z");
        let b = Record::new(Group::Treatment, "politics", "2024-03-01T10:00:00.000Z");
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn empty_origin_is_absent() {
        let r = Record::new(Group::Treatment, "education", "t").with_origin("");
        assert_eq!(r.origin(), None);
    }

    #[test]
    fn labels() {
        assert_eq!(Group::from_label("neutral"), Some(Group::Baseline));
        assert_eq!(Group::from_label("treatment"), Some(Group::Treatment));
        assert_eq!(Group::from_label("Nudged"), None);
        assert_eq!(Group::from_label(""), None);
        for g in Group::ALL {
            assert_eq!(Group::from_label(g.label()), Some(g));
        }
    }

    #[test]
    fn wire_record_guard() {
        let ok: WireRecord = serde_json::from_str(
            r#"{"variant":"nudged","choice":"mental-health","ts":"2024-03-01T10:00:00.000Z","userAgent":"curl"}"#,
        )
        .unwrap();
        let r = ok.into_record().unwrap();
        assert_eq!(r.group(), Group::Treatment);
        assert_eq!(r.origin(), Some("curl"));

        let bad: WireRecord =
            serde_json::from_str(r#"{"variant":"control","choice":"x","ts":"t"}"#).unwrap();
        assert_eq!(bad.into_record(), None);
    }

    #[test]
    fn wire_record_tolerates_non_string_fields() {
        let w: WireRecord = serde_json::from_str(
            r#"{"variant":"neutral","choice":"politics","ts":1709287200000,"userAgent":42}"#,
        )
        .unwrap();
        assert_eq!(
            w.into_record(),
            Some(Record::new(Group::Baseline, "politics", "1709287200000").with_origin("42"))
        );

        let w: WireRecord =
            serde_json::from_str(r#"{"variant":"nudged","choice":"x","ts":"t","userAgent":null}"#)
                .unwrap();
        assert_eq!(w.into_record(), Some(Record::new(Group::Treatment, "x", "t")));

        let w: WireRecord = serde_json::from_str(r#"{"variant":1,"choice":"x","ts":"t"}"#).unwrap();
        assert_eq!(w.into_record(), None);
    }

    #[test]
    fn wire_record_from_record() {
        let r = Record::new(Group::Baseline, "defenses", "t1");
        let w = WireRecord::from(&r);
        assert_eq!(
            serde_json::to_string(&w).unwrap(),
            r#"{"variant":"neutral","choice":"defenses","ts":"t1","userAgent":null}"#
        );
        assert_eq!(w.into_record(), Some(r));
    }
}
