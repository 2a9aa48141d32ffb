//! Merging and counting of vote events collected from several sources.
//!
//! Votes come from places that do not coordinate with each other: a local
//! store, a collection endpoint, exported files handed over by users. The
//! same vote routinely shows up in more than one of them. This crate merges
//! them without double counting ([reconcile]) and counts the result per group
//! and per category ([aggregate]).
//!
//! ```
//! use vote_merge::{aggregate, reconcile, Group, Record};
//!
//! let remote = vec![Record::new(Group::Treatment, "politics", "2024-03-01T10:00:00.000Z")];
//! let local = vec![
//!     Record::new(Group::Treatment, "politics", "2024-03-01T10:00:00.000Z"),
//!     Record::new(Group::Baseline, "education", "2024-03-01T10:00:02.000Z"),
//! ];
//! let votes = reconcile(&[remote, local]);
//! assert_eq!(votes.len(), 2);
//!
//! let tallies = aggregate(&votes);
//! assert_eq!(tallies.count(Group::Treatment, "politics"), 1);
//! assert_eq!(tallies.max_count(), 1);
//! ```

mod model;

pub mod codec;
pub mod manual;
pub mod tally;

use log::{debug, info};
use std::collections::HashSet;

pub use crate::model::*;
pub use crate::tally::{aggregate, TallyTable};

/// A collection of records in which no two share a [RecordKey].
///
/// The records keep the order in which they were first seen. The only way to
/// build one is [reconcile].
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct DedupSet {
    records: Vec<Record>,
}

impl DedupSet {
    pub fn records(&self) -> &[Record] {
        self.records.as_slice()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl AsRef<[Record]> for DedupSet {
    fn as_ref(&self) -> &[Record] {
        self.records()
    }
}

impl<'a> IntoIterator for &'a DedupSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Merges sequences of records into one [DedupSet].
///
/// The sequences are read in the order given. For each identity only the
/// first record seen is kept: a later record with the same key is dropped
/// even if its origin differs, nothing is merged field by field. Callers
/// control precedence through the order of `sources`.
///
/// Merging a set with itself gives the same set back.
pub fn reconcile<S: AsRef<[Record]>>(sources: &[S]) -> DedupSet {
    let total: usize = sources.iter().map(|s| s.as_ref().len()).sum();
    let mut seen: HashSet<RecordKey> = HashSet::with_capacity(total);
    let mut records: Vec<Record> = Vec::with_capacity(total);

    for (idx, source) in sources.iter().enumerate() {
        let mut kept = 0;
        for r in source.as_ref().iter() {
            if seen.insert(r.key()) {
                records.push(r.clone());
                kept += 1;
            }
        }
        debug!(
            "reconcile: source #{}: {} records, {} new",
            idx,
            source.as_ref().len(),
            kept
        );
    }

    info!(
        "reconcile: {} sources, {} records in, {} after deduplication",
        sources.len(),
        total,
        records.len()
    );
    DedupSet { records }
}
