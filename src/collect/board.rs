use log::{debug, info};
use std::sync::Arc;

use vote_merge::{aggregate, codec, reconcile, DedupSet, Record, TallyTable};

use crate::collect::io_store::LocalStore;

/// The merged votes of a run and their counts.
///
/// The set and the table are replaced as a whole whenever new votes are
/// absorbed. A snapshot taken before stays valid and unchanged.
#[derive(Debug, Clone, Default)]
pub struct ResultsBoard {
    votes: Arc<DedupSet>,
    tallies: Arc<TallyTable>,
}

impl ResultsBoard {
    /// Merges the votes of one source after the ones already on the board.
    /// Returns the number of new votes.
    pub fn absorb(&mut self, source: &str, records: Vec<Record>) -> usize {
        let before = self.votes.len();
        let merged = reconcile(&[self.votes.records(), records.as_slice()]);
        let added = merged.len() - before;
        info!(
            "absorb: {}: {} votes read, {} new, {} in total",
            source,
            records.len(),
            added,
            merged.len()
        );
        self.tallies = Arc::new(aggregate(&merged));
        self.votes = Arc::new(merged);
        added
    }

    /// Empties the local store and the board.
    pub fn clear(&mut self, store: &LocalStore) {
        store.clear();
        self.votes = Arc::new(DedupSet::default());
        self.tallies = Arc::new(TallyTable::default());
        debug!("clear: board emptied");
    }

    pub fn snapshot(&self) -> Arc<DedupSet> {
        self.votes.clone()
    }

    pub fn tallies(&self) -> Arc<TallyTable> {
        self.tallies.clone()
    }

    /// The merged votes in the export format.
    pub fn export(&self) -> String {
        codec::serialize(self.votes.records())
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}
