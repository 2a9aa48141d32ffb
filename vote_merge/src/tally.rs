use log::debug;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::Group;
use crate::DedupSet;

/// Vote counts per group and per category.
///
/// Every group is always present, with an empty map when nobody voted in it.
/// The table is derived from a [DedupSet] and never edited afterwards.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct TallyTable {
    // Indexed by Group::index.
    per_group: [BTreeMap<String, u64>; 2],
    totals: [u64; 2],
}

impl TallyTable {
    /// The count for one category in one group, 0 if nobody chose it.
    pub fn count(&self, group: Group, category: &str) -> u64 {
        self.per_group[group.index()]
            .get(category)
            .cloned()
            .unwrap_or(0)
    }

    /// The category counts of a group, sorted by category.
    pub fn group(&self, group: Group) -> &BTreeMap<String, u64> {
        &self.per_group[group.index()]
    }

    /// The number of votes in a group, whatever the category.
    pub fn total(&self, group: Group) -> u64 {
        self.totals[group.index()]
    }

    /// The largest single count in the table, and at least 1.
    ///
    /// Used to scale bars, so an empty table must not give 0.
    pub fn max_count(&self) -> u64 {
        self.per_group
            .iter()
            .flat_map(|m| m.values())
            .cloned()
            .max()
            .unwrap_or(0)
            .max(1)
    }

    /// All the categories that received at least one vote, in any group.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.per_group
            .iter()
            .flat_map(|m| m.keys())
            .map(|s| s.as_str())
            .collect()
    }
}

/// Counts the votes of a deduplicated set.
pub fn aggregate(votes: &DedupSet) -> TallyTable {
    let mut table = TallyTable::default();
    for r in votes.iter() {
        let idx = r.group().index();
        *table.per_group[idx]
            .entry(r.category().to_string())
            .or_insert(0) += 1;
        table.totals[idx] += 1;
    }
    debug!(
        "aggregate: {} votes, totals: {:?}",
        votes.len(),
        table.totals
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{reconcile, Record};

    #[test]
    fn counts_per_group_and_category() {
        let votes = reconcile(&[vec![
            Record::new(Group::Baseline, "x", "t1"),
            Record::new(Group::Baseline, "x", "t2"),
            Record::new(Group::Baseline, "x", "t3"),
            Record::new(Group::Baseline, "y", "t4"),
            Record::new(Group::Treatment, "x", "t5"),
            Record::new(Group::Treatment, "x", "t6"),
        ]]);
        let t = aggregate(&votes);
        assert_eq!(t.count(Group::Baseline, "x"), 3);
        assert_eq!(t.count(Group::Baseline, "y"), 1);
        assert_eq!(t.count(Group::Treatment, "x"), 2);
        assert_eq!(t.count(Group::Treatment, "y"), 0);
        assert_eq!(t.group(Group::Treatment).len(), 1);
        assert_eq!(t.max_count(), 3);
        assert_eq!(t.total(Group::Baseline), 4);
        assert_eq!(t.total(Group::Treatment), 2);
        assert_eq!(t.categories().into_iter().collect::<Vec<&str>>(), vec!["x", "y"]);
    }

    #[test]
    fn empty_set() {
        let none: [Vec<Record>; 0] = [];
        let t = aggregate(&reconcile(&none));
        for g in Group::ALL {
            assert!(t.group(g).is_empty());
            assert_eq!(t.total(g), 0);
        }
        assert_eq!(t.max_count(), 1);
        assert!(t.categories().is_empty());
    }

    #[test]
    fn unknown_categories_are_counted() {
        let votes = reconcile(&[vec![Record::new(Group::Treatment, "not-in-any-catalog", "t1")]]);
        let t = aggregate(&votes);
        assert_eq!(t.count(Group::Treatment, "not-in-any-catalog"), 1);
    }

    #[test]
    fn duplicates_are_not_counted_twice() {
        let export = vec![
            Record::new(Group::Treatment, "politics", "t1"),
            Record::new(Group::Baseline, "politics", "t2"),
        ];
        let t = aggregate(&reconcile(&[export.clone(), export]));
        assert_eq!(t.count(Group::Treatment, "politics"), 1);
        assert_eq!(t.total(Group::Baseline), 1);
    }
}
