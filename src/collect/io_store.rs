// The local vote store: one JSON array per group.

use log::{debug, info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value as JSValue;

use vote_merge::{Group, Record, WireRecord};

use crate::collect::io_common::{json_items, records_from_items};

pub const SLOT_PREFIX: &str = "autonomy-demo-local-";

#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: &Path) -> LocalStore {
        LocalStore {
            dir: dir.to_path_buf(),
        }
    }

    pub fn slot_path(&self, group: Group) -> PathBuf {
        self.dir
            .join(format!("{}{}.json", SLOT_PREFIX, group.label()))
    }

    // The raw elements, so that appending keeps whatever was there.
    fn read_items(&self, group: Group) -> Vec<JSValue> {
        let path = self.slot_path(group);
        match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => vec![],
            Ok(contents) => json_items(&contents, &path.display().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("read_items: no slot at {}", path.display());
                vec![]
            }
            Err(e) => {
                warn!("read_items: could not read {}: {}", path.display(), e);
                vec![]
            }
        }
    }

    pub fn read_slot(&self, group: Group) -> Vec<Record> {
        records_from_items(self.read_items(group))
    }

    /// The votes of both slots, neutral first.
    pub fn read_all(&self) -> Vec<Record> {
        let mut res: Vec<Record> = Vec::new();
        for g in Group::ALL {
            res.extend(self.read_slot(g));
        }
        debug!("read_all: {} votes in {}", res.len(), self.dir.display());
        res
    }

    /// Appends a vote to the slot of its group and returns the slot contents.
    ///
    /// A failed write is logged, the returned contents still include the vote.
    pub fn append(&self, record: &Record) -> Vec<Record> {
        let group = record.group();
        let mut items = self.read_items(group);
        match serde_json::to_value(WireRecord::from(record)) {
            Ok(js) => items.push(js),
            Err(e) => warn!("append: could not encode {:?}: {}", record, e),
        }
        let path = self.slot_path(group);
        let write_res = fs::create_dir_all(&self.dir).and_then(|_| {
            let contents = serde_json::to_string(&items)
                .map_err(|e| std::io::Error::new(ErrorKind::Other, e))?;
            fs::write(&path, contents)
        });
        if let Err(e) = write_res {
            warn!("append: could not write {}: {}", path.display(), e);
        }
        records_from_items(items)
    }

    /// Removes both slots. Missing slots are not an error.
    pub fn clear(&self) {
        for g in Group::ALL {
            let path = self.slot_path(g);
            match fs::remove_file(&path) {
                Ok(_) => info!("clear: removed {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!("clear: could not remove {}: {}", path.display(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(&dir.path().join("nested").join("store"));
        assert!(store.read_all().is_empty());

        let a = Record::new(Group::Treatment, "politics", "t1").with_origin("ua");
        let b = Record::new(Group::Baseline, "education", "t2");
        let c = Record::new(Group::Treatment, "creativity", "t3");
        assert_eq!(store.append(&a), vec![a.clone()]);
        store.append(&b);
        assert_eq!(store.append(&c), vec![a.clone(), c.clone()]);

        assert_eq!(store.read_slot(Group::Baseline), vec![b.clone()]);
        assert_eq!(store.read_all(), vec![b, a, c]);
        assert!(store
            .slot_path(Group::Treatment)
            .ends_with("autonomy-demo-local-nudged.json"));
    }

    #[test]
    fn corrupt_slot_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        fs::write(store.slot_path(Group::Baseline), "{ not json").unwrap();
        fs::write(store.slot_path(Group::Treatment), "").unwrap();
        assert!(store.read_all().is_empty());

        // Appending starts a fresh array.
        let a = Record::new(Group::Baseline, "x", "t1");
        assert_eq!(store.append(&a), vec![a]);
    }

    #[test]
    fn foreign_elements_are_kept_on_append() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        fs::write(
            store.slot_path(Group::Baseline),
            r#"[{"note":"hand edited"},{"variant":"neutral","choice":"x","ts":"t0"}]"#,
        )
        .unwrap();
        store.append(&Record::new(Group::Baseline, "y", "t1"));

        let contents = fs::read_to_string(store.slot_path(Group::Baseline)).unwrap();
        let js: JSValue = serde_json::from_str(&contents).unwrap();
        assert_eq!(js.as_array().unwrap().len(), 3);
        assert_eq!(js[0]["note"], "hand edited");
        assert_eq!(store.read_slot(Group::Baseline).len(), 2);
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store.append(&Record::new(Group::Treatment, "x", "t1"));
        store.clear();
        assert!(store.read_all().is_empty());
        assert!(!store.slot_path(Group::Treatment).exists());
        store.clear();
    }
}
