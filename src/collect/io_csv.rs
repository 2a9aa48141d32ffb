// Primitives for reading exported CSV files.

use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use vote_merge::{codec, Record};

pub const EXPORT_EXTENSION: &str = ".csv";

fn is_export(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.ends_with(EXPORT_EXTENSION))
        .unwrap_or(false)
}

/// The files to import for a path: the path itself if it names an export, or
/// the exports directly inside it, sorted by name.
pub fn collect_csv_paths(path: &Path) -> Vec<PathBuf> {
    if path.is_dir() {
        let entries = match fs::read_dir(path) {
            Ok(e) => e,
            Err(e) => {
                warn!("collect_csv_paths: could not list {}: {}", path.display(), e);
                return vec![];
            }
        };
        let mut res: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_export(p))
            .collect();
        res.sort();
        debug!(
            "collect_csv_paths: {} exports in {}",
            res.len(),
            path.display()
        );
        res
    } else if is_export(path) {
        vec![path.to_path_buf()]
    } else {
        info!(
            "collect_csv_paths: skipping {}: not a {} file",
            path.display(),
            EXPORT_EXTENSION
        );
        vec![]
    }
}

/// The votes of one export. An unreadable file gives no votes.
pub fn read_csv_votes(path: &Path) -> Vec<Record> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            warn!("read_csv_votes: could not read {}: {}", path.display(), e);
            return vec![];
        }
    };
    let text = String::from_utf8_lossy(&bytes);
    let res = codec::parse(&text);
    info!("read_csv_votes: {} votes in {}", res.len(), path.display());
    res
}
