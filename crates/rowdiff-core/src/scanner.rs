//! Directory scanner pairing CSV files across two trees

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The same relative path found under both roots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePair {
    /// Path relative to the roots
    pub relative: PathBuf,
    pub left: PathBuf,
    pub right: PathBuf,
}

/// Result of scanning two directory trees
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairScan {
    /// Files present on both sides, sorted by relative path
    pub pairs: Vec<FilePair>,
    /// Relative paths only under the left root
    pub left_only: Vec<PathBuf>,
    /// Relative paths only under the right root
    pub right_only: Vec<PathBuf>,
}

impl PairScan {
    /// Find a pair by relative path
    pub fn find_pair(&self, relative: &Path) -> Option<&FilePair> {
        self.pairs.iter().find(|p| p.relative == relative)
    }
}

/// Collect CSV files under `root`, keyed by relative path
fn collect_csv_files(root: &Path) -> Result<BTreeMap<PathBuf, PathBuf>> {
    let mut files = BTreeMap::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        let path = entry.path();

        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !entry.file_type().is_file() || !is_csv {
            continue;
        }

        if let Ok(relative) = path.strip_prefix(root) {
            files.insert(relative.to_path_buf(), path.to_path_buf());
        }
    }

    Ok(files)
}

/// Scan two directory trees and pair CSV files by relative path
pub fn scan_pair<P: AsRef<Path>, Q: AsRef<Path>>(left_root: P, right_root: Q) -> Result<PairScan> {
    let left = collect_csv_files(left_root.as_ref())?;
    let mut right = collect_csv_files(right_root.as_ref())?;

    let mut scan = PairScan::default();

    for (relative, left_path) in left {
        match right.remove(&relative) {
            Some(right_path) => scan.pairs.push(FilePair {
                relative,
                left: left_path,
                right: right_path,
            }),
            None => scan.left_only.push(relative),
        }
    }
    scan.right_only = right.into_keys().collect();

    for path in scan.left_only.iter().chain(&scan.right_only) {
        log::warn!("{} has no counterpart", path.display());
    }

    Ok(scan)
}
