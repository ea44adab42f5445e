use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use dashmap::DashMap;
use serde::Serialize;

/// A path and its measured size in bytes. One row of a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeRecord {
    pub path: PathBuf,
    pub size: u64,
}

/// Thread-safe directory path to accumulated size table.
///
/// Sharded so tasks updating disjoint subtrees rarely contend. Every
/// update is a read-modify-write under the key's shard lock, so
/// concurrent increments to the same directory are never lost.
#[derive(Default)]
pub struct DirSizeTable {
    sizes: DashMap<PathBuf, u64>,
}

impl DirSizeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a directory with size zero if unseen. Keeps empty
    /// directories visible in the final ranking.
    pub fn register(&self, dir: &Path) {
        self.sizes.entry(dir.to_path_buf()).or_insert(0);
    }

    /// Add `bytes` to `dir` and to every ancestor up to and including
    /// `root`, then stop. A path outside the root's ancestry terminates
    /// at the filesystem root instead of looping.
    pub fn propagate(&self, root: &Path, dir: &Path, bytes: u64) {
        let mut current = dir;
        loop {
            self.sizes
                .entry(current.to_path_buf())
                .and_modify(|total| *total += bytes)
                .or_insert(bytes);

            if current == root {
                break;
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
    }

    pub fn get(&self, dir: &Path) -> Option<u64> {
        self.sizes.get(dir).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn into_records(self) -> Vec<SizeRecord> {
        self.sizes
            .into_iter()
            .map(|(path, size)| SizeRecord { path, size })
            .collect()
    }
}

/// Shared list of discovered files.
///
/// Tasks append one batch per directory, so the lock is taken once per
/// directory rather than once per file.
#[derive(Default)]
pub struct FileList {
    files: Mutex<Vec<SizeRecord>>,
}

impl FileList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&self, batch: Vec<SizeRecord>) {
        if batch.is_empty() {
            return;
        }
        self.files.lock().unwrap().extend(batch);
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_inner(self) -> Vec<SizeRecord> {
        self.files.into_inner().unwrap()
    }
}

/// Live counters updated by traversal tasks and read by the progress
/// line. Relaxed ordering throughout; these feed presentation and the
/// final summary, not control flow.
#[derive(Debug, Default)]
pub struct ScanStats {
    files: AtomicU64,
    dirs: AtomicU64,
    bytes: AtomicU64,
    skipped: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub files: u64,
    pub dirs: u64,
    pub bytes: u64,
    pub skipped: u64,
}

impl ScanStats {
    pub fn record_file(&self, size: u64) {
        self.files.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(size, Ordering::Relaxed);
    }

    pub fn record_dir(&self) {
        self.dirs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn files(&self) -> u64 {
        self.files.load(Ordering::Relaxed)
    }

    pub fn dirs(&self) -> u64 {
        self.dirs.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            files: self.files.load(Ordering::Relaxed),
            dirs: self.dirs.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}
