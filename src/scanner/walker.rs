use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::{HogsError, Result};

use super::aggregate::{DirSizeTable, FileList, ScanStats, SizeRecord, StatsSnapshot};
use super::entry::{DirReader, ReaderKind};
use super::options::ScanOptions;
use super::pool::{PoolHandle, WaitGroup, WaitGroupGuard, WorkerPool};
use super::progress::ProgressReporter;

/// Everything one scan owns. Built per call and torn down at the end, so
/// concurrent scans in one process never share state.
struct ScanContext {
    root: PathBuf,
    reader: ReaderKind,
    files: FileList,
    dir_sizes: DirSizeTable,
    stats: Arc<ScanStats>,
}

/// Result of one completed scan: every file found, every directory with
/// its accumulated total, and the run counters.
#[derive(Debug)]
pub struct ScanOutcome {
    pub root: PathBuf,
    pub files: Vec<SizeRecord>,
    pub dirs: Vec<SizeRecord>,
    pub stats: StatsSnapshot,
    pub elapsed: Duration,
}

/// Walk everything under `root` and measure it.
///
/// Only an unusable root is an error. Entries that vanish mid-scan or
/// cannot be read are logged, counted as skipped, and left out of the
/// results; the scan itself keeps going.
pub fn scan(root: &Path, options: &ScanOptions) -> Result<ScanOutcome> {
    let start = Instant::now();

    let root = match root.canonicalize() {
        Ok(path) => path,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(HogsError::PathNotFound(root.to_path_buf()));
        }
        Err(source) => {
            return Err(HogsError::Io {
                path: root.to_path_buf(),
                source,
            });
        }
    };
    let meta = fs::metadata(&root).map_err(|source| HogsError::Io {
        path: root.clone(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(HogsError::NotADirectory(root));
    }

    let jobs = options.effective_jobs();
    info!(path = %root.display(), jobs, "Starting scan");

    let ctx = Arc::new(ScanContext {
        root: root.clone(),
        reader: options.reader,
        files: FileList::new(),
        dir_sizes: DirSizeTable::new(),
        stats: Arc::new(ScanStats::default()),
    });

    let reporter = ProgressReporter::start(Arc::clone(&ctx.stats), options.progress);
    let pool = WorkerPool::new(jobs);
    let wg = WaitGroup::new();

    // The root is a directory of the scan too: it gets a row even when
    // it holds nothing at all.
    ctx.dir_sizes.register(&ctx.root);
    ctx.stats.record_dir();

    {
        let guard = wg.enter();
        let handle = pool.handle();
        let task_handle = handle.clone();
        let task_ctx = Arc::clone(&ctx);
        let task_wg = wg.clone();
        let accepted = handle.submit(move || {
            let dir = task_ctx.root.clone();
            walk_dir(&task_ctx, &task_handle, &task_wg, dir, guard);
        });
        if !accepted {
            debug!("worker pool rejected the root task");
        }
    }

    wg.wait();
    reporter.finish();
    // Joining the workers guarantees no task environment still holds a
    // reference to the context.
    drop(pool);

    let ScanContext {
        files,
        dir_sizes,
        stats,
        ..
    } = Arc::into_inner(ctx).expect("all scan tasks joined");

    let outcome = ScanOutcome {
        root,
        files: files.into_inner(),
        dirs: dir_sizes.into_records(),
        stats: stats.snapshot(),
        elapsed: start.elapsed(),
    };
    info!(
        files = outcome.stats.files,
        dirs = outcome.stats.dirs,
        skipped = outcome.stats.skipped,
        elapsed_ms = outcome.elapsed.as_millis() as u64,
        "Scan complete"
    );
    Ok(outcome)
}

/// Traversal task for one directory: enumerate entries, stat the files,
/// hand subdirectories to the pool, then flush this directory's batch in
/// one lock touch and one upward walk.
fn walk_dir(
    ctx: &Arc<ScanContext>,
    pool: &PoolHandle,
    wg: &WaitGroup,
    dir: PathBuf,
    _guard: WaitGroupGuard,
) {
    let mut local_files: Vec<SizeRecord> = Vec::new();
    let mut local_bytes: u64 = 0;
    let mut subdirs: Vec<PathBuf> = Vec::new();

    let reader = DirReader::open(&dir, ctx.reader);
    if reader.failed() {
        ctx.stats.record_skip();
    }
    for entry in reader {
        let path = dir.join(&entry.name);
        if entry.is_dir {
            // Registered at discovery, so the directory keeps its row
            // even if its own task never runs.
            ctx.dir_sizes.register(&path);
            ctx.stats.record_dir();
            subdirs.push(path);
        } else {
            match fs::metadata(&path) {
                Ok(meta) => {
                    let size = meta.len();
                    local_bytes += size;
                    ctx.stats.record_file(size);
                    local_files.push(SizeRecord { path, size });
                }
                Err(err) => {
                    debug!(path = %path.display(), %err, "Skipping unreadable entry");
                    ctx.stats.record_skip();
                }
            }
        }
    }

    for sub in subdirs {
        let guard = wg.enter();
        let task_ctx = Arc::clone(ctx);
        let task_pool = pool.clone();
        let task_wg = wg.clone();
        let accepted = pool.submit(move || walk_dir(&task_ctx, &task_pool, &task_wg, sub, guard));
        if !accepted {
            // The rejected closure dropped its guard, so the wait-group
            // still drains; the subtree just goes unscanned.
            ctx.stats.record_skip();
            debug!("worker pool rejected a traversal task");
        }
    }

    ctx.files.extend(local_files);
    if local_bytes > 0 {
        ctx.dir_sizes.propagate(&ctx.root, &dir, local_bytes);
    }
}
