//! Concurrent filesystem traversal and size aggregation.

mod aggregate;
mod entry;
mod options;
mod pool;
mod progress;
mod walker;

pub use aggregate::{DirSizeTable, FileList, ScanStats, SizeRecord, StatsSnapshot};
pub use entry::{DirReader, RawEntry, ReaderKind};
pub use options::ScanOptions;
pub use pool::{PoolHandle, WaitGroup, WaitGroupGuard, WorkerPool};
pub use progress::ProgressReporter;
pub use walker::{scan, ScanOutcome};
