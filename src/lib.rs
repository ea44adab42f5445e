//! space-hogs - find what is eating your disk
//!
//! This crate provides functionality for:
//! - Concurrent recursive traversal over a bounded worker pool
//! - Per-directory size totals propagated up to the scanned root
//! - Ranked top-N reports for files and directories

pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod scanner;

// Re-export commonly used types
pub use config::Config;
pub use error::{HogsError, Result};
pub use scanner::{scan, ScanOptions, ScanOutcome, SizeRecord};
