use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use rayon::prelude::*;
use serde::Serialize;

use crate::scanner::{ScanOutcome, SizeRecord, StatsSnapshot};

/// When to emit ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Color when stdout is a terminal and NO_COLOR is unset.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Lenient parse; anything unrecognized falls back to auto.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "always" => ColorMode::Always,
            "never" => ColorMode::Never,
            _ => ColorMode::Auto,
        }
    }

    pub fn enabled(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::env::var_os("NO_COLOR").is_none() && io::stdout().is_tty(),
        }
    }
}

/// Largest-first selection: size descending, path ascending on ties, so
/// the same tree always ranks the same way. Keeps at most `k` rows.
pub fn top_k(mut records: Vec<SizeRecord>, k: usize) -> Vec<SizeRecord> {
    records.par_sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
    records.truncate(k);
    records
}

/// 1024-divisor units with one decimal: "512 B", "1.5 KB", "2.0 GB".
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["KB", "MB", "GB", "TB", "PB", "EB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}

/// A finished scan ranked for presentation: the top files, the top
/// directories, and the run summary.
pub struct RankedReport {
    root: PathBuf,
    top: usize,
    top_files: Vec<SizeRecord>,
    top_dirs: Vec<SizeRecord>,
    stats: StatsSnapshot,
    elapsed: Duration,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    root: &'a Path,
    elapsed_ms: u64,
    stats: StatsSnapshot,
    top_files: &'a [SizeRecord],
    top_dirs: &'a [SizeRecord],
}

impl RankedReport {
    pub fn new(outcome: ScanOutcome, top: usize) -> Self {
        let ScanOutcome {
            root,
            files,
            dirs,
            stats,
            elapsed,
        } = outcome;

        Self {
            root,
            top,
            top_files: top_k(files, top),
            top_dirs: top_k(dirs, top),
            stats,
            elapsed,
        }
    }

    pub fn top_files(&self) -> &[SizeRecord] {
        &self.top_files
    }

    pub fn top_dirs(&self) -> &[SizeRecord] {
        &self.top_dirs
    }

    /// Render the two rankings and a summary line as terminal text.
    pub fn render(&self, color: bool) -> String {
        let mut out = String::new();
        self.push_section(
            &mut out,
            &format!("Top {} largest files:", self.top),
            &self.top_files,
            color,
        );
        out.push('\n');
        self.push_section(
            &mut out,
            &format!("Top {} largest directories:", self.top),
            &self.top_dirs,
            color,
        );
        out.push('\n');
        out.push_str(&self.summary());
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&JsonReport {
            root: &self.root,
            elapsed_ms: self.elapsed.as_millis() as u64,
            stats: self.stats,
            top_files: &self.top_files,
            top_dirs: &self.top_dirs,
        })
    }

    fn push_section(&self, out: &mut String, heading: &str, records: &[SizeRecord], color: bool) {
        if color {
            out.push_str(&format!("{}\n", heading.cyan().bold()));
        } else {
            out.push_str(heading);
            out.push('\n');
        }
        for (rank, record) in records.iter().enumerate() {
            let line = format!(
                "{:>2}. {:>10}  {}",
                rank + 1,
                format_size(record.size),
                display_path(&record.path, &self.root)
            );
            if color {
                out.push_str(&format!("{}\n", line.yellow()));
            } else {
                out.push_str(&line);
                out.push('\n');
            }
        }
    }

    fn summary(&self) -> String {
        let mut line = format!(
            "Scanned {} files in {} directories ({}) in {:.1}s",
            self.stats.files,
            self.stats.dirs,
            humansize::format_size(self.stats.bytes, humansize::WINDOWS),
            self.elapsed.as_secs_f64(),
        );
        if self.stats.skipped > 0 {
            line.push_str(&format!(", {} entries skipped", self.stats.skipped));
        }
        line
    }
}

/// Paths print relative to the scanned root; the root's own row shows
/// just its name.
fn display_path(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string()),
        Ok(rel) => rel.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}
