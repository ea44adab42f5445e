use super::entry::ReaderKind;

/// Tunables for a single scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Worker pool bound. Zero picks a default of ten workers per CPU,
    /// sized for traversal tasks that spend most of their time blocked
    /// on the filesystem.
    pub jobs: usize,
    /// Directory enumeration backend.
    pub reader: ReaderKind,
    /// Draw a live progress line on stderr while the scan runs.
    pub progress: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            jobs: 0,
            reader: ReaderKind::Auto,
            progress: false,
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_reader(mut self, reader: ReaderKind) -> Self {
        self.reader = reader;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Resolved worker count, never zero.
    pub fn effective_jobs(&self) -> usize {
        if self.jobs > 0 {
            self.jobs
        } else {
            num_cpus::get() * 10
        }
    }
}
