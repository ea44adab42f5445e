use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// One directory entry: its bare name and whether it is a directory.
///
/// Symlinks are never classified as directories, so traversal cannot
/// follow a link into a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub name: OsString,
    pub is_dir: bool,
}

/// Which backend enumerates directory entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReaderKind {
    /// Raw getdents64 buffers on Linux, `read_dir` elsewhere.
    #[default]
    Auto,
    /// Always use `std::fs::read_dir`.
    Portable,
}

/// Iterator over the entries of a single directory.
///
/// Yields each entry once, skipping `.` and `..`. Both backends produce
/// the same names and classifications. A directory that cannot be opened
/// (permission denied, removed concurrently, not a directory) yields an
/// empty sequence; the caller moves on.
pub struct DirReader {
    backend: Backend,
    dir: PathBuf,
}

enum Backend {
    #[cfg(target_os = "linux")]
    Raw(raw::RawDir),
    Portable(fs::ReadDir),
    Empty,
}

impl DirReader {
    pub fn open(dir: &Path, kind: ReaderKind) -> Self {
        let backend = match kind {
            ReaderKind::Auto => Self::open_raw(dir),
            ReaderKind::Portable => Self::open_portable(dir),
        };
        Self {
            backend,
            dir: dir.to_path_buf(),
        }
    }

    #[cfg(target_os = "linux")]
    fn open_raw(dir: &Path) -> Backend {
        match raw::RawDir::open(dir) {
            Ok(raw) => Backend::Raw(raw),
            Err(err) => {
                tracing::debug!(path = %dir.display(), %err, "skipping unreadable directory");
                Backend::Empty
            }
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn open_raw(dir: &Path) -> Backend {
        Self::open_portable(dir)
    }

    fn open_portable(dir: &Path) -> Backend {
        match fs::read_dir(dir) {
            Ok(read_dir) => Backend::Portable(read_dir),
            Err(err) => {
                tracing::debug!(path = %dir.display(), %err, "skipping unreadable directory");
                Backend::Empty
            }
        }
    }

    /// True when the directory could not be opened at all. An empty but
    /// readable directory reports false.
    pub fn failed(&self) -> bool {
        matches!(self.backend, Backend::Empty)
    }
}

impl Iterator for DirReader {
    type Item = RawEntry;

    fn next(&mut self) -> Option<RawEntry> {
        loop {
            match &mut self.backend {
                #[cfg(target_os = "linux")]
                Backend::Raw(raw) => match raw.next_entry() {
                    Some((name, d_type)) => {
                        if name == "." || name == ".." {
                            continue;
                        }
                        let is_dir = match d_type {
                            libc::DT_DIR => true,
                            // Filesystems without d_type support need one
                            // metadata call to classify the entry.
                            libc::DT_UNKNOWN => lstat_is_dir(&self.dir.join(&name)),
                            _ => false,
                        };
                        return Some(RawEntry { name, is_dir });
                    }
                    None => return None,
                },
                Backend::Portable(read_dir) => match read_dir.next() {
                    Some(Ok(entry)) => {
                        let name = entry.file_name();
                        let is_dir = match entry.file_type() {
                            Ok(file_type) => file_type.is_dir(),
                            Err(_) => lstat_is_dir(&self.dir.join(&name)),
                        };
                        return Some(RawEntry { name, is_dir });
                    }
                    Some(Err(err)) => {
                        tracing::debug!(path = %self.dir.display(), %err, "skipping unreadable entry");
                        continue;
                    }
                    None => return None,
                },
                Backend::Empty => return None,
            }
        }
    }
}

fn lstat_is_dir(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_dir())
        .unwrap_or(false)
}

#[cfg(target_os = "linux")]
mod raw {
    use std::ffi::{CStr, OsStr, OsString};
    use std::io;
    use std::os::unix::ffi::OsStrExt;
    use std::os::unix::io::RawFd;
    use std::path::Path;
    use std::ptr;

    use nix::fcntl::{open, OFlag};
    use nix::sys::stat::Mode;
    use nix::unistd::close;

    /// getdents64 buffer size. Large enough that even wide directories
    /// need few syscalls.
    const BUF_SIZE: usize = 128 * 1024;

    /// Buffered getdents64 reader over one open directory fd.
    pub(super) struct RawDir {
        fd: RawFd,
        buf: Vec<u8>,
        filled: usize,
        cursor: usize,
    }

    impl RawDir {
        pub(super) fn open(dir: &Path) -> io::Result<Self> {
            let fd = open(
                dir,
                OFlag::O_RDONLY | OFlag::O_DIRECTORY | OFlag::O_CLOEXEC,
                Mode::empty(),
            )
            .map_err(io::Error::from)?;

            Ok(Self {
                fd,
                buf: vec![0u8; BUF_SIZE],
                filled: 0,
                cursor: 0,
            })
        }

        /// Next raw `(name, d_type)` pair, refilling the buffer from the
        /// kernel as needed. Returns `None` at end of directory or on a
        /// read error (the remainder of the directory is skipped).
        pub(super) fn next_entry(&mut self) -> Option<(OsString, u8)> {
            loop {
                if self.cursor >= self.filled && !self.refill() {
                    return None;
                }

                let remaining = self.filled - self.cursor;
                // SAFETY: `cursor < filled <= buf.len()` and the kernel
                // wrote `filled` bytes of dirent64 records into `buf`.
                // Field reads are unaligned-safe and the name is
                // NUL-terminated within its record.
                unsafe {
                    let record = self.buf.as_ptr().add(self.cursor) as *const libc::dirent64;
                    let reclen = ptr::addr_of!((*record).d_reclen).read_unaligned() as usize;
                    if reclen == 0 || reclen > remaining {
                        // Malformed record: drop the rest of this buffer.
                        self.cursor = self.filled;
                        continue;
                    }
                    let d_type = ptr::addr_of!((*record).d_type).read_unaligned();
                    let name_ptr = ptr::addr_of!((*record).d_name) as *const libc::c_char;
                    let name = OsStr::from_bytes(CStr::from_ptr(name_ptr).to_bytes());

                    self.cursor += reclen;
                    return Some((name.to_os_string(), d_type));
                }
            }
        }

        fn refill(&mut self) -> bool {
            // SAFETY: fd is an open directory and buf is writable for
            // buf.len() bytes.
            let nread = unsafe {
                libc::syscall(
                    libc::SYS_getdents64,
                    self.fd,
                    self.buf.as_mut_ptr().cast::<libc::c_void>(),
                    self.buf.len(),
                )
            };
            if nread < 0 {
                tracing::debug!(
                    err = %io::Error::last_os_error(),
                    "getdents64 failed, skipping rest of directory"
                );
                return false;
            }
            if nread == 0 {
                return false;
            }
            self.filled = nread as usize;
            self.cursor = 0;
            true
        }
    }

    impl Drop for RawDir {
        fn drop(&mut self) {
            let _ = close(self.fd);
        }
    }
}
