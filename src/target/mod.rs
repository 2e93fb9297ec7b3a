//! Backing file management
//!
//! The test file is the only state shared across repeated trials. This module
//! opens it with the flags each backend needs, reserves and zero-fills it
//! (`allocator`), and inspects or drops its page-cache footprint (`cache`).
//!
//! # Example
//!
//! ```no_run
//! use diskprobe::target::allocator::FileAllocator;
//! use diskprobe::target::cache::get_residency;
//! use std::path::Path;
//!
//! let path = Path::new("/tmp/diskprobe.dat");
//! FileAllocator::default().allocate(path, 1024 * 1024, true)?;
//!
//! let residency = get_residency(path)?;
//! println!("{}/{} pages cached", residency.resident_pages, residency.total_pages);
//! # Ok::<(), diskprobe::BenchError>(())
//! ```

use crate::error::BenchError;
use crate::Result;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

/// Permission bits for newly created test files
pub const FILE_MODE: u32 = 0o660;

/// Open flags for the test file
///
/// Files are returned as `std::fs::File`, so the descriptor is closed on every
/// exit path including errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenFlags {
    /// Open for reading
    pub read: bool,

    /// Open for writing
    pub write: bool,

    /// Use direct IO (O_DIRECT) - bypass page cache
    pub direct: bool,

    /// Create the file if it doesn't exist
    pub create: bool,
}

impl OpenFlags {
    pub fn read_only() -> Self {
        Self {
            read: true,
            ..Self::default()
        }
    }

    pub fn write_only() -> Self {
        Self {
            write: true,
            ..Self::default()
        }
    }

    pub fn with_direct(mut self, direct: bool) -> Self {
        self.direct = direct;
        self
    }
}

/// Open `path` with the given flags
pub fn open_file(path: &Path, flags: OpenFlags) -> Result<File> {
    let mut options = OpenOptions::new();
    options.read(flags.read).write(flags.write);

    if flags.create {
        options.create(true).mode(FILE_MODE);
    }

    if flags.direct {
        options.custom_flags(libc::O_DIRECT);
    }

    options
        .open(path)
        .map_err(|e| BenchError::io("open", path, e))
}

pub mod allocator;
pub mod cache;
