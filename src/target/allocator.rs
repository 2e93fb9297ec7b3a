//! Test file allocation
//!
//! Reserves the backing file with `posix_fallocate` and, by default, writes
//! zeros over every byte and syncs. A reserved-but-unwritten extent can be
//! served from unwritten-extent metadata without touching the media, which
//! would make a later "cold read" look far faster than the device is.

use super::{open_file, OpenFlags};
use crate::error::BenchError;
use crate::util::time::{format_bytes, format_duration};
use crate::Result;
use std::fs::File;
use std::os::unix::fs::FileExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Chunk size used for zero-fill writes
pub const DEFAULT_FILL_CHUNK: usize = 64 * 1024;

/// Creates and resets the backing file to a known state
#[derive(Debug, Clone)]
pub struct FileAllocator {
    fill_chunk: usize,
}

impl Default for FileAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_FILL_CHUNK)
    }
}

impl FileAllocator {
    pub fn new(fill_chunk: usize) -> Self {
        Self {
            fill_chunk: fill_chunk.max(1),
        }
    }

    /// Open or create `path`, reserve exactly `size` bytes, optionally zero-fill
    ///
    /// Running this again on an existing file redoes every step, so each
    /// repetition of a trial starts from the same layout.
    ///
    /// # Errors
    ///
    /// Every failure is `BenchError::Allocation`, including a write that
    /// returns fewer bytes than requested. Nothing is retried.
    pub fn allocate(&self, path: &Path, size: u64, write_zeros: bool) -> Result<()> {
        let start = Instant::now();

        let flags = OpenFlags {
            read: true,
            write: true,
            direct: false,
            create: true,
        };
        let file = open_file(path, flags)
            .map_err(|e| BenchError::allocation(path, "failed to open", io_source(e)))?;

        let current = file
            .metadata()
            .map_err(|e| BenchError::allocation(path, "failed to stat", Some(e)))?
            .len();

        // posix_fallocate never shrinks, so cut an oversized file first
        if current > size || size == 0 {
            file.set_len(size)
                .map_err(|e| BenchError::allocation(path, "failed to truncate", Some(e)))?;
        }

        if size > 0 {
            reserve(&file, path, size)?;
        }

        if write_zeros {
            self.zero_fill(&file, path, size)?;
        }

        info!(
            path = %path.display(),
            size = %format_bytes(size),
            write_zeros,
            elapsed = %format_duration(start.elapsed()),
            "allocated test file"
        );
        Ok(())
    }

    fn zero_fill(&self, file: &File, path: &Path, size: u64) -> Result<()> {
        let buffer = vec![0u8; self.fill_chunk];
        let mut offset = 0u64;

        while offset < size {
            let len = std::cmp::min((size - offset) as usize, self.fill_chunk);
            let written = file.write_at(&buffer[..len], offset).map_err(|e| {
                BenchError::allocation(path, format!("zero-fill write failed at offset {}", offset), Some(e))
            })?;
            if written != len {
                return Err(BenchError::allocation(
                    path,
                    format!("short zero-fill write at offset {}: {} of {} bytes", offset, written, len),
                    None,
                ));
            }
            offset += len as u64;
        }

        file.sync_data()
            .map_err(|e| BenchError::allocation(path, "fdatasync after zero-fill failed", Some(e)))?;

        debug!(path = %path.display(), bytes = size, "zero-fill complete");
        Ok(())
    }
}

fn reserve(file: &File, path: &Path, size: u64) -> Result<()> {
    // SAFETY: the descriptor is owned by `file` and valid for this call
    let result = unsafe { libc::posix_fallocate(file.as_raw_fd(), 0, size as libc::off_t) };
    if result != 0 {
        // posix_fallocate returns the error number instead of setting errno
        return Err(BenchError::allocation(
            path,
            format!("posix_fallocate of {} bytes failed", size),
            Some(std::io::Error::from_raw_os_error(result)),
        ));
    }
    Ok(())
}

fn io_source(err: BenchError) -> Option<std::io::Error> {
    match err {
        BenchError::Io { source, .. } => Some(source),
        _ => None,
    }
}
