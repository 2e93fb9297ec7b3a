//! Page-cache inspection and eviction
//!
//! `get_residency` maps a file and asks the kernel (`mincore`) which of its
//! pages are currently in the page cache. `evict` is the narrower primitive the
//! read tests use to force a cold cache: a `POSIX_FADV_DONTNEED` hint over a
//! byte range. Only clean pages are dropped, so callers sync writes first.

use super::{open_file, OpenFlags};
use crate::error::BenchError;
use crate::util::buffer::{page_round_up, system_page_size};
use crate::Result;
use serde::Serialize;
use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::ptr;
use tracing::debug;

/// Point-in-time page-cache footprint of a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheResidency {
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Page size the counts are expressed in
    pub page_size: u64,
    /// `ceil(size / page_size)`
    pub total_pages: u64,
    /// Pages flagged resident; never exceeds `total_pages`
    pub resident_pages: u64,
}

impl CacheResidency {
    /// Fraction of pages resident, 0.0 for an empty file
    pub fn resident_ratio(&self) -> f64 {
        if self.total_pages == 0 {
            0.0
        } else {
            self.resident_pages as f64 / self.total_pages as f64
        }
    }
}

/// Read-only shared mapping, unmapped on drop
struct Mapping {
    addr: *mut libc::c_void,
    len: usize,
}

impl Mapping {
    fn new(file: &File, len: usize, path: &Path) -> Result<Self> {
        // SAFETY: mapping a valid descriptor read-only; the kernel picks the address
        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                0,
            )
        };

        if addr == libc::MAP_FAILED {
            return Err(BenchError::io("mmap", path, std::io::Error::last_os_error()));
        }

        Ok(Self { addr, len })
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        // SAFETY: addr/len came from a successful mmap
        unsafe {
            libc::munmap(self.addr, self.len);
        }
    }
}

/// Query how many pages of `path` are resident in the page cache
pub fn get_residency(path: &Path) -> Result<CacheResidency> {
    let file = open_file(path, OpenFlags::read_only())?;
    let size = file
        .metadata()
        .map_err(|e| BenchError::io("fstat", path, e))?
        .len();

    let page_size = system_page_size();
    let total_pages = page_round_up(size, page_size) / page_size;

    // mmap rejects zero-length mappings
    if size == 0 {
        return Ok(CacheResidency {
            path: path.to_path_buf(),
            size,
            page_size,
            total_pages: 0,
            resident_pages: 0,
        });
    }

    let mapping = Mapping::new(&file, size as usize, path)?;
    let mut vec = vec![0u8; total_pages as usize];

    // SAFETY: vec holds one byte per page of the mapped range
    let result = unsafe { libc::mincore(mapping.addr, mapping.len, vec.as_mut_ptr()) };
    if result != 0 {
        return Err(BenchError::io("mincore", path, std::io::Error::last_os_error()));
    }
    drop(mapping);

    let resident_pages = vec.iter().filter(|&&page| page & 1 == 1).count() as u64;

    debug!(path = %path.display(), size, resident_pages, total_pages, "queried cache residency");

    Ok(CacheResidency {
        path: path.to_path_buf(),
        size,
        page_size,
        total_pages,
        resident_pages,
    })
}

/// Advise the kernel to drop `[offset, offset + len)` of `file` from the cache
pub fn evict(file: &File, path: &Path, offset: u64, len: u64) -> Result<()> {
    // SAFETY: the descriptor is owned by `file` and valid for this call
    let result = unsafe {
        libc::posix_fadvise(
            file.as_raw_fd(),
            offset as libc::off_t,
            len as libc::off_t,
            libc::POSIX_FADV_DONTNEED,
        )
    };

    if result != 0 {
        return Err(BenchError::io(
            "posix_fadvise(DONTNEED)",
            path,
            std::io::Error::from_raw_os_error(result),
        ));
    }

    debug!(path = %path.display(), offset, len, "evicted range from page cache");
    Ok(())
}

/// Scratch directory whose pages the kernel can actually drop
///
/// Rooted in the crate directory rather than `/tmp`, which is often tmpfs
/// where `POSIX_FADV_DONTNEED` keeps every page. `None` when the crate
/// directory is itself on tmpfs.
#[cfg(test)]
pub(crate) fn evictable_tempdir() -> Option<tempfile::TempDir> {
    use std::os::unix::ffi::OsStrExt;

    const TMPFS_MAGIC: i64 = 0x0102_1994;

    let dir = tempfile::TempDir::new_in(env!("CARGO_MANIFEST_DIR")).ok()?;
    let c_path = std::ffi::CString::new(dir.path().as_os_str().as_bytes()).ok()?;
    let mut stat: libc::statfs = unsafe { std::mem::zeroed() };
    // SAFETY: c_path is NUL terminated and stat is a valid out pointer
    if unsafe { libc::statfs(c_path.as_ptr(), &mut stat) } != 0 {
        return None;
    }
    if stat.f_type as i64 == TMPFS_MAGIC {
        return None;
    }
    Some(dir)
}
