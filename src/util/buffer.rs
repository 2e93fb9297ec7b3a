//! Page-aligned buffers and page arithmetic
//!
//! O_DIRECT requires the user buffer, the file offset and the transfer length to
//! all be multiples of the page (or logical block) size. `AlignedBuffer` owns a
//! heap allocation with an explicit alignment so callers never have to mask
//! addresses themselves.

use crate::error::BenchError;
use crate::Result;
use std::alloc::{alloc_zeroed, dealloc, Layout};

/// Round `value` down to a multiple of `page_size` (a power of two)
#[inline(always)]
pub fn page_round_down(value: u64, page_size: u64) -> u64 {
    value & !(page_size - 1)
}

/// Round `value` up to a multiple of `page_size` (a power of two)
#[inline(always)]
pub fn page_round_up(value: u64, page_size: u64) -> u64 {
    (value + page_size - 1) & !(page_size - 1)
}

#[inline(always)]
pub fn is_page_aligned(value: u64, page_size: u64) -> bool {
    value & (page_size - 1) == 0
}

/// Page size reported by the operating system
pub fn system_page_size() -> u64 {
    // SAFETY: sysconf has no preconditions
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as u64
    } else {
        4096
    }
}

/// Zero-initialized heap buffer with a fixed alignment
pub struct AlignedBuffer {
    ptr: *mut u8,
    size: usize,
    alignment: usize,
    layout: Layout,
}

impl AlignedBuffer {
    /// Allocate `size` zeroed bytes aligned to `alignment`
    ///
    /// # Errors
    ///
    /// Returns `BenchError::Config` if the alignment is not a power of two or the
    /// size is zero, and `BenchError::Allocation` if the allocator fails.
    pub fn new(size: usize, alignment: usize) -> Result<Self> {
        if !alignment.is_power_of_two() {
            return Err(BenchError::Config(format!(
                "buffer alignment {} is not a power of 2",
                alignment
            )));
        }
        if size == 0 {
            return Err(BenchError::Config("buffer size must be greater than 0".into()));
        }

        let layout = Layout::from_size_align(size, alignment)
            .map_err(|e| BenchError::Config(format!("invalid buffer layout: {}", e)))?;

        // SAFETY: layout has a non-zero size
        let ptr = unsafe { alloc_zeroed(layout) };
        if ptr.is_null() {
            return Err(BenchError::allocation(
                "<memory>",
                format!("failed to allocate {} byte aligned buffer", size),
                None,
            ));
        }

        Ok(AlignedBuffer {
            ptr,
            size,
            alignment,
            layout,
        })
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr is valid for size bytes for the lifetime of self
        unsafe { std::slice::from_raw_parts(self.ptr, self.size) }
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: ptr is valid for size bytes and uniquely borrowed
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.size) }
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    #[inline(always)]
    pub fn is_aligned(&self) -> bool {
        (self.ptr as usize) % self.alignment == 0
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        // SAFETY: ptr was allocated with exactly this layout
        unsafe {
            dealloc(self.ptr, self.layout);
        }
    }
}

// AlignedBuffer is Send because it owns its memory
unsafe impl Send for AlignedBuffer {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_buffer_4k_alignment() {
        let buffer = AlignedBuffer::new(8192, 4096).unwrap();
        assert_eq!(buffer.size(), 8192);
        assert_eq!(buffer.alignment(), 4096);
        assert!(buffer.is_aligned());
    }

    #[test]
    fn test_aligned_buffer_is_zeroed() {
        let buffer = AlignedBuffer::new(65536, 4096).unwrap();
        assert!(buffer.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_invalid_alignment_rejected() {
        assert!(matches!(AlignedBuffer::new(4096, 513), Err(BenchError::Config(_))));
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(AlignedBuffer::new(0, 4096).is_err());
    }

    #[test]
    fn test_mut_slice_writes_through() {
        let mut buffer = AlignedBuffer::new(4096, 4096).unwrap();
        buffer.as_mut_slice()[100] = 0xAB;
        assert_eq!(buffer.as_slice()[100], 0xAB);
    }

    #[test]
    fn test_page_rounding() {
        assert_eq!(page_round_down(0, 4096), 0);
        assert_eq!(page_round_down(4095, 4096), 0);
        assert_eq!(page_round_down(4096, 4096), 4096);
        assert_eq!(page_round_down(10_000, 4096), 8192);

        assert_eq!(page_round_up(0, 4096), 0);
        assert_eq!(page_round_up(1, 4096), 4096);
        assert_eq!(page_round_up(4096, 4096), 4096);
        assert_eq!(page_round_up(4097, 4096), 8192);

        assert!(is_page_aligned(8192, 4096));
        assert!(!is_page_aligned(8193, 4096));
    }

    #[test]
    fn test_system_page_size_is_power_of_two() {
        assert!(system_page_size().is_power_of_two());
    }
}
