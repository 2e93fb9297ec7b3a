//! Direct IO backend
//!
//! Opens the file with `O_DIRECT` so every transfer goes straight to the device.
//! The kernel rejects unaligned direct transfers with `EINVAL`, so every buffer
//! is an `AlignedBuffer`, every offset is rounded down to a page boundary, and
//! every length is a page multiple. Requests that cannot satisfy this are
//! refused up front with `BenchError::Alignment`.
//!
//! Random tests move one full page per operation, the smallest transfer direct
//! IO allows.

use super::{
    read_exact_once, sync_data, sync_due, whole_chunks, write_exact_once, BackendConfig, BackendKind,
    IOBackend, Operation, OperationResult,
};
use crate::distribution::{uniform::UniformDistribution, Distribution};
use crate::error::BenchError;
use crate::target::{open_file, OpenFlags};
use crate::util::buffer::{is_page_aligned, page_round_down, AlignedBuffer};
use crate::Result;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, trace};

/// Cache-bypassing backend
pub struct DirectBackend {
    config: BackendConfig,
}

impl DirectBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    pub fn page_size(&self) -> u64 {
        self.config.page_size
    }

    /// Offset for the next random operation, rounded down to a page boundary
    #[inline(always)]
    pub fn random_offset(&self, dist: &mut dyn Distribution, total_len: u64) -> u64 {
        page_round_down(dist.next_offset(total_len), self.config.page_size)
    }

    fn check_aligned(&self, what: &'static str, value: u64) -> Result<()> {
        let page_size = self.config.page_size;
        if !page_size.is_power_of_two() {
            return Err(BenchError::Config(format!(
                "page size {} is not a power of 2",
                page_size
            )));
        }
        if !is_page_aligned(value, page_size) {
            return Err(BenchError::Alignment {
                what,
                value,
                page_size,
            });
        }
        Ok(())
    }

    /// Random tests transfer whole pages, so the range must hold at least one
    fn check_random_range(&self, total_len: u64) -> Result<()> {
        self.check_aligned("file length", total_len)?;
        if total_len < self.config.page_size {
            return Err(BenchError::Alignment {
                what: "file length",
                value: total_len,
                page_size: self.config.page_size,
            });
        }
        Ok(())
    }

    fn page_buffer(&self, size: u64) -> Result<AlignedBuffer> {
        AlignedBuffer::new(size as usize, self.config.page_size as usize)
    }
}

impl IOBackend for DirectBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Direct
    }

    fn sequential_write(&self, path: &Path, total_len: u64, chunk_len: u64) -> Result<OperationResult> {
        self.check_aligned("chunk length", chunk_len)?;
        let chunks = whole_chunks(total_len, chunk_len)?;
        let buffer = self.page_buffer(chunk_len)?;
        let file = open_file(path, OpenFlags::write_only().with_direct(true))?;

        let start = Instant::now();
        for i in 0..chunks {
            write_exact_once(&file, path, buffer.as_slice(), i * chunk_len)?;
        }
        sync_data(&file, path)?;
        let elapsed = start.elapsed();

        debug!(backend = "direct", chunks, chunk_len, ?elapsed, "sequential write done");
        Ok(OperationResult::sequential(
            Operation::SequentialWrite,
            chunks * chunk_len,
            chunks,
            elapsed,
        ))
    }

    fn sequential_read(
        &self,
        path: &Path,
        total_len: u64,
        chunk_len: u64,
        invalidate: bool,
    ) -> Result<OperationResult> {
        self.check_aligned("chunk length", chunk_len)?;
        let chunks = whole_chunks(total_len, chunk_len)?;
        let mut buffer = self.page_buffer(chunk_len)?;
        let file = open_file(path, OpenFlags::read_only().with_direct(true))?;

        if invalidate {
            trace!("direct reads bypass the page cache; invalidate ignored");
        }

        let start = Instant::now();
        for i in 0..chunks {
            read_exact_once(&file, path, buffer.as_mut_slice(), i * chunk_len)?;
        }
        let elapsed = start.elapsed();

        debug!(backend = "direct", chunks, chunk_len, ?elapsed, "sequential read done");
        Ok(OperationResult::sequential(
            Operation::SequentialRead,
            chunks * chunk_len,
            chunks,
            elapsed,
        ))
    }

    fn random_write(&self, path: &Path, total_len: u64, op_count: u64) -> Result<OperationResult> {
        self.check_random_range(total_len)?;
        let page_size = self.config.page_size;
        let buffer = self.page_buffer(page_size)?;
        let file = open_file(path, OpenFlags::write_only().with_direct(true))?;
        let mut dist = UniformDistribution::from_seed_option(self.config.seed);

        let start = Instant::now();
        for i in 0..op_count {
            let offset = self.random_offset(&mut dist, total_len);
            write_exact_once(&file, path, buffer.as_slice(), offset)?;

            let completed = i + 1;
            if completed < op_count && sync_due(completed, self.config.sync_interval) {
                trace!(completed, "periodic fdatasync");
                sync_data(&file, path)?;
            }
        }
        sync_data(&file, path)?;
        let elapsed = start.elapsed();

        debug!(backend = "direct", op_count, ?elapsed, "random write done");
        Ok(OperationResult::random(
            Operation::RandomWrite,
            op_count * page_size,
            op_count,
            elapsed,
        ))
    }

    fn random_read(
        &self,
        path: &Path,
        total_len: u64,
        op_count: u64,
        invalidate: bool,
    ) -> Result<OperationResult> {
        self.check_random_range(total_len)?;
        let page_size = self.config.page_size;
        let mut buffer = self.page_buffer(page_size)?;
        let file = open_file(path, OpenFlags::read_only().with_direct(true))?;
        let mut dist = UniformDistribution::from_seed_option(self.config.seed);

        if invalidate {
            trace!("direct reads bypass the page cache; invalidate ignored");
        }

        let start = Instant::now();
        for _ in 0..op_count {
            let offset = self.random_offset(&mut dist, total_len);
            read_exact_once(&file, path, buffer.as_mut_slice(), offset)?;
        }
        let elapsed = start.elapsed();

        debug!(backend = "direct", op_count, ?elapsed, "random read done");
        Ok(OperationResult::random(
            Operation::RandomRead,
            op_count * page_size,
            op_count,
            elapsed,
        ))
    }
}
