//! Buffered IO backend
//!
//! All transfers go through the page cache with plain `pread`/`pwrite`. Random
//! tests move a single byte per operation, the smallest unit the kernel accepts.
//! Reads can optionally evict the file range first to measure a cold cache;
//! without eviction, recently cached pages satisfy reads and the result
//! reflects warm performance.

use super::{
    read_exact_once, sync_data, sync_due, whole_chunks, write_exact_once, BackendConfig, BackendKind,
    IOBackend, Operation, OperationResult,
};
use crate::distribution::{uniform::UniformDistribution, Distribution};
use crate::target::{cache, open_file, OpenFlags};
use crate::Result;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, trace};

/// Bytes moved by each random operation
pub const RANDOM_UNIT: usize = 1;

/// Page-cache-backed backend
pub struct BufferedBackend {
    config: BackendConfig,
}

impl BufferedBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    /// Offset for the next random operation: any byte in `[0, total_len)`
    #[inline(always)]
    pub fn random_offset(&self, dist: &mut dyn Distribution, total_len: u64) -> u64 {
        dist.next_offset(total_len)
    }
}

impl IOBackend for BufferedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Buffered
    }

    fn sequential_write(&self, path: &Path, total_len: u64, chunk_len: u64) -> Result<OperationResult> {
        let chunks = whole_chunks(total_len, chunk_len)?;
        let file = open_file(path, OpenFlags::write_only())?;
        let buffer = vec![0u8; chunk_len as usize];

        let start = Instant::now();
        for i in 0..chunks {
            write_exact_once(&file, path, &buffer, i * chunk_len)?;
        }
        sync_data(&file, path)?;
        let elapsed = start.elapsed();

        debug!(backend = "buffered", chunks, chunk_len, ?elapsed, "sequential write done");
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
        let chunks = whole_chunks(total_len, chunk_len)?;
        let file = open_file(path, OpenFlags::read_only())?;
        let mut buffer = vec![0u8; chunk_len as usize];

        if invalidate {
            cache::evict(&file, path, 0, total_len)?;
        }

        let start = Instant::now();
        for i in 0..chunks {
            read_exact_once(&file, path, &mut buffer, i * chunk_len)?;
        }
        let elapsed = start.elapsed();

        debug!(backend = "buffered", chunks, chunk_len, invalidate, ?elapsed, "sequential read done");
        Ok(OperationResult::sequential(
            Operation::SequentialRead,
            chunks * chunk_len,
            chunks,
            elapsed,
        ))
    }

    fn random_write(&self, path: &Path, total_len: u64, op_count: u64) -> Result<OperationResult> {
        let file = open_file(path, OpenFlags::write_only())?;
        let buffer = [0u8; RANDOM_UNIT];
        let mut dist = UniformDistribution::from_seed_option(self.config.seed);

        let start = Instant::now();
        for i in 0..op_count {
            let offset = self.random_offset(&mut dist, total_len);
            write_exact_once(&file, path, &buffer, offset)?;

            let completed = i + 1;
            if completed < op_count && sync_due(completed, self.config.sync_interval) {
                trace!(completed, "periodic fdatasync");
                sync_data(&file, path)?;
            }
        }
        sync_data(&file, path)?;
        let elapsed = start.elapsed();

        debug!(backend = "buffered", op_count, ?elapsed, "random write done");
        Ok(OperationResult::random(
            Operation::RandomWrite,
            op_count * RANDOM_UNIT as u64,
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
        let file = open_file(path, OpenFlags::read_only())?;
        let mut buffer = [0u8; RANDOM_UNIT];
        let mut dist = UniformDistribution::from_seed_option(self.config.seed);

        if invalidate {
            cache::evict(&file, path, 0, total_len)?;
        }

        let start = Instant::now();
        for _ in 0..op_count {
            let offset = self.random_offset(&mut dist, total_len);
            read_exact_once(&file, path, &mut buffer, offset)?;
        }
        let elapsed = start.elapsed();

        debug!(backend = "buffered", op_count, invalidate, ?elapsed, "random read done");
        Ok(OperationResult::random(
            Operation::RandomRead,
            op_count * RANDOM_UNIT as u64,
            op_count,
            elapsed,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;
    use crate::target::allocator::FileAllocator;
    use tempfile::TempDir;

    fn backend() -> BufferedBackend {
        BufferedBackend::new(BackendConfig {
            seed: Some(42),
            ..BackendConfig::default()
        })
    }

    #[test]
    fn test_sequential_write_whole_chunks_only() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("seq_write.dat");
        std::fs::write(&path, vec![0xAAu8; 100]).unwrap();

        let result = backend().sequential_write(&path, 100, 40).unwrap();

        assert_eq!(result.operation, Operation::SequentialWrite);
        assert_eq!(result.ops, 2);
        assert_eq!(result.bytes, 80);
        assert!(result.throughput().unwrap() > 0.0);
        assert!(result.latency().is_none());

        // The 20-byte remainder is never written
        let data = std::fs::read(&path).unwrap();
        assert!(data[..80].iter().all(|&b| b == 0));
        assert!(data[80..].iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn test_sequential_read_even_chunks() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("seq_read.dat");
        FileAllocator::default().allocate(&path, 1024 * 1024, true).unwrap();

        let result = backend().sequential_read(&path, 1024 * 1024, 64 * 1024, true).unwrap();

        assert_eq!(result.ops, 16);
        assert_eq!(result.bytes, 1024 * 1024);
        let expected = result.bytes as f64 / result.duration.as_secs_f64();
        let reported = result.throughput().unwrap();
        assert!((reported - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn test_sequential_read_remainder_not_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("seq_read_rem.dat");
        // The file holds only the two whole chunks; reading a third would be short
        std::fs::write(&path, vec![0u8; 80]).unwrap();

        let result = backend().sequential_read(&path, 100, 40, false).unwrap();
        assert_eq!(result.ops, 2);
        assert_eq!(result.bytes, 80);
    }

    #[test]
    fn test_sequential_read_past_eof_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("truncated.dat");
        std::fs::write(&path, vec![0u8; 100]).unwrap();

        let err = backend().sequential_read(&path, 4096, 64, false).unwrap_err();
        assert!(matches!(err, BenchError::ShortTransfer { op: "read", .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_random_write_issues_exact_op_count() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rnd_write.dat");
        FileAllocator::default().allocate(&path, 256 * 1024, true).unwrap();

        let result = backend().random_write(&path, 256 * 1024, 2500).unwrap();

        assert_eq!(result.operation, Operation::RandomWrite);
        assert_eq!(result.ops, 2500);
        assert_eq!(result.bytes, 2500);
        assert!(result.latency().unwrap() > 0.0);
        assert!(result.throughput().is_none());
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 256 * 1024);
    }

    #[test]
    fn test_random_read_issues_exact_op_count() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rnd_read.dat");
        FileAllocator::default().allocate(&path, 256 * 1024, true).unwrap();

        let result = backend().random_read(&path, 256 * 1024, 1000, true).unwrap();

        assert_eq!(result.ops, 1000);
        let expected = result.duration.as_secs_f64() / 1000.0;
        assert!((result.latency().unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_random_offsets_stay_in_range() {
        let backend = backend();
        let mut dist = UniformDistribution::with_seed(1);
        for _ in 0..1000 {
            assert!(backend.random_offset(&mut dist, 100) < 100);
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.dat");

        let err = backend().random_read(&path, 4096, 10, false).unwrap_err();
        assert!(matches!(err, BenchError::Io { op: "open", .. }));
    }

    /// Allocate and fully read a 1 MiB file so every page starts resident
    fn warm_file(dir: &Path, name: &str) -> Option<std::path::PathBuf> {
        let path = dir.join(name);
        FileAllocator::default().allocate(&path, 1024 * 1024, true).unwrap();
        std::fs::read(&path).unwrap();

        let warm = cache::get_residency(&path).unwrap();
        if warm.resident_pages < warm.total_pages {
            eprintln!("Skipping: file did not stay resident after a full read");
            return None;
        }
        Some(path)
    }

    #[test]
    fn test_sequential_read_invalidate_evicts_before_loop() {
        let Some(temp_dir) = cache::evictable_tempdir() else {
            eprintln!("Skipping: no filesystem with droppable page cache");
            return;
        };
        let Some(path) = warm_file(temp_dir.path(), "cold.dat") else {
            return;
        };

        // A chunk larger than the range means the loop reads nothing, so
        // whatever residency remains is what eviction left behind
        let result = backend()
            .sequential_read(&path, 1024 * 1024, 2 * 1024 * 1024, true)
            .unwrap();
        assert_eq!(result.bytes, 0);

        let cold = cache::get_residency(&path).unwrap();
        assert!(
            cold.resident_pages < cold.total_pages,
            "still resident: {}/{}",
            cold.resident_pages,
            cold.total_pages
        );
    }

    #[test]
    fn test_random_read_invalidate_evicts_before_loop() {
        let Some(temp_dir) = cache::evictable_tempdir() else {
            eprintln!("Skipping: no filesystem with droppable page cache");
            return;
        };
        let Some(path) = warm_file(temp_dir.path(), "cold_random.dat") else {
            return;
        };

        backend().random_read(&path, 1024 * 1024, 0, true).unwrap();

        let cold = cache::get_residency(&path).unwrap();
        assert!(cold.resident_pages < cold.total_pages);
    }

    #[test]
    fn test_read_without_invalidate_keeps_pages() {
        let Some(temp_dir) = cache::evictable_tempdir() else {
            eprintln!("Skipping: no filesystem with droppable page cache");
            return;
        };
        let Some(path) = warm_file(temp_dir.path(), "warm.dat") else {
            return;
        };

        backend()
            .sequential_read(&path, 1024 * 1024, 2 * 1024 * 1024, false)
            .unwrap();

        let residency = cache::get_residency(&path).unwrap();
        assert_eq!(residency.resident_pages, residency.total_pages);
    }
}
