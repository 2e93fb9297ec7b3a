//! Mock IO backend for testing
//!
//! Implements `IOBackend` without touching storage. Every call is recorded, the
//! reported throughput or latency is configurable, and a failure can be
//! injected on the Nth call to exercise abort paths in the harness.
//!
//! # Example
//!
//! ```
//! use diskprobe::engine::{IOBackend, Operation};
//! use diskprobe::engine::mock::MockBackend;
//! use std::path::Path;
//!
//! let backend = MockBackend::new();
//! let result = backend.random_read(Path::new("/nonexistent"), 4096, 10, true).unwrap();
//! assert_eq!(result.ops, 10);
//! assert_eq!(backend.calls()[0].operation, Operation::RandomRead);
//! ```

use super::{BackendKind, IOBackend, Operation, OperationResult};
use crate::error::BenchError;
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Record of one backend call
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub operation: Operation,
    pub path: PathBuf,
    pub total_len: u64,
    /// Chunk length for sequential tests, op count for random tests
    pub unit: u64,
    pub invalidate: bool,
}

/// Backend that records calls instead of doing IO
#[derive(Clone)]
pub struct MockBackend {
    kind: BackendKind,
    /// Simulated loop duration reported by every call
    duration: Duration,
    calls: Arc<Mutex<Vec<CallRecord>>>,
    /// 1-based call index that fails, if any
    fail_on_call: Arc<Mutex<Option<usize>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_kind(BackendKind::Buffered)
    }

    pub fn with_kind(kind: BackendKind) -> Self {
        Self {
            kind,
            duration: Duration::from_millis(100),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_on_call: Arc::new(Mutex::new(None)),
        }
    }

    /// Report `duration` as the elapsed time of every operation
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Make the `n`th call (1-based) fail with a short transfer
    pub fn fail_on_call(&self, n: usize) {
        *self.fail_on_call.lock().unwrap() = Some(n);
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, record: CallRecord) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(record);
        if *self.fail_on_call.lock().unwrap() == Some(calls.len()) {
            return Err(BenchError::ShortTransfer {
                op: "mock",
                offset: 0,
                expected: 1,
                actual: 0,
            });
        }
        Ok(())
    }

    fn sequential(
        &self,
        operation: Operation,
        path: &Path,
        total_len: u64,
        chunk_len: u64,
        invalidate: bool,
    ) -> Result<OperationResult> {
        self.record(CallRecord {
            operation,
            path: path.to_path_buf(),
            total_len,
            unit: chunk_len,
            invalidate,
        })?;
        let chunks = super::whole_chunks(total_len, chunk_len)?;
        Ok(OperationResult::sequential(
            operation,
            chunks * chunk_len,
            chunks,
            self.duration,
        ))
    }

    fn random(
        &self,
        operation: Operation,
        path: &Path,
        total_len: u64,
        op_count: u64,
        invalidate: bool,
    ) -> Result<OperationResult> {
        self.record(CallRecord {
            operation,
            path: path.to_path_buf(),
            total_len,
            unit: op_count,
            invalidate,
        })?;
        Ok(OperationResult::random(operation, op_count, op_count, self.duration))
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl IOBackend for MockBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn sequential_write(
        &self,
        path: &Path,
        total_len: u64,
        chunk_len: u64,
    ) -> Result<OperationResult> {
        self.sequential(Operation::SequentialWrite, path, total_len, chunk_len, false)
    }

    fn sequential_read(
        &self,
        path: &Path,
        total_len: u64,
        chunk_len: u64,
        invalidate: bool,
    ) -> Result<OperationResult> {
        self.sequential(Operation::SequentialRead, path, total_len, chunk_len, invalidate)
    }

    fn random_write(
        &self,
        path: &Path,
        total_len: u64,
        op_count: u64,
    ) -> Result<OperationResult> {
        self.random(Operation::RandomWrite, path, total_len, op_count, false)
    }

    fn random_read(
        &self,
        path: &Path,
        total_len: u64,
        op_count: u64,
        invalidate: bool,
    ) -> Result<OperationResult> {
        self.random(Operation::RandomRead, path, total_len, op_count, invalidate)
    }
}
