//! telemetry/counters.rs
//! Mutable counters used during streaming pipelines.
//!
//! Summary: block and byte counts per stage.
//! Converted into an immutable `TelemetrySnapshot` at pipeline end.
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Deterministic counters collected during stream processing
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub blocks_read: u64,
    pub bytes_read: u64,
    pub blocks_transformed: u64,
    pub bytes_transformed: u64,
    pub iv_bytes: u64,
    pub blocks_written: u64,
    pub bytes_written: u64,
    pub progress_events: u64,
}

impl TelemetryCounters {
    /// Record one block handed downstream by the reader.
    pub fn add_read(&mut self, len: usize) {
        self.blocks_read += 1;
        self.bytes_read += len as u64;
    }

    /// Record one data block run through the keystream.
    pub fn add_transformed(&mut self, len: usize) {
        self.blocks_transformed += 1;
        self.bytes_transformed += len as u64;
    }

    /// Record the IV emitted (encrypt) or consumed (decrypt).
    pub fn add_iv(&mut self, len: usize) {
        self.iv_bytes += len as u64;
    }

    /// Record one block appended to the output.
    pub fn add_written(&mut self, len: usize) {
        self.blocks_written += 1;
        self.bytes_written += len as u64;
    }

    pub fn add_progress_event(&mut self) {
        self.progress_events += 1;
    }

    // Each stage fills its own instance; the orchestrator merges them after join.
    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.blocks_read += other.blocks_read;
        self.bytes_read += other.bytes_read;
        self.blocks_transformed += other.blocks_transformed;
        self.bytes_transformed += other.bytes_transformed;
        self.iv_bytes += other.iv_bytes;
        self.blocks_written += other.blocks_written;
        self.bytes_written += other.bytes_written;
        self.progress_events += other.progress_events;
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
