//! stream/calibrate.rs
//! Throughput calibration: how big should the pipeline queues be on this machine?
//!
//! A few single-block encryptions give bytes per nanosecond; the queues are
//! sized to roughly one millisecond of cipher work. Too small and the
//! transformer stalls waiting on I/O; too large and memory and progress
//! latency grow for nothing.

use std::time::{Duration, Instant};

use sysinfo::System;

use crate::constants::{
    MAX_BUFFER_BLOCKS, MIN_BUFFER_BLOCKS, MIN_SAMPLES, NS_PER_MS, PIPELINE_QUEUES,
    QUEUE_MEM_FRACTION,
};
use crate::crypto::BlockCipherEngine;

/// Result of one calibration run.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub samples: u32,
    pub block_size: usize,
    /// Sum of the per-sample encryption times.
    pub elapsed: Duration,
    pub bytes_per_ns: f64,
    /// Unclamped blocks-per-millisecond estimate.
    pub estimated_blocks: f64,
    /// Queue capacity actually used, in blocks.
    pub buffer_blocks: usize,
}

#[derive(Debug, Clone)]
pub struct ThroughputCalibrator {
    samples: u32,
    max_blocks: Option<usize>,
}

impl ThroughputCalibrator {
    pub fn new(samples: u32) -> Self {
        Self {
            samples: samples.max(MIN_SAMPLES),
            max_blocks: None,
        }
    }

    /// Override the ceiling (otherwise derived from available memory).
    pub fn with_max_blocks(mut self, max_blocks: usize) -> Self {
        self.max_blocks = Some(max_blocks);
        self
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Time `samples` single-block encryptions and derive the queue capacity.
    pub fn calibrate<E: BlockCipherEngine + ?Sized>(&self, engine: &E) -> Calibration {
        let block_size = engine.block_size();
        let mut sample = vec![0u8; block_size];
        let mut elapsed = Duration::ZERO;

        for _ in 0..self.samples {
            let t0 = Instant::now();
            engine.encrypt_block(&mut sample);
            elapsed += t0.elapsed();
        }

        let bytes_per_ns = bytes_per_ns(block_size, self.samples, elapsed);
        let estimated_blocks = estimate_buffer_blocks(bytes_per_ns, block_size);
        let max_blocks = self
            .max_blocks
            .unwrap_or_else(|| memory_cap_blocks(block_size));
        let buffer_blocks = clamp_buffer_blocks(estimated_blocks, max_blocks);

        tracing::debug!(
            "[CALIBRATE] samples={} elapsed={:?} bytes_per_ns={:.4} estimate={:.1} buffer_blocks={}",
            self.samples,
            elapsed,
            bytes_per_ns,
            estimated_blocks,
            buffer_blocks
        );

        Calibration {
            samples: self.samples,
            block_size,
            elapsed,
            bytes_per_ns,
            estimated_blocks,
            buffer_blocks,
        }
    }
}

/// Average cipher throughput. Zero elapsed time yields +inf.
pub fn bytes_per_ns(block_size: usize, samples: u32, elapsed: Duration) -> f64 {
    (block_size as f64 * samples as f64) / elapsed.as_nanos() as f64
}

/// Blocks processed per millisecond: bytes/ns scaled by block size, times 1ms.
pub fn estimate_buffer_blocks(bytes_per_ns: f64, block_size: usize) -> f64 {
    let blocks_per_ns = bytes_per_ns * block_size as f64;
    blocks_per_ns * NS_PER_MS
}

/// Clamp an estimate into `[MIN_BUFFER_BLOCKS, max_blocks]`.
///
/// NaN and anything under the floor map to the floor; +inf maps to the ceiling.
pub fn clamp_buffer_blocks(estimate: f64, max_blocks: usize) -> usize {
    let max_blocks = max_blocks.max(MIN_BUFFER_BLOCKS);
    if estimate.is_nan() || estimate < MIN_BUFFER_BLOCKS as f64 {
        MIN_BUFFER_BLOCKS
    } else if estimate >= max_blocks as f64 {
        max_blocks
    } else {
        estimate as usize
    }
}

/// Largest per-queue capacity that keeps all queues within the memory budget.
pub fn memory_cap_blocks(block_size: usize) -> usize {
    let mut sys = System::new();
    sys.refresh_memory();
    let avail_bytes = sys.available_memory();
    if avail_bytes == 0 {
        // sysinfo reports 0 where it cannot read memory stats.
        return MAX_BUFFER_BLOCKS;
    }

    let budget = (avail_bytes as f64 * QUEUE_MEM_FRACTION) as u64;
    let per_slot = (block_size.max(1) * PIPELINE_QUEUES) as u64;
    let cap = (budget / per_slot).min(MAX_BUFFER_BLOCKS as u64) as usize;
    cap.max(MIN_BUFFER_BLOCKS)
}
