//! telemetry/snapshot.rs
//!
//! Immutable summary of one pipeline run. Serialisable so the CLI can dump it
//! as JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Mode;
use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub mode: Mode,
    pub block_size: usize,
    pub buffer_blocks: usize,
    pub counters: TelemetryCounters,
    /// Payload bytes through the keystream per second of wall-clock time.
    pub throughput_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(
        mode: Mode,
        counters: &TelemetryCounters,
        timer: &TelemetryTimer,
        block_size: usize,
        buffer_blocks: usize,
    ) -> Self {
        let elapsed = timer.elapsed();

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_transformed as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            mode,
            block_size,
            buffer_blocks,
            counters: counters.clone(),
            throughput_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Bytes that landed in the output file.
    pub fn output_bytes(&self) -> u64 {
        self.counters.bytes_written
    }

    pub fn stage_ms(&self, stage: Stage) -> f64 {
        self.stage_times.get_ms(stage)
    }

    /// Internal consistency of the byte accounting:
    /// - everything read was transformed, except a consumed IV
    /// - everything written is the payload, plus an emitted IV
    pub fn sanity_check(&self) -> bool {
        let c = &self.counters;
        match self.mode {
            Mode::Encrypt => {
                c.bytes_read == c.bytes_transformed
                    && c.bytes_written == c.bytes_transformed + c.iv_bytes
            }
            Mode::Decrypt => {
                c.bytes_read == c.bytes_transformed + c.iv_bytes
                    && c.bytes_written == c.bytes_transformed
            }
        }
    }
}
