//! stream/progress.rs
//! Progress reporter stage and the sinks it can drive.

use std::time::Instant;

use crate::stream::types::{ProgressEvent, ProgressReceiver, StageReport};
use crate::telemetry::{Stage, TelemetryCounters};
use crate::types::StreamError;

/// Something that displays progress. Implemented by the CLI's terminal bar.
pub trait ProgressSink: Send {
    fn start(&mut self, total: u64);
    fn update(&mut self, offset: u64);
    fn finish(&mut self);
    /// The stream ended before reaching its total.
    fn abandon(&mut self) {}
}

impl<S: ProgressSink + ?Sized> ProgressSink for Box<S> {
    fn start(&mut self, total: u64) {
        (**self).start(total)
    }
    fn update(&mut self, offset: u64) {
        (**self).update(offset)
    }
    fn finish(&mut self) {
        (**self).finish()
    }
    fn abandon(&mut self) {
        (**self).abandon()
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn start(&mut self, _total: u64) {}
    fn update(&mut self, _offset: u64) {}
    fn finish(&mut self) {}
}

/// Keeps every call, for inspection after the run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingProgress {
    pub total: Option<u64>,
    pub offsets: Vec<u64>,
    pub finished: bool,
    pub abandoned: bool,
}

impl ProgressSink for RecordingProgress {
    fn start(&mut self, total: u64) {
        self.total = Some(total);
    }
    fn update(&mut self, offset: u64) {
        self.offsets.push(offset);
    }
    fn finish(&mut self) {
        self.finished = true;
    }
    fn abandon(&mut self) {
        self.abandoned = true;
    }
}

/// Drive `sink` from `events` until the final offset reaches the total.
///
/// A disconnect before that point means upstream stopped early; the sink is
/// abandoned and the stage still returns normally.
pub fn run_reporter<S: ProgressSink + ?Sized>(
    sink: &mut S,
    events: ProgressReceiver,
) -> Result<StageReport, StreamError> {
    let started = Instant::now();
    // Events are counted where they are sent, in the reader.
    let counters = TelemetryCounters::default();

    let total = match events.recv() {
        Ok(ProgressEvent::Total(total)) => total,
        Ok(ProgressEvent::Offset(offset)) => {
            return Err(StreamError::Validation(format!(
                "progress offset {} arrived before the total",
                offset
            )))
        }
        Err(_) => {
            tracing::debug!("[PROGRESS] channel closed before the total");
            sink.abandon();
            return Ok(StageReport::new(Stage::Progress, counters, started.elapsed()));
        }
    };
    sink.start(total);

    let mut last = 0u64;
    while last < total {
        match events.recv() {
            Ok(ProgressEvent::Offset(offset)) => {
                if offset < last {
                    tracing::warn!("[PROGRESS] offset went backwards: {} -> {}", last, offset);
                    continue;
                }
                last = offset;
                sink.update(offset);
            }
            Ok(ProgressEvent::Total(again)) => {
                return Err(StreamError::Validation(format!(
                    "second progress total {} after {}",
                    again, total
                )))
            }
            Err(_) => {
                tracing::debug!("[PROGRESS] channel closed at {} of {} bytes", last, total);
                sink.abandon();
                return Ok(StageReport::new(Stage::Progress, counters, started.elapsed()));
            }
        }
    }

    sink.finish();
    Ok(StageReport::new(Stage::Progress, counters, started.elapsed()))
}
