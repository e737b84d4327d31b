// ## 📂 File: `src/stream/pipeline.rs`
// ## Pure pipeline wiring: reader → transformer → writer, reader → progress

use std::fs;
use std::path::Path;
use std::thread::{self, ScopedJoinHandle};

use crossbeam::channel::bounded;

use crate::config::Mode;
use crate::crypto::BlockCipherEngine;
use crate::stream::progress::{run_reporter, ProgressSink};
use crate::stream::reader::run_reader;
use crate::stream::transform::run_transformer;
use crate::stream::types::{BlockMessage, ProgressEvent, StageReport};
use crate::stream::writer::run_writer;
use crate::telemetry::{TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::StreamError;

/// Run one encryption or decryption of `input` into `output`.
///
/// Every stage gets its own scoped thread; the queues between them hold at
/// most `buffer_blocks` blocks each. All stages are joined before this
/// returns, and a failure anywhere is reported by its root cause.
pub fn run_pipeline<E, S>(
    input: &Path,
    output: &Path,
    engine: &E,
    mode: Mode,
    buffer_blocks: usize,
    sink: &mut S,
) -> Result<TelemetrySnapshot, StreamError>
where
    E: BlockCipherEngine + ?Sized,
    S: ProgressSink + ?Sized,
{
    if same_file(input, output) {
        return Err(StreamError::Validation(format!(
            "output path {} would overwrite the input",
            output.display()
        )));
    }

    let block_size = engine.block_size();
    let capacity = buffer_blocks.max(1);
    let mut timer = TelemetryTimer::new();

    tracing::debug!(
        "[PIPELINE] start {} {} -> {} (block_size={}, capacity={})",
        mode,
        input.display(),
        output.display(),
        block_size,
        capacity
    );

    // ---- Channels ----
    let (raw_tx, raw_rx) = bounded::<BlockMessage>(capacity);
    let (out_tx, out_rx) = bounded::<BlockMessage>(capacity);
    let (prog_tx, prog_rx) = bounded::<ProgressEvent>(capacity);

    let results = thread::scope(|scope| {
        // ---- Reader ----
        let reader = scope.spawn(move || run_reader(input, block_size, raw_tx, prog_tx));

        // ---- Transformer ----
        let transformer = scope.spawn(move || run_transformer(mode, engine, raw_rx, out_tx));

        // ---- Writer ----
        let writer = scope.spawn(move || run_writer(output, out_rx));

        // ---- Progress ----
        let progress = scope.spawn(move || run_reporter(sink, prog_rx));

        [
            join_stage("reader", reader),
            join_stage("transformer", transformer),
            join_stage("writer", writer),
            join_stage("progress", progress),
        ]
    });

    let reports = collect_reports(results)?;

    let mut counters = TelemetryCounters::default();
    for report in &reports {
        counters.merge(&report.counters);
        timer.add_stage_time(report.stage, report.busy);
    }
    timer.finish();

    let snapshot = TelemetrySnapshot::from(mode, &counters, &timer, block_size, capacity);
    tracing::debug!(
        "[PIPELINE] done: {} bytes in, {} bytes out in {:?}",
        counters.bytes_read,
        counters.bytes_written,
        snapshot.elapsed
    );
    Ok(snapshot)
}

fn join_stage(
    name: &'static str,
    handle: ScopedJoinHandle<'_, Result<StageReport, StreamError>>,
) -> Result<StageReport, StreamError> {
    handle.join().unwrap_or_else(|_| {
        tracing::error!("[PIPELINE] {} stage panicked", name);
        Err(StreamError::StagePanicked(name))
    })
}

/// All reports if every stage succeeded, otherwise the root cause.
pub fn collect_reports<I>(results: I) -> Result<Vec<StageReport>, StreamError>
where
    I: IntoIterator<Item = Result<StageReport, StreamError>>,
{
    let mut reports = Vec::new();
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::debug!("[PIPELINE] stage error: {}", e);
                errors.push(e);
            }
        }
    }

    match root_cause(errors) {
        Some(e) => Err(e),
        None => Ok(reports),
    }
}

/// The first error that is not a mere channel hang-up; failing that, the
/// first error at all. `None` for an empty list.
pub fn root_cause(errors: Vec<StreamError>) -> Option<StreamError> {
    let mut fallback = None;
    for e in errors {
        if !e.is_channel_closed() {
            return Some(e);
        }
        if fallback.is_none() {
            fallback = Some(e);
        }
    }
    fallback
}

/// True when both paths name the same file, hard links included on unix.
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        if let (Ok(ma), Ok(mb)) = (fs::metadata(a), fs::metadata(b)) {
            return ma.dev() == mb.dev() && ma.ino() == mb.ino();
        }
    }

    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
