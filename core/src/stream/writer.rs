//! stream/writer.rs
//! Writer stage: block queue → output file, in arrival order.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use crate::stream::types::{BlockMessage, BlockReceiver, StageReport};
use crate::telemetry::{Stage, TelemetryCounters};
use crate::types::StreamError;

/// Create (or truncate) `path` and drain `input` into it.
///
/// Data is flushed and synced before the report is returned.
pub fn run_writer(path: &Path, input: BlockReceiver) -> Result<StageReport, StreamError> {
    let file = File::create(path).map_err(|e| StreamError::io_at(path, e))?;
    let mut out = BufWriter::new(file);

    let report = write_blocks(&mut out, input).map_err(|e| e.at_path(path))?;

    let file = out
        .into_inner()
        .map_err(|e| StreamError::io_at(path, e.into_error()))?;
    file.sync_all().map_err(|e| StreamError::io_at(path, e))?;

    tracing::debug!(
        "[WRITER] {} closed, {} bytes",
        path.display(),
        report.counters.bytes_written
    );
    Ok(report)
}

/// Write every block until the sentinel. A hang-up before the sentinel is an
/// error: the output would be silently truncated otherwise.
pub fn write_blocks<W: Write>(out: &mut W, input: BlockReceiver) -> Result<StageReport, StreamError> {
    let started = Instant::now();
    let mut counters = TelemetryCounters::default();

    loop {
        match input.recv() {
            Ok(BlockMessage::Block(block)) => {
                out.write_all(&block)?;
                counters.add_written(block.len());
            }
            Ok(BlockMessage::End) => break,
            Err(_) => {
                return Err(StreamError::ChannelClosed(
                    "transformer hung up before the sentinel",
                ))
            }
        }
    }

    out.flush()?;
    Ok(StageReport::new(Stage::Write, counters, started.elapsed()))
}
