//! stream/reader.rs
//! Reader stage: file → block queue (+ progress side channel).

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;

use crate::stream::io::read_exact_or_eof;
use crate::stream::types::{BlockMessage, BlockSender, ProgressEvent, ProgressSender, StageReport};
use crate::telemetry::{Stage, TelemetryCounters};
use crate::types::StreamError;

/// Open `path`, stat it, and stream it as blocks of `block_size`.
///
/// The file handle is closed before this returns.
pub fn run_reader(
    path: &Path,
    block_size: usize,
    blocks: BlockSender,
    progress: ProgressSender,
) -> Result<StageReport, StreamError> {
    let file = File::open(path).map_err(|e| StreamError::io_at(path, e))?;
    let total = file
        .metadata()
        .map_err(|e| StreamError::io_at(path, e))?
        .len();

    tracing::debug!("[READER] {} opened, {} bytes", path.display(), total);

    read_blocks(BufReader::new(file), total, block_size, blocks, progress)
        .map_err(|e| e.at_path(path))
}

/// Stream `reader` as blocks. `total` is announced first on the progress
/// channel; each block is followed by the cumulative offset.
///
/// Progress is best effort: once the reporter has hung up (it stops at
/// `total`) further offsets are dropped instead of failing the stage.
pub fn read_blocks<R: Read>(
    mut reader: R,
    total: u64,
    block_size: usize,
    blocks: BlockSender,
    progress: ProgressSender,
) -> Result<StageReport, StreamError> {
    let started = Instant::now();
    let mut counters = TelemetryCounters::default();
    let mut progress_open = true;
    let mut offset = 0u64;

    let mut announce = |event: ProgressEvent, counters: &mut TelemetryCounters| {
        if progress_open {
            if progress.send(event).is_ok() {
                counters.add_progress_event();
            } else {
                tracing::debug!("[READER] progress receiver gone, dropping further events");
                progress_open = false;
            }
        }
    };

    announce(ProgressEvent::Total(total), &mut counters);

    loop {
        let block = read_exact_or_eof(&mut reader, block_size)?;
        let len = block.len();
        if len == 0 {
            break;
        }

        blocks
            .send(BlockMessage::Block(block))
            .map_err(|_| StreamError::ChannelClosed("transformer hung up on the reader"))?;
        counters.add_read(len);

        offset += len as u64;
        announce(ProgressEvent::Offset(offset), &mut counters);

        // A short block can only be the last one.
        if len < block_size {
            break;
        }
    }

    if offset != total {
        tracing::warn!(
            "[READER] file size changed while reading: expected {} bytes, read {}",
            total,
            offset
        );
    }

    drop(reader);

    blocks
        .send(BlockMessage::End)
        .map_err(|_| StreamError::ChannelClosed("transformer hung up before the sentinel"))?;

    tracing::debug!("[READER] finished, {} blocks, {} bytes", counters.blocks_read, offset);

    Ok(StageReport::new(Stage::Read, counters, started.elapsed()))
}
