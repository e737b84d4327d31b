//! stream/types.rs
//! Messages exchanged between pipeline stages.

use std::fmt;
use std::time::Duration;

use bytes::BytesMut;
use crossbeam::channel::{Receiver, Sender};

use crate::telemetry::{Stage, TelemetryCounters};

/// One element of a block queue.
///
/// `Block` carries an owned buffer of at most `block_size` bytes; only the
/// last block of a stream may be short. `End` is the sentinel: exactly one
/// per stream, always last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockMessage {
    Block(BytesMut),
    End,
}

/// Progress side channel. The first event is always `Total`; `Offset`s
/// follow in non-decreasing order and the last one equals the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    Total(u64),
    Offset(u64),
}

pub type BlockSender = Sender<BlockMessage>;
pub type BlockReceiver = Receiver<BlockMessage>;
pub type ProgressSender = Sender<ProgressEvent>;
pub type ProgressReceiver = Receiver<ProgressEvent>;

/// Transformer lifecycle, shared by both directions.
///
/// Encrypt leaves `AwaitingIv` right after emitting its IV; decrypt only
/// after consuming one. Both reach `Finished` on the sentinel and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformState {
    AwaitingIv,
    Streaming,
    Finished,
}

impl fmt::Display for TransformState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransformState::AwaitingIv => "awaiting-iv",
            TransformState::Streaming => "streaming",
            TransformState::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// What a stage hands back to the orchestrator when it joins.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub stage: Stage,
    pub counters: TelemetryCounters,
    pub busy: Duration,
}

impl StageReport {
    pub fn new(stage: Stage, counters: TelemetryCounters, busy: Duration) -> Self {
        Self { stage, counters, busy }
    }
}
