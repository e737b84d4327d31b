//! stream/transform.rs
//! Transformer stage: applies the CFB keystream between the reader and writer
//! queues, emitting (encrypt) or consuming (decrypt) the IV header block.

use std::time::Instant;

use bytes::BytesMut;

use crate::config::Mode;
use crate::crypto::{generate_iv, BlockCipherEngine, CfbStream};
use crate::stream::types::{BlockMessage, BlockReceiver, BlockSender, StageReport, TransformState};
use crate::telemetry::{Stage, TelemetryCounters};
use crate::types::StreamError;

/// Run the transformer until the sentinel arrives, then forward it.
pub fn run_transformer<E: BlockCipherEngine + ?Sized>(
    mode: Mode,
    engine: &E,
    input: BlockReceiver,
    output: BlockSender,
) -> Result<StageReport, StreamError> {
    match mode {
        Mode::Encrypt => encrypt_stream(engine, input, output),
        Mode::Decrypt => decrypt_stream(engine, input, output),
    }
}

fn encrypt_stream<E: BlockCipherEngine + ?Sized>(
    engine: &E,
    input: BlockReceiver,
    output: BlockSender,
) -> Result<StageReport, StreamError> {
    let started = Instant::now();
    let mut counters = TelemetryCounters::default();
    let mut state = TransformState::AwaitingIv;

    let iv = generate_iv(engine.block_size())?;
    let mut cfb = CfbStream::encrypter(engine, &iv)?;
    let iv_len = iv.len();
    tracing::trace!("[TRANSFORM] iv={}", hex::encode(&iv));
    send(&output, BlockMessage::Block(iv))?;
    counters.add_iv(iv_len);
    state = transition(state, TransformState::Streaming);

    loop {
        match recv(&input)? {
            BlockMessage::Block(mut block) => {
                cfb.apply_keystream(&mut block);
                let len = block.len();
                send(&output, BlockMessage::Block(block))?;
                counters.add_transformed(len);
            }
            BlockMessage::End => break,
        }
    }

    send(&output, BlockMessage::End)?;
    transition(state, TransformState::Finished);

    Ok(StageReport::new(Stage::Encrypt, counters, started.elapsed()))
}

fn decrypt_stream<E: BlockCipherEngine + ?Sized>(
    engine: &E,
    input: BlockReceiver,
    output: BlockSender,
) -> Result<StageReport, StreamError> {
    let started = Instant::now();
    let mut counters = TelemetryCounters::default();
    let block_size = engine.block_size();
    let mut state = TransformState::AwaitingIv;
    let mut iv = BytesMut::with_capacity(block_size);
    let mut cfb: Option<CfbStream<'_, E>> = None;

    loop {
        let mut block = match recv(&input)? {
            BlockMessage::Block(block) => block,
            BlockMessage::End => break,
        };

        if cfb.is_none() {
            // The IV may straddle blocks; take only what is still missing.
            let take = (block_size - iv.len()).min(block.len());
            iv.extend_from_slice(&block.split_to(take));
            if iv.len() < block_size {
                continue;
            }
            counters.add_iv(block_size);
            tracing::trace!("[TRANSFORM] iv={}", hex::encode(&iv));
            cfb = Some(CfbStream::decrypter(engine, &iv)?);
            state = transition(state, TransformState::Streaming);
        }

        if let Some(stream) = cfb.as_mut() {
            stream.apply_keystream(&mut block);
        }
        if block.is_empty() {
            continue;
        }

        let len = block.len();
        send(&output, BlockMessage::Block(block))?;
        counters.add_transformed(len);
    }

    if state == TransformState::AwaitingIv {
        return Err(StreamError::MalformedInput(format!(
            "input holds {} bytes, shorter than the {}-byte IV",
            iv.len(),
            block_size
        )));
    }

    send(&output, BlockMessage::End)?;
    transition(state, TransformState::Finished);

    Ok(StageReport::new(Stage::Decrypt, counters, started.elapsed()))
}

fn transition(from: TransformState, to: TransformState) -> TransformState {
    tracing::trace!("[TRANSFORM] {} -> {}", from, to);
    to
}

#[inline]
fn recv(input: &BlockReceiver) -> Result<BlockMessage, StreamError> {
    input
        .recv()
        .map_err(|_| StreamError::ChannelClosed("reader hung up before the sentinel"))
}

#[inline]
fn send(output: &BlockSender, msg: BlockMessage) -> Result<(), StreamError> {
    output
        .send(msg)
        .map_err(|_| StreamError::ChannelClosed("writer hung up on the transformer"))
}
