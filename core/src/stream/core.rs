// ## `core.rs`: stable public API

use std::path::Path;
use std::time::Instant;

use crate::config::{Mode, RunConfig};
use crate::crypto::{build_engine, derive_key_from_file, BlockCipherEngine};
use crate::stream::calibrate::ThroughputCalibrator;
use crate::stream::pipeline::run_pipeline;
use crate::stream::progress::ProgressSink;
use crate::telemetry::{Stage, TelemetrySnapshot};
use crate::types::StreamError;

/// Full run: validate, derive the key, build the engine, calibrate, stream.
pub fn run<S: ProgressSink + ?Sized>(
    config: &RunConfig,
    sink: &mut S,
) -> Result<TelemetrySnapshot, StreamError> {
    config.validate()?;

    let key = derive_key_from_file(&config.key_file)?;
    let engine = build_engine(config.cipher, key.as_slice())?;
    drop(key);

    run_with_engine(config, engine.as_ref(), sink)
}

/// Same as [`run`] but with a ready engine; the key file is not read.
pub fn run_with_engine<E, S>(
    config: &RunConfig,
    engine: &E,
    sink: &mut S,
) -> Result<TelemetrySnapshot, StreamError>
where
    E: BlockCipherEngine + ?Sized,
    S: ProgressSink + ?Sized,
{
    let t0 = Instant::now();
    let calibration = ThroughputCalibrator::new(config.samples).calibrate(engine);
    let calibrate_time = t0.elapsed();

    tracing::info!(
        "[PIPELINE] {} {} with {} ({} blocks per queue)",
        config.mode,
        config.input.display(),
        config.cipher,
        calibration.buffer_blocks
    );

    let mut snapshot = run_pipeline(
        &config.input,
        &config.output,
        engine,
        config.mode,
        calibration.buffer_blocks,
        sink,
    )?;
    snapshot.stage_times.add(Stage::Calibrate, calibrate_time);
    Ok(snapshot)
}

/// Encrypt `input` into `output` (default: `input` + `.cfb`).
pub fn encrypt_file<S: ProgressSink + ?Sized>(
    input: &Path,
    key_file: &Path,
    output: Option<&Path>,
    sink: &mut S,
) -> Result<TelemetrySnapshot, StreamError> {
    let config = RunConfig::new(Mode::Encrypt, input, key_file, output.map(Path::to_path_buf));
    run(&config, sink)
}

/// Decrypt `input` into `output` (default: `input` + `.cfb`).
pub fn decrypt_file<S: ProgressSink + ?Sized>(
    input: &Path,
    key_file: &Path,
    output: Option<&Path>,
    sink: &mut S,
) -> Result<TelemetrySnapshot, StreamError> {
    let config = RunConfig::new(Mode::Decrypt, input, key_file, output.map(Path::to_path_buf));
    run(&config, sink)
}
