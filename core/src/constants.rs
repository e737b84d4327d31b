//! Shared constants for calibration, queue sizing and file naming.

/// Environment variable holding the calibration sample count.
pub const SAMPLES_ENV: &str = "SAMPLES";

/// Defaults when the environment does not say otherwise.
pub const DEFAULT_SAMPLES: u32 = 10;
/// Anything below this is bumped up to it.
pub const MIN_SAMPLES: u32 = 10;

/// Suffix appended to the input path when no output path is given.
pub const DEFAULT_OUTPUT_SUFFIX: &str = ".cfb";

/// Queue capacity floor. A zero-capacity crossbeam channel is a rendezvous
/// channel, which would serialise every stage on every block.
pub const MIN_BUFFER_BLOCKS: usize = 1;

/// Hard ceiling on queue capacity (in blocks), regardless of throughput.
/// crossbeam's bounded channel allocates its slots up front.
pub const MAX_BUFFER_BLOCKS: usize = 64 * 1024;

/// Fraction of available memory the three pipeline queues may claim together.
pub const QUEUE_MEM_FRACTION: f64 = 0.25;

/// Number of bounded queues in the pipeline (raw blocks, transformed blocks, progress).
pub const PIPELINE_QUEUES: usize = 3;

/// One millisecond, in nanoseconds. Queues are sized to ~1ms of cipher work.
pub const NS_PER_MS: f64 = 1_000_000.0;

/// Length of the key produced by the passphrase KDF.
pub const KEY_LEN_32: usize = 32;
