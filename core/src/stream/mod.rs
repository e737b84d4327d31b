// ## `mod.rs`: public façade + re-exports

//! stream: a three-stage block pipeline with a progress side channel.
//!
//! Reader → Transformer → Writer over bounded queues, each stage on its own
//! scoped thread. Every block stream ends with exactly one `End` sentinel.

pub mod types;
pub mod io;
pub mod calibrate;
pub mod reader;
pub mod transform;
pub mod writer;
pub mod progress;
pub mod pipeline;
pub mod core;

pub use types::{BlockMessage, ProgressEvent, StageReport, TransformState};
pub use calibrate::{Calibration, ThroughputCalibrator};
pub use progress::{NoopProgress, ProgressSink, RecordingProgress};
pub use pipeline::run_pipeline;

pub use self::core::{decrypt_file, encrypt_file, run, run_with_engine};
