//! cfbcrypt-core
//!
//! Streaming CFB file encryption over a reader → transformer → writer
//! pipeline. No FFI, no async runtime.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod config;

pub mod crypto;
pub mod telemetry;

// Stream layer
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::{Mode, RunConfig};
    pub use crate::crypto::{build_engine, BlockCipherEngine, CipherSuite, CryptoError};
    pub use crate::stream::{
        decrypt_file, encrypt_file, run, run_with_engine, NoopProgress, ProgressSink,
        RecordingProgress,
    };
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::StreamError;
}
