//! config.rs
//! Run configuration, built once by the entry point and passed down by reference.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_OUTPUT_SUFFIX, DEFAULT_SAMPLES, MIN_SAMPLES, SAMPLES_ENV};
use crate::crypto::CipherSuite;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// `SAMPLES` is set but not an unsigned integer.
    #[error("invalid SAMPLES value {0:?}: expected an unsigned integer")]
    InvalidSamples(String),

    /// Input file missing or not a regular file.
    #[error("file {} seems to be nonexistent", .0.display())]
    MissingInput(PathBuf),
}

/// Which way the transformer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Encrypt,
    Decrypt,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Encrypt => write!(f, "encrypt"),
            Mode::Decrypt => write!(f, "decrypt"),
        }
    }
}

/// Everything one run needs. No process-wide state is read after this is built.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: Mode,
    pub input: PathBuf,
    pub output: PathBuf,
    pub key_file: PathBuf,
    pub cipher: CipherSuite,
    /// Calibration sample count (already clamped to `MIN_SAMPLES`).
    pub samples: u32,
}

impl RunConfig {
    /// Build a config, resolving the output path against the input path.
    pub fn new(
        mode: Mode,
        input: impl Into<PathBuf>,
        key_file: impl Into<PathBuf>,
        output: Option<PathBuf>,
    ) -> Self {
        let input = input.into();
        let output = resolve_output_path(&input, output.as_deref());
        Self {
            mode,
            input,
            output,
            key_file: key_file.into(),
            cipher: CipherSuite::default(),
            samples: DEFAULT_SAMPLES,
        }
    }

    pub fn with_cipher(mut self, cipher: CipherSuite) -> Self {
        self.cipher = cipher;
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = clamp_samples(samples);
        self
    }

    /// Check what can be checked before any stage starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_file_exists(&self.input)?;
        ensure_file_exists(&self.key_file)?;
        Ok(())
    }
}

/// Default output path: the input path with `DEFAULT_OUTPUT_SUFFIX` appended.
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut name: OsString = input.as_os_str().to_owned();
    name.push(DEFAULT_OUTPUT_SUFFIX);
    PathBuf::from(name)
}

/// Pick the output path. An explicit path equal to the input is ignored in
/// favour of the default, so a run can never truncate its own input.
pub fn resolve_output_path(input: &Path, requested: Option<&Path>) -> PathBuf {
    match requested {
        Some(out) if out != input => out.to_path_buf(),
        Some(out) => {
            tracing::warn!(
                "[CONFIG] output path {} equals input path, using default",
                out.display()
            );
            default_output_path(input)
        }
        None => default_output_path(input),
    }
}

#[inline]
pub fn clamp_samples(samples: u32) -> u32 {
    samples.max(MIN_SAMPLES)
}

/// Parse a raw `SAMPLES` value. `None` or empty means the default.
pub fn parse_samples(raw: Option<&str>) -> Result<u32, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_SAMPLES),
        Some(s) => s
            .parse::<u32>()
            .map(clamp_samples)
            .map_err(|_| ConfigError::InvalidSamples(s.to_string())),
    }
}

/// Read the calibration sample count from the environment.
pub fn samples_from_env() -> Result<u32, ConfigError> {
    let raw = std::env::var(SAMPLES_ENV).ok();
    parse_samples(raw.as_deref())
}

/// A path counts as present only if it exists and is not a directory.
pub fn file_exists(path: &Path) -> bool {
    path.metadata().map(|m| !m.is_dir()).unwrap_or(false)
}

pub fn ensure_file_exists(path: &Path) -> Result<(), ConfigError> {
    if file_exists(path) {
        Ok(())
    } else {
        Err(ConfigError::MissingInput(path.to_path_buf()))
    }
}
