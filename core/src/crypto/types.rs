use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised while building or driving the block cipher.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Invalid key length provided to the cipher.
    #[error("invalid key length: expected={expected}, actual={actual}")]
    InvalidKeyLen { expected: usize, actual: usize },

    /// IV (or any block handed to the engine) does not match the cipher block size.
    #[error("invalid block length: expected={expected}, actual={actual}")]
    InvalidBlockLen { expected: usize, actual: usize },

    /// The OS random source failed.
    #[error("random source failure: {0}")]
    Rng(String),

    /// Unknown cipher name on the command line or in config.
    #[error("unsupported cipher suite: {0}")]
    UnsupportedCipher(String),
}

/// Block ciphers this tool can run in CFB mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CipherSuite {
    #[default]
    Aes256,
    Serpent,
}

impl CipherSuite {
    pub const ALL: [CipherSuite; 2] = [CipherSuite::Aes256, CipherSuite::Serpent];

    pub fn name(&self) -> &'static str {
        match self {
            CipherSuite::Aes256 => "aes256",
            CipherSuite::Serpent => "serpent",
        }
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherSuite {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aes256" | "aes-256" | "aes" => Ok(CipherSuite::Aes256),
            "serpent" | "serpent256" | "serpent-256" => Ok(CipherSuite::Serpent),
            other => Err(CryptoError::UnsupportedCipher(other.to_string())),
        }
    }
}
