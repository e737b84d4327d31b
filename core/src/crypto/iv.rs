//! crypto/iv.rs
//! Per-run initialization vectors.
//!
//! Security notes:
//! - CFB under a fixed key must never reuse an IV. Every encryption draws a
//!   fresh one from the OS CSPRNG; nothing is derived or counted.
//! - The IV is not secret. It travels as the first block of the output file.

use bytes::BytesMut;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::crypto::types::CryptoError;

/// Generate a random IV of exactly `block_size` bytes.
pub fn generate_iv(block_size: usize) -> Result<BytesMut, CryptoError> {
    let mut iv = BytesMut::zeroed(block_size);
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|e| CryptoError::Rng(e.to_string()))?;
    Ok(iv)
}
