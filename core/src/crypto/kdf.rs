//! crypto/kdf.rs
//! Passphrase-file key derivation.
//!
//! The key is SHA3-256 over the raw bytes of the passphrase file. No salt and
//! no stretching: the passphrase file is expected to hold high-entropy material.

use std::fs;
use std::path::Path;

use sha3::{Digest, Sha3_256};
use zeroize::Zeroizing;

use crate::constants::KEY_LEN_32;
use crate::types::StreamError;

/// Derive a 32-byte cipher key from passphrase bytes.
#[inline]
pub fn derive_key_32(passphrase: &[u8]) -> Zeroizing<[u8; KEY_LEN_32]> {
    let digest = Sha3_256::digest(passphrase);
    let mut key = Zeroizing::new([0u8; KEY_LEN_32]);
    key.copy_from_slice(&digest);
    key
}

/// Read a passphrase file and derive the key from its contents.
pub fn derive_key_from_file(path: &Path) -> Result<Zeroizing<[u8; KEY_LEN_32]>, StreamError> {
    let passphrase = Zeroizing::new(fs::read(path).map_err(|e| StreamError::io_at(path, e))?);
    Ok(derive_key_32(&passphrase))
}
