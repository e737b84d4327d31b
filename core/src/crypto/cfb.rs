//! crypto/cfb.rs
//! Full-block cipher feedback (CFB) keystream over a `BlockCipherEngine`.
//!
//! Design:
//! - Register starts as the IV. Each keystream block is E(register).
//! - The register is then refilled with the ciphertext bytes just produced
//!   (encrypt) or just consumed (decrypt), so both directions derive the same
//!   keystream and only the XOR operand pairing differs.
//! - State survives across calls: feeding a stream in arbitrary slices gives
//!   the same bytes as one call over the whole buffer.
//!
//! Error propagation (decrypt): a flipped ciphertext bit flips the same
//! plaintext bit and garbles the following block; everything after recovers.

use crate::crypto::engine::BlockCipherEngine;
use crate::crypto::types::CryptoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

pub struct CfbStream<'e, E: BlockCipherEngine + ?Sized> {
    engine: &'e E,
    direction: Direction,
    /// Feedback register (next cipher input).
    next: Vec<u8>,
    /// Current keystream block.
    out: Vec<u8>,
    /// How many bytes of `out` are already spent.
    out_used: usize,
}

impl<'e, E: BlockCipherEngine + ?Sized> CfbStream<'e, E> {
    pub fn new(engine: &'e E, iv: &[u8], direction: Direction) -> Result<Self, CryptoError> {
        let block_size = engine.block_size();
        if iv.len() != block_size {
            return Err(CryptoError::InvalidBlockLen {
                expected: block_size,
                actual: iv.len(),
            });
        }
        Ok(Self {
            engine,
            direction,
            next: iv.to_vec(),
            out: vec![0u8; block_size],
            out_used: block_size,
        })
    }

    pub fn encrypter(engine: &'e E, iv: &[u8]) -> Result<Self, CryptoError> {
        Self::new(engine, iv, Direction::Encrypt)
    }

    pub fn decrypter(engine: &'e E, iv: &[u8]) -> Result<Self, CryptoError> {
        Self::new(engine, iv, Direction::Decrypt)
    }

    /// XOR `buf` with the keystream in place, advancing the feedback chain.
    pub fn apply_keystream(&mut self, buf: &mut [u8]) {
        let block_size = self.out.len();
        let mut pos = 0;

        while pos < buf.len() {
            if self.out_used == block_size {
                self.out.copy_from_slice(&self.next);
                self.engine.encrypt_block(&mut self.out);
                self.out_used = 0;
            }

            let n = (block_size - self.out_used).min(buf.len() - pos);
            let chunk = &mut buf[pos..pos + n];
            let keystream = &self.out[self.out_used..self.out_used + n];
            let register = &mut self.next[self.out_used..self.out_used + n];

            match self.direction {
                Direction::Encrypt => {
                    xor_in_place(chunk, keystream);
                    register.copy_from_slice(chunk);
                }
                Direction::Decrypt => {
                    register.copy_from_slice(chunk);
                    xor_in_place(chunk, keystream);
                }
            }

            self.out_used += n;
            pos += n;
        }
    }
}

#[inline]
fn xor_in_place(dst: &mut [u8], keystream: &[u8]) {
    for (d, k) in dst.iter_mut().zip(keystream) {
        *d ^= *k;
    }
}
