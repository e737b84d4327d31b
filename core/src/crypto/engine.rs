//! crypto/engine.rs
//! Block cipher engines.
//!
//! Design:
//! - The pipeline only needs three things from a cipher: its block size and
//!   in-place encrypt/decrypt of exactly one block. `BlockCipherEngine` is that seam.
//! - `CipherEngine<C>` adapts any RustCrypto `cipher` 0.4 block cipher.
//! - Engines are `Send + Sync` so the transformer thread can borrow one from
//!   the orchestrator's scope.

use aes::Aes256;
use cipher::{Block, BlockDecrypt, BlockEncrypt, BlockSizeUser, KeyInit, KeySizeUser};
use serpent::Serpent;

use crate::crypto::types::{CipherSuite, CryptoError};

/// A keyed block cipher operating in place on single blocks.
///
/// Contract: `encrypt_block` / `decrypt_block` receive exactly `block_size()`
/// bytes. Callers in this crate guarantee it; engines may panic otherwise.
pub trait BlockCipherEngine: Send + Sync {
    fn block_size(&self) -> usize;
    fn encrypt_block(&self, block: &mut [u8]);
    fn decrypt_block(&self, block: &mut [u8]);
}

/// Adapter from a RustCrypto block cipher to `BlockCipherEngine`.
pub struct CipherEngine<C> {
    cipher: C,
}

impl<C: KeyInit> CipherEngine<C> {
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        let cipher = C::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLen {
            expected: <C as KeySizeUser>::key_size(),
            actual: key.len(),
        })?;
        Ok(Self { cipher })
    }
}

impl<C> BlockCipherEngine for CipherEngine<C>
where
    C: BlockEncrypt + BlockDecrypt + Send + Sync,
{
    #[inline]
    fn block_size(&self) -> usize {
        <C as BlockSizeUser>::block_size()
    }

    #[inline]
    fn encrypt_block(&self, block: &mut [u8]) {
        self.cipher.encrypt_block(Block::<C>::from_mut_slice(block));
    }

    #[inline]
    fn decrypt_block(&self, block: &mut [u8]) {
        self.cipher.decrypt_block(Block::<C>::from_mut_slice(block));
    }
}

impl<E: BlockCipherEngine + ?Sized> BlockCipherEngine for Box<E> {
    fn block_size(&self) -> usize {
        (**self).block_size()
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        (**self).encrypt_block(block)
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        (**self).decrypt_block(block)
    }
}

/// Build the engine for `suite` keyed with `key` (32 bytes for both suites).
pub fn build_engine(
    suite: CipherSuite,
    key: &[u8],
) -> Result<Box<dyn BlockCipherEngine>, CryptoError> {
    let engine: Box<dyn BlockCipherEngine> = match suite {
        CipherSuite::Aes256 => Box::new(CipherEngine::<Aes256>::new(key)?),
        CipherSuite::Serpent => Box::new(CipherEngine::<Serpent>::new(key)?),
    };
    tracing::debug!(
        "[ENGINE] {} ready, block_size={}",
        suite,
        engine.block_size()
    );
    Ok(engine)
}
