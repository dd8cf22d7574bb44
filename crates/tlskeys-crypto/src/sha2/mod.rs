//! SHA-2 hash algorithms used by the TLS 1.3 cipher suites.
//!
//! SHA-256 backs `TLS_AES_128_GCM_SHA256` and `TLS_CHACHA20_POLY1305_SHA256`,
//! SHA-384 backs `TLS_AES_256_GCM_SHA384`. Both wrap the RustCrypto
//! implementations behind the [`Digest`] provider trait.

use crate::provider::Digest;
use tlskeys_types::CryptoError;

// ---------------------------------------------------------------------------
// SHA-256
// ---------------------------------------------------------------------------

/// SHA-256 output size in bytes.
pub const SHA256_OUTPUT_SIZE: usize = 32;
/// SHA-256 block size in bytes.
pub const SHA256_BLOCK_SIZE: usize = 64;

/// SHA-256 hash context.
#[derive(Clone, Default)]
pub struct Sha256 {
    inner: ::sha2::Sha256,
}

impl Sha256 {
    /// Create a new SHA-256 hash context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb data into the hash state.
    pub fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        ::sha2::Digest::update(&mut self.inner, data);
        Ok(())
    }

    /// Finalize and return the digest; the context is reset afterwards.
    pub fn finish(&mut self) -> Result<[u8; SHA256_OUTPUT_SIZE], CryptoError> {
        Ok(::sha2::Digest::finalize_reset(&mut self.inner).into())
    }

    /// Reset the context to its initial state.
    pub fn reset(&mut self) {
        ::sha2::Digest::reset(&mut self.inner);
    }

    /// One-shot digest.
    pub fn digest(data: &[u8]) -> Result<[u8; SHA256_OUTPUT_SIZE], CryptoError> {
        let mut ctx = Self::new();
        ctx.update(data)?;
        ctx.finish()
    }
}

impl Digest for Sha256 {
    fn output_size(&self) -> usize {
        SHA256_OUTPUT_SIZE
    }

    fn block_size(&self) -> usize {
        SHA256_BLOCK_SIZE
    }

    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        Sha256::update(self, data)
    }

    fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError> {
        if out.len() < SHA256_OUTPUT_SIZE {
            return Err(CryptoError::BufferTooSmall {
                need: SHA256_OUTPUT_SIZE,
                got: out.len(),
            });
        }
        let digest = Sha256::finish(self)?;
        out[..SHA256_OUTPUT_SIZE].copy_from_slice(&digest);
        Ok(())
    }

    fn reset(&mut self) {
        Sha256::reset(self);
    }
}

// ---------------------------------------------------------------------------
// SHA-384
// ---------------------------------------------------------------------------

/// SHA-384 output size in bytes.
pub const SHA384_OUTPUT_SIZE: usize = 48;
/// SHA-384 block size in bytes.
pub const SHA384_BLOCK_SIZE: usize = 128;

/// SHA-384 hash context.
#[derive(Clone, Default)]
pub struct Sha384 {
    inner: ::sha2::Sha384,
}

impl Sha384 {
    /// Create a new SHA-384 hash context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb data into the hash state.
    pub fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        ::sha2::Digest::update(&mut self.inner, data);
        Ok(())
    }

    /// Finalize and return the digest; the context is reset afterwards.
    pub fn finish(&mut self) -> Result<[u8; SHA384_OUTPUT_SIZE], CryptoError> {
        Ok(::sha2::Digest::finalize_reset(&mut self.inner).into())
    }

    /// Reset the context to its initial state.
    pub fn reset(&mut self) {
        ::sha2::Digest::reset(&mut self.inner);
    }

    /// One-shot digest.
    pub fn digest(data: &[u8]) -> Result<[u8; SHA384_OUTPUT_SIZE], CryptoError> {
        let mut ctx = Self::new();
        ctx.update(data)?;
        ctx.finish()
    }
}

impl Digest for Sha384 {
    fn output_size(&self) -> usize {
        SHA384_OUTPUT_SIZE
    }

    fn block_size(&self) -> usize {
        SHA384_BLOCK_SIZE
    }

    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        Sha384::update(self, data)
    }

    fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError> {
        if out.len() < SHA384_OUTPUT_SIZE {
            return Err(CryptoError::BufferTooSmall {
                need: SHA384_OUTPUT_SIZE,
                got: out.len(),
            });
        }
        let digest = Sha384::finish(self)?;
        out[..SHA384_OUTPUT_SIZE].copy_from_slice(&digest);
        Ok(())
    }

    fn reset(&mut self) {
        Sha384::reset(self);
    }
}
