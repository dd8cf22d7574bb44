//! Trait-based provider mechanism for hash algorithms.
//!
//! The TLS layer never names a concrete hash type; it works through boxed
//! [`Digest`] instances produced by a factory closure, so cipher-suite hash
//! selection happens in exactly one place.

use tlskeys_types::{CryptoError, HashAlgId};

/// A hash / message digest algorithm.
pub trait Digest: Send + Sync {
    /// The output size in bytes.
    fn output_size(&self) -> usize;

    /// The internal block size in bytes.
    fn block_size(&self) -> usize;

    /// Feed data into the hash state.
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError>;

    /// Finalize the hash and write the digest to `out`.
    /// The length of `out` must be at least `output_size()`.
    fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError>;

    /// Reset the hash state to process a new message.
    fn reset(&mut self);
}

/// Create a boxed digest for the given algorithm.
#[cfg(feature = "sha2")]
pub fn new_digest(alg: HashAlgId) -> Box<dyn Digest> {
    match alg {
        HashAlgId::Sha256 => Box::new(crate::sha2::Sha256::new()),
        HashAlgId::Sha384 => Box::new(crate::sha2::Sha384::new()),
    }
}

/// One-shot hash computation.
#[cfg(feature = "sha2")]
pub fn hash(alg: HashAlgId, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut ctx = new_digest(alg);
    ctx.update(data)?;
    let mut out = vec![0u8; ctx.output_size()];
    ctx.finish(&mut out)?;
    Ok(out)
}
