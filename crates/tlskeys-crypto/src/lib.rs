#![forbid(unsafe_code)]
#![doc = "Digest and ephemeral key-agreement primitives for tlskeys."]

// Core traits
pub mod provider;

// Hash algorithms
#[cfg(feature = "sha2")]
pub mod sha2;

// Key agreement
#[cfg(feature = "ecdh")]
pub mod ecdh;
#[cfg(feature = "x25519")]
pub mod x25519;

/// Fill `buf` from the operating system CSPRNG.
pub fn random_bytes(buf: &mut [u8]) -> Result<(), tlskeys_types::CryptoError> {
    getrandom::getrandom(buf).map_err(|_| tlskeys_types::CryptoError::RandGenFail)
}
