//! X25519 Diffie-Hellman key exchange.
//!
//! X25519 is an elliptic-curve Diffie-Hellman function using Curve25519,
//! as defined in RFC 7748. Scalar multiplication is delegated to
//! `x25519-dalek`; key material is drawn from the OS CSPRNG.

use tlskeys_types::CryptoError;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroize;

/// X25519 key size in bytes (256 bits).
pub const X25519_KEY_SIZE: usize = 32;

/// An X25519 private key (scalar). Wiped on drop.
#[derive(Clone)]
pub struct X25519PrivateKey {
    key: StaticSecret,
}

/// An X25519 public key (u-coordinate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X25519PublicKey {
    key: [u8; X25519_KEY_SIZE],
}

impl X25519PrivateKey {
    /// Generate a new random X25519 private key.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut key = [0u8; X25519_KEY_SIZE];
        crate::random_bytes(&mut key)?;
        let secret = StaticSecret::from(key);
        key.zeroize();
        Ok(X25519PrivateKey { key: secret })
    }

    /// Create an X25519 private key from 32 raw bytes.
    pub fn new(bytes: &[u8]) -> Result<Self, CryptoError> {
        let mut key: [u8; X25519_KEY_SIZE] =
            bytes.try_into().map_err(|_| CryptoError::InvalidArg)?;
        let secret = StaticSecret::from(key);
        key.zeroize();
        Ok(X25519PrivateKey { key: secret })
    }

    /// Compute the corresponding public key.
    pub fn public_key(&self) -> X25519PublicKey {
        X25519PublicKey {
            key: PublicKey::from(&self.key).to_bytes(),
        }
    }

    /// Perform the X25519 Diffie-Hellman function with a peer's public key.
    ///
    /// Rejects the all-zero output produced by small-order peer points.
    pub fn diffie_hellman(&self, peer_public: &X25519PublicKey) -> Result<Vec<u8>, CryptoError> {
        let shared = self.key.diffie_hellman(&PublicKey::from(peer_public.key));
        if shared.as_bytes().iter().all(|&b| b == 0) {
            return Err(CryptoError::EccPointAtInfinity);
        }
        Ok(shared.as_bytes().to_vec())
    }
}

impl X25519PublicKey {
    /// Create an X25519 public key from 32 raw bytes.
    pub fn new(bytes: &[u8]) -> Result<Self, CryptoError> {
        let key: [u8; X25519_KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| CryptoError::EccInvalidPublicKey)?;
        Ok(X25519PublicKey { key })
    }

    /// Return the raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; X25519_KEY_SIZE] {
        &self.key
    }
}
