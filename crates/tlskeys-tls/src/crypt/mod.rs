//! TLS cryptographic operations wrapper.
//!
//! Bridges the TLS 1.3 key schedule with the underlying `tlskeys-crypto`
//! primitives. Cipher-suite hash selection and AEAD key/nonce sizing are
//! threaded through [`CipherSuiteParams`] and nowhere else.

pub mod export;
pub mod hkdf;
pub mod key_schedule;
pub mod traffic_keys;
pub mod transcript;

use crate::CipherSuite;
use tlskeys_crypto::provider::{new_digest, Digest};
use tlskeys_types::{EccCurveId, HashAlgId, TlsError};

/// A factory closure that creates fresh Digest instances.
pub type HashFactory = Box<dyn Fn() -> Box<dyn Digest> + Send + Sync>;

/// AEAD nonce length shared by every TLS 1.3 cipher suite (RFC 8446 §5.3).
pub const AEAD_NONCE_LENGTH: usize = 12;

/// Parameters associated with a TLS 1.3 cipher suite.
#[derive(Debug, Clone)]
pub struct CipherSuiteParams {
    /// The cipher suite identifier.
    pub suite: CipherSuite,
    /// Transcript / HKDF hash algorithm.
    pub hash_alg: HashAlgId,
    /// Hash output size in bytes (32 for SHA-256, 48 for SHA-384).
    pub hash_len: usize,
    /// AEAD key length in bytes.
    pub key_len: usize,
    /// AEAD IV/nonce length in bytes (always 12 for TLS 1.3).
    pub iv_len: usize,
    /// AEAD tag length in bytes (always 16).
    pub tag_len: usize,
}

impl CipherSuiteParams {
    /// Look up parameters for a TLS 1.3 cipher suite.
    pub fn from_suite(suite: CipherSuite) -> Result<Self, TlsError> {
        let (hash_alg, key_len) = match suite {
            CipherSuite::TLS_AES_128_GCM_SHA256 => (HashAlgId::Sha256, 16),
            CipherSuite::TLS_AES_256_GCM_SHA384 => (HashAlgId::Sha384, 32),
            CipherSuite::TLS_CHACHA20_POLY1305_SHA256 => (HashAlgId::Sha256, 32),
            CipherSuite::TLS_AES_128_CCM_SHA256 => (HashAlgId::Sha256, 16),
            _ => return Err(TlsError::NoSharedCipherSuite),
        };
        Ok(Self {
            suite,
            hash_alg,
            hash_len: hash_alg.output_size(),
            key_len,
            iv_len: AEAD_NONCE_LENGTH,
            tag_len: 16,
        })
    }

    /// Create a HashFactory for this cipher suite's hash algorithm.
    pub fn hash_factory(&self) -> HashFactory {
        let alg = self.hash_alg;
        Box::new(move || new_digest(alg))
    }
}

/// TLS named group identifiers (for key exchange).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamedGroup(pub u16);

impl NamedGroup {
    // Elliptic curves
    pub const SECP256R1: Self = Self(0x0017);
    pub const SECP384R1: Self = Self(0x0018);
    pub const SECP521R1: Self = Self(0x0019);
    pub const X25519: Self = Self(0x001D);
    pub const X448: Self = Self(0x001E);
    // Finite field DH
    pub const FFDHE2048: Self = Self(0x0100);
    pub const FFDHE3072: Self = Self(0x0101);
    pub const FFDHE4096: Self = Self(0x0102);

    /// The NIST curve behind this group, if it is one.
    pub fn ecc_curve_id(self) -> Option<EccCurveId> {
        match self {
            NamedGroup::SECP256R1 => Some(EccCurveId::NistP256),
            NamedGroup::SECP384R1 => Some(EccCurveId::NistP384),
            NamedGroup::SECP521R1 => Some(EccCurveId::NistP521),
            _ => None,
        }
    }

    /// The group for a NIST curve.
    pub fn from_ecc_curve_id(curve: EccCurveId) -> Self {
        match curve {
            EccCurveId::NistP256 => NamedGroup::SECP256R1,
            EccCurveId::NistP384 => NamedGroup::SECP384R1,
            EccCurveId::NistP521 => NamedGroup::SECP521R1,
        }
    }

    /// Whether an ephemeral key can be generated for this group.
    pub fn is_supported(self) -> bool {
        self == NamedGroup::X25519 || self.ecc_curve_id().is_some()
    }
}
