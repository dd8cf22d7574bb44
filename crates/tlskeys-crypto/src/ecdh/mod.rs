//! ECDH (Elliptic Curve Diffie-Hellman) key agreement.
//!
//! Provides ECDH key pair generation and shared secret computation over the
//! NIST prime curves used by TLS 1.3 (secp256r1, secp384r1, secp521r1), as
//! defined in NIST SP 800-56A. Curve arithmetic comes from the RustCrypto
//! `p256` / `p384` / `p521` crates.

use p256::elliptic_curve::sec1::ToEncodedPoint;
use tlskeys_types::{CryptoError, EccCurveId};
use zeroize::Zeroize;

/// Attempts before giving up on drawing an in-range scalar.
const MAX_KEYGEN_ATTEMPTS: usize = 8;

#[derive(Clone)]
enum EcdhSecret {
    P256(p256::SecretKey),
    P384(p384::SecretKey),
    P521(p521::SecretKey),
}

macro_rules! secret_from_slice {
    ($krate:ident, $bytes:expr) => {
        $krate::SecretKey::from_slice($bytes).map_err(|_| CryptoError::EccInvalidPrivateKey)
    };
}

macro_rules! shared_x_coordinate {
    ($krate:ident, $secret:expr, $peer:expr) => {{
        let peer = $krate::PublicKey::from_sec1_bytes($peer)
            .map_err(|_| CryptoError::EccInvalidPublicKey)?;
        let shared = $krate::ecdh::diffie_hellman($secret.to_nonzero_scalar(), peer.as_affine());
        shared.raw_secret_bytes().to_vec()
    }};
}

/// An ECDH key pair for key agreement.
///
/// The private scalar is wiped on drop by the curve crates.
#[derive(Clone)]
pub struct EcdhKeyPair {
    curve_id: EccCurveId,
    secret: EcdhSecret,
    /// The public point encoded in uncompressed form.
    public_key: Vec<u8>,
}

impl EcdhKeyPair {
    /// Generate a new ECDH key pair for the given curve.
    pub fn generate(curve_id: EccCurveId) -> Result<Self, CryptoError> {
        let mut scalar = vec![0u8; curve_id.field_size()];
        let mut result = Err(CryptoError::EccInvalidPrivateKey);
        for _ in 0..MAX_KEYGEN_ATTEMPTS {
            crate::random_bytes(&mut scalar)?;
            if curve_id == EccCurveId::NistP521 {
                // n < 2^521: keep only the low bit of the leading byte
                scalar[0] &= 0x01;
            }
            result = Self::from_private_key(curve_id, &scalar);
            if result.is_ok() {
                break;
            }
        }
        scalar.zeroize();
        result
    }

    /// Create an ECDH key pair from a big-endian private scalar.
    pub fn from_private_key(
        curve_id: EccCurveId,
        private_key: &[u8],
    ) -> Result<Self, CryptoError> {
        if private_key.len() != curve_id.field_size() {
            return Err(CryptoError::EccInvalidPrivateKey);
        }
        let (secret, public_key) = match curve_id {
            EccCurveId::NistP256 => {
                let sk = secret_from_slice!(p256, private_key)?;
                let pk = sk.public_key().to_encoded_point(false).as_bytes().to_vec();
                (EcdhSecret::P256(sk), pk)
            }
            EccCurveId::NistP384 => {
                let sk = secret_from_slice!(p384, private_key)?;
                let pk = sk.public_key().to_encoded_point(false).as_bytes().to_vec();
                (EcdhSecret::P384(sk), pk)
            }
            EccCurveId::NistP521 => {
                let sk = secret_from_slice!(p521, private_key)?;
                let pk = sk.public_key().to_encoded_point(false).as_bytes().to_vec();
                (EcdhSecret::P521(sk), pk)
            }
        };
        Ok(Self {
            curve_id,
            secret,
            public_key,
        })
    }

    /// The curve this key pair lives on.
    pub fn curve_id(&self) -> EccCurveId {
        self.curve_id
    }

    /// Compute the shared secret from the peer's SEC1-encoded public key.
    ///
    /// Returns the x-coordinate of the shared point.
    pub fn compute_shared_secret(&self, peer_public_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let shared = match &self.secret {
            EcdhSecret::P256(sk) => shared_x_coordinate!(p256, sk, peer_public_key),
            EcdhSecret::P384(sk) => shared_x_coordinate!(p384, sk, peer_public_key),
            EcdhSecret::P521(sk) => shared_x_coordinate!(p521, sk, peer_public_key),
        };
        Ok(shared)
    }

    /// Return the public key in uncompressed point encoding.
    pub fn public_key_bytes(&self) -> &[u8] {
        &self.public_key
    }
}
