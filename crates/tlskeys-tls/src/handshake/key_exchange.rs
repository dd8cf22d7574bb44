//! TLS 1.3 ephemeral key exchange (X25519, secp256r1/384r1/521r1).

use crate::crypt::NamedGroup;
use tlskeys_crypto::ecdh::EcdhKeyPair;
use tlskeys_crypto::x25519::{X25519PrivateKey, X25519PublicKey};
use tlskeys_types::TlsError;

enum KeyExchangeInner {
    X25519(X25519PrivateKey),
    Ecdh(Box<EcdhKeyPair>),
}

/// Ephemeral private key for one named group, with its encoded public share.
pub struct KeyExchange {
    group: NamedGroup,
    inner: KeyExchangeInner,
    public_key_bytes: Vec<u8>,
}

impl KeyExchange {
    /// Generate a new ephemeral key pair.
    ///
    /// Groups without a primitive fail with [`TlsError::UnsupportedGroup`];
    /// primitive failures (e.g. the CSPRNG) surface as [`TlsError::CryptoError`].
    pub fn generate(group: NamedGroup) -> Result<Self, TlsError> {
        if group == NamedGroup::X25519 {
            let private_key = X25519PrivateKey::generate()?;
            let public_key_bytes = private_key.public_key().as_bytes().to_vec();
            return Ok(Self {
                group,
                inner: KeyExchangeInner::X25519(private_key),
                public_key_bytes,
            });
        }
        let curve = group
            .ecc_curve_id()
            .ok_or(TlsError::UnsupportedGroup(group.0))?;
        let kp = EcdhKeyPair::generate(curve)?;
        let public_key_bytes = kp.public_key_bytes().to_vec();
        Ok(Self {
            group,
            inner: KeyExchangeInner::Ecdh(Box::new(kp)),
            public_key_bytes,
        })
    }

    pub fn group(&self) -> NamedGroup {
        self.group
    }

    /// The `key_exchange` bytes of a KeyShareEntry.
    pub fn public_key_bytes(&self) -> &[u8] {
        &self.public_key_bytes
    }

    /// Shared secret with the peer's key share (the DHE input of the key schedule).
    pub fn compute_shared_secret(&self, peer_public: &[u8]) -> Result<Vec<u8>, TlsError> {
        let shared = match &self.inner {
            KeyExchangeInner::X25519(private_key) => {
                let peer_key = X25519PublicKey::new(peer_public)?;
                private_key.diffie_hellman(&peer_key)?
            }
            KeyExchangeInner::Ecdh(kp) => kp.compute_shared_secret(peer_public)?,
        };
        Ok(shared)
    }
}

impl std::fmt::Debug for KeyExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyExchange")
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agreement_all_supported_groups() {
        for (group, share_len, secret_len) in [
            (NamedGroup::X25519, 32, 32),
            (NamedGroup::SECP256R1, 65, 32),
            (NamedGroup::SECP384R1, 97, 48),
            (NamedGroup::SECP521R1, 133, 66),
        ] {
            let a = KeyExchange::generate(group).unwrap();
            let b = KeyExchange::generate(group).unwrap();
            assert_eq!(a.group(), group);
            assert_eq!(a.public_key_bytes().len(), share_len);
            assert_ne!(a.public_key_bytes(), b.public_key_bytes());

            let s1 = a.compute_shared_secret(b.public_key_bytes()).unwrap();
            let s2 = b.compute_shared_secret(a.public_key_bytes()).unwrap();
            assert_eq!(s1, s2);
            assert_eq!(s1.len(), secret_len);
        }
    }

    #[test]
    fn test_unsupported_groups() {
        for group in [NamedGroup::X448, NamedGroup::FFDHE2048, NamedGroup(0x1234)] {
            match KeyExchange::generate(group) {
                Err(TlsError::UnsupportedGroup(id)) => assert_eq!(id, group.0),
                other => panic!("expected UnsupportedGroup, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_bad_peer_share_is_crypto_error() {
        let x = KeyExchange::generate(NamedGroup::X25519).unwrap();
        assert!(matches!(
            x.compute_shared_secret(&[0u8; 31]),
            Err(TlsError::CryptoError(_))
        ));
        let p = KeyExchange::generate(NamedGroup::SECP256R1).unwrap();
        assert!(matches!(
            p.compute_shared_secret(&[0x04; 10]),
            Err(TlsError::CryptoError(_))
        ));
    }
}
