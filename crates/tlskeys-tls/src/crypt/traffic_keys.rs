//! AEAD key and IV material derived from a traffic secret.

use super::hkdf::{hkdf_expand_label, Factory};
use super::CipherSuiteParams;
use tlskeys_types::TlsError;
use zeroize::Zeroize;

/// Write key and static IV for one direction of a record protection layer.
pub struct TrafficKeys {
    /// AEAD key, `key_len` bytes.
    pub key: Vec<u8>,
    /// Static per-record nonce base, 12 bytes.
    pub iv: Vec<u8>,
}

impl Drop for TrafficKeys {
    fn drop(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
    }
}

impl std::fmt::Debug for TrafficKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrafficKeys")
            .field("key_len", &self.key.len())
            .field("iv_len", &self.iv.len())
            .finish()
    }
}

impl TrafficKeys {
    /// ```text
    /// key = HKDF-Expand-Label(secret, "key", "", key_length)
    /// iv  = HKDF-Expand-Label(secret, "iv", "", iv_length)
    /// ```
    pub fn derive(params: &CipherSuiteParams, traffic_secret: &[u8]) -> Result<Self, TlsError> {
        let factory = params.hash_factory();
        Self::derive_with(&*factory, params, traffic_secret)
    }

    pub(crate) fn derive_with(
        factory: &Factory,
        params: &CipherSuiteParams,
        traffic_secret: &[u8],
    ) -> Result<Self, TlsError> {
        let key = hkdf_expand_label(factory, traffic_secret, b"key", b"", params.key_len)?;
        let iv = hkdf_expand_label(factory, traffic_secret, b"iv", b"", params.iv_len)?;
        Ok(TrafficKeys { key, iv })
    }
}
