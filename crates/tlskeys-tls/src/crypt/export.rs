//! Keying material exporter (RFC 8446 §7.5).

use super::hkdf::{derive_secret, empty_hash, hkdf_expand_label};
use super::HashFactory;
use tlskeys_types::TlsError;
use zeroize::Zeroize;

/// Labels reserved by RFC 5705 §4 for the PRF-based key schedule.
const RESERVED_LABELS: &[&[u8]] = &[
    b"client finished",
    b"server finished",
    b"master secret",
    b"extended master secret",
    b"key expansion",
];

/// Reject labels that collide with the handshake's own PRF labels.
pub fn validate_exporter_label(label: &[u8]) -> Result<(), TlsError> {
    if RESERVED_LABELS.contains(&label) {
        return Err(TlsError::HandshakeFailed(format!(
            "reserved label for key export: {}",
            String::from_utf8_lossy(label)
        )));
    }
    Ok(())
}

/// Exports keying material from a fixed exporter master secret.
///
/// Every call to [`export`](Self::export) is independent: the exporter
/// holds no state besides the secret, so it can be shared across threads
/// and queried any number of times.
pub struct KeyingMaterialExporter {
    factory: HashFactory,
    exporter_master_secret: Vec<u8>,
}

impl KeyingMaterialExporter {
    pub(crate) fn new(factory: HashFactory, exporter_master_secret: Vec<u8>) -> Self {
        Self {
            factory,
            exporter_master_secret,
        }
    }

    /// ```text
    /// tmp = Derive-Secret(exporter_master_secret, label, "")
    /// out = HKDF-Expand-Label(tmp, "exporter", Hash(context), length)
    /// ```
    ///
    /// An absent context hashes the same as an empty one.
    pub fn export(
        &self,
        label: &[u8],
        context: Option<&[u8]>,
        length: usize,
    ) -> Result<Vec<u8>, TlsError> {
        validate_exporter_label(label)?;
        let factory = &*self.factory;

        let mut tmp = derive_secret(
            factory,
            &self.exporter_master_secret,
            label,
            &empty_hash(factory)?,
        )?;

        let mut hasher = factory();
        hasher.update(context.unwrap_or_default())?;
        let mut ctx_hash = vec![0u8; hasher.output_size()];
        hasher.finish(&mut ctx_hash)?;

        let out = hkdf_expand_label(factory, &tmp, b"exporter", &ctx_hash, length);
        tmp.zeroize();
        out
    }
}

impl Drop for KeyingMaterialExporter {
    fn drop(&mut self) {
        self.exporter_master_secret.zeroize();
    }
}
