//! TLS 1.3 HKDF primitives (RFC 5869, RFC 8446 Section 7.1).
//!
//! HMAC is computed inline over the boxed [`Digest`] factory so that the
//! same code serves SHA-256 and SHA-384 suites without generics leaking into
//! the key schedule.

use tlskeys_crypto::provider::Digest;
use tlskeys_types::{CryptoError, TlsError};
use zeroize::Zeroize;

/// Borrowed form of [`HashFactory`](super::HashFactory).
pub type Factory = dyn Fn() -> Box<dyn Digest> + Send + Sync;

/// Every HkdfLabel label is prefixed with this string.
const LABEL_PREFIX: &[u8] = b"tls13 ";

/// HMAC key schedule: the key block XORed with ipad/opad, ready to absorb.
struct HmacKey {
    ipad_key: Vec<u8>,
    opad_key: Vec<u8>,
    output_size: usize,
}

impl HmacKey {
    /// Prepare the key block: hash if longer than block_size, else zero-pad.
    fn new(factory: &Factory, key: &[u8]) -> Result<Self, CryptoError> {
        let sample = factory();
        let block_size = sample.block_size();
        let output_size = sample.output_size();
        drop(sample);

        let mut key_block = vec![0u8; block_size];
        if key.len() > block_size {
            let mut hasher = factory();
            hasher.update(key)?;
            hasher.finish(&mut key_block[..output_size])?;
        } else {
            key_block[..key.len()].copy_from_slice(key);
        }
        let ipad_key = key_block.iter().map(|b| b ^ 0x36).collect();
        let opad_key = key_block.iter().map(|b| b ^ 0x5c).collect();
        key_block.zeroize();
        Ok(Self {
            ipad_key,
            opad_key,
            output_size,
        })
    }

    /// `H((K ^ opad) || H((K ^ ipad) || parts...))`
    fn mac(&self, factory: &Factory, parts: &[&[u8]]) -> Result<Vec<u8>, CryptoError> {
        let mut inner = factory();
        inner.update(&self.ipad_key)?;
        for part in parts {
            inner.update(part)?;
        }
        let mut inner_hash = vec![0u8; self.output_size];
        inner.finish(&mut inner_hash)?;

        let mut outer = factory();
        outer.update(&self.opad_key)?;
        outer.update(&inner_hash)?;
        let mut out = vec![0u8; self.output_size];
        outer.finish(&mut out)?;
        inner_hash.zeroize();
        Ok(out)
    }
}

impl Drop for HmacKey {
    fn drop(&mut self) {
        self.ipad_key.zeroize();
        self.opad_key.zeroize();
    }
}

/// One-shot HMAC: `HMAC(key, data)`.
pub fn hmac_hash(factory: &Factory, key: &[u8], data: &[u8]) -> Result<Vec<u8>, TlsError> {
    let key = HmacKey::new(factory, key)?;
    Ok(key.mac(factory, &[data])?)
}

/// HKDF-Extract(salt, IKM) -> PRK.
///
/// This is `HMAC-Hash(salt, IKM)`. An empty salt means `hash_len` zero bytes,
/// which HMAC's zero-padding already yields.
pub fn hkdf_extract(factory: &Factory, salt: &[u8], ikm: &[u8]) -> Result<Vec<u8>, TlsError> {
    hmac_hash(factory, salt, ikm)
}

/// HKDF-Expand(PRK, info, length) -> OKM.
///
/// Fails when `length` exceeds `255 * Hash.length`.
pub fn hkdf_expand(
    factory: &Factory,
    prk: &[u8],
    info: &[u8],
    length: usize,
) -> Result<Vec<u8>, TlsError> {
    let key = HmacKey::new(factory, prk)?;
    let n = length.div_ceil(key.output_size);
    if n > 255 {
        return Err(CryptoError::KdfDkLenOverflow.into());
    }

    let mut okm = Vec::with_capacity(n * key.output_size);
    let mut t_prev: Vec<u8> = Vec::new();
    for i in 1..=n {
        // T(i) = HMAC(PRK, T(i-1) || info || i)
        let counter = [i as u8];
        let t = key.mac(factory, &[t_prev.as_slice(), info, counter.as_slice()])?;
        okm.extend_from_slice(&t);
        t_prev.zeroize();
        t_prev = t;
    }
    t_prev.zeroize();
    okm.truncate(length);
    Ok(okm)
}

/// Encode the HkdfLabel structure per RFC 8446 Section 7.1:
///
/// ```text
/// struct {
///     uint16 length;
///     opaque label<7..255>;   // "tls13 " + label
///     opaque context<0..255>;
/// } HkdfLabel;
/// ```
fn encode_hkdf_label(length: usize, label: &[u8], context: &[u8]) -> Result<Vec<u8>, TlsError> {
    let full_label_len = LABEL_PREFIX.len() + label.len();
    let length = u16::try_from(length).map_err(|_| CryptoError::KdfDkLenOverflow)?;
    if full_label_len > 255 || context.len() > 255 {
        return Err(CryptoError::KdfLabelTooLong.into());
    }
    let mut buf = Vec::with_capacity(2 + 1 + full_label_len + 1 + context.len());
    buf.extend_from_slice(&length.to_be_bytes());
    buf.push(full_label_len as u8);
    buf.extend_from_slice(LABEL_PREFIX);
    buf.extend_from_slice(label);
    buf.push(context.len() as u8);
    buf.extend_from_slice(context);
    Ok(buf)
}

/// HKDF-Expand-Label(Secret, Label, Context, Length).
///
/// `= HKDF-Expand(Secret, HkdfLabel, Length)`
pub fn hkdf_expand_label(
    factory: &Factory,
    secret: &[u8],
    label: &[u8],
    context: &[u8],
    length: usize,
) -> Result<Vec<u8>, TlsError> {
    let hkdf_label = encode_hkdf_label(length, label, context)?;
    hkdf_expand(factory, secret, &hkdf_label, length)
}

/// Derive-Secret(Secret, Label, TranscriptHash).
///
/// `= HKDF-Expand-Label(Secret, Label, TranscriptHash, Hash.length)`
///
/// `transcript_hash` is the already-computed digest of the messages and
/// must be exactly `Hash.length` bytes.
pub fn derive_secret(
    factory: &Factory,
    secret: &[u8],
    label: &[u8],
    transcript_hash: &[u8],
) -> Result<Vec<u8>, TlsError> {
    let hash_len = factory().output_size();
    if transcript_hash.len() != hash_len {
        return Err(TlsError::HandshakeFailed(format!(
            "transcript hash is {} bytes, expected {hash_len}",
            transcript_hash.len()
        )));
    }
    hkdf_expand_label(factory, secret, label, transcript_hash, hash_len)
}

/// `Hash("")` for the given factory.
pub fn empty_hash(factory: &Factory) -> Result<Vec<u8>, TlsError> {
    let mut hasher = factory();
    let mut out = vec![0u8; hasher.output_size()];
    hasher.finish(&mut out)?;
    Ok(out)
}
