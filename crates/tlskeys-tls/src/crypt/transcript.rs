//! Running transcript hash over handshake messages.

use super::{CipherSuiteParams, HashFactory};
use tlskeys_crypto::provider::Digest;
use tlskeys_types::TlsError;

/// `HandshakeType.message_hash` (RFC 8446 §4.4.1).
const MESSAGE_HASH_TYPE: u8 = 254;

/// Transcript hash with snapshot support.
///
/// Handshake messages are buffered and replayed into a fresh digest on every
/// [`current_hash`](Self::current_hash), since the key schedule needs
/// intermediate values at several points of the same transcript.
pub struct TranscriptHash {
    factory: HashFactory,
    messages: Vec<u8>,
    hash_len: usize,
}

impl TranscriptHash {
    pub fn new(factory: impl Fn() -> Box<dyn Digest> + Send + Sync + 'static) -> Self {
        let hash_len = factory().output_size();
        Self {
            factory: Box::new(factory),
            messages: Vec::new(),
            hash_len,
        }
    }

    /// Transcript using the hash of the negotiated cipher suite.
    pub fn for_suite(params: &CipherSuiteParams) -> Self {
        Self {
            factory: params.hash_factory(),
            messages: Vec::new(),
            hash_len: params.hash_len,
        }
    }

    /// Append an encoded handshake message.
    pub fn update(&mut self, message: &[u8]) {
        self.messages.extend_from_slice(message);
    }

    /// Hash of every message appended so far.
    pub fn current_hash(&self) -> Result<Vec<u8>, TlsError> {
        let mut hasher = (self.factory)();
        hasher.update(&self.messages)?;
        let mut out = vec![0u8; self.hash_len];
        hasher.finish(&mut out)?;
        Ok(out)
    }

    pub fn hash_len(&self) -> usize {
        self.hash_len
    }

    /// Collapse the transcript into a synthetic `message_hash` message.
    ///
    /// Applied after a HelloRetryRequest: `ClientHello1` is replaced by
    /// `message_hash || 00 00 Hash.length || Hash(ClientHello1)`.
    pub fn replace_with_message_hash(&mut self) -> Result<(), TlsError> {
        let hash = self.current_hash()?;
        self.messages.clear();
        self.messages
            .extend_from_slice(&[MESSAGE_HASH_TYPE, 0, 0, hash.len() as u8]);
        self.messages.extend_from_slice(&hash);
        Ok(())
    }
}
