//! TLS 1.3 Key Schedule (RFC 8446 Section 7.1).
//!
//! The secret chain runs Early Secret → Handshake Secret → Master Secret,
//! with each stage feeding the traffic, exporter and resumption secrets
//! derived from it. [`KeySchedule`] tracks the chain as a small state machine;
//! the per-record derivations (traffic key/IV, key update, Finished, exporter)
//! are stateless and only depend on their inputs.

use super::export::KeyingMaterialExporter;
use super::hkdf::{derive_secret, empty_hash, hkdf_expand_label, hkdf_extract, hmac_hash};
use super::traffic_keys::TrafficKeys;
use super::{CipherSuiteParams, HashFactory};
use subtle::ConstantTimeEq;
use tlskeys_types::TlsError;
use zeroize::Zeroize;

/// Current stage of the TLS 1.3 key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScheduleStage {
    Initial,
    EarlySecret,
    HandshakeSecret,
    MasterSecret,
}

/// Per-handshake key schedule bound to one cipher suite.
///
/// Holds the current stage secret, wiped on drop.
pub struct KeySchedule {
    params: CipherSuiteParams,
    hash_factory: HashFactory,
    stage: KeyScheduleStage,
    current_secret: Vec<u8>,
}

impl Drop for KeySchedule {
    fn drop(&mut self) {
        self.current_secret.zeroize();
    }
}

impl KeySchedule {
    pub fn new(params: CipherSuiteParams) -> Self {
        let hash_factory = params.hash_factory();
        Self {
            params,
            hash_factory,
            stage: KeyScheduleStage::Initial,
            current_secret: Vec::new(),
        }
    }

    pub fn stage(&self) -> KeyScheduleStage {
        self.stage
    }

    pub fn params(&self) -> &CipherSuiteParams {
        &self.params
    }

    /// Hash length for this cipher suite.
    pub fn hash_len(&self) -> usize {
        self.params.hash_len
    }

    fn require_stage(&self, expected: KeyScheduleStage, op: &str) -> Result<(), TlsError> {
        if self.stage != expected {
            return Err(TlsError::HandshakeFailed(format!(
                "{op}: wrong stage {:?}, expected {:?}",
                self.stage, expected
            )));
        }
        Ok(())
    }

    /// `Derive-Secret(current, label, transcript_hash)`
    fn derive_from_current(&self, label: &[u8], transcript_hash: &[u8]) -> Result<Vec<u8>, TlsError> {
        derive_secret(&*self.hash_factory, &self.current_secret, label, transcript_hash)
    }

    /// Replace the current secret with `HKDF-Extract(Derive-Secret(cur, "derived", ""), ikm)`.
    fn advance(&mut self, ikm: &[u8], next: KeyScheduleStage) -> Result<(), TlsError> {
        let empty = empty_hash(&*self.hash_factory)?;
        let mut salt = self.derive_from_current(b"derived", &empty)?;
        let extracted = hkdf_extract(&*self.hash_factory, &salt, ikm);
        salt.zeroize();
        self.current_secret.zeroize();
        self.current_secret = extracted?;
        self.stage = next;
        Ok(())
    }

    /// Derive the Early Secret from a PSK, or from zeros when there is none.
    ///
    /// Transitions: Initial → EarlySecret.
    pub fn derive_early_secret(&mut self, psk: Option<&[u8]>) -> Result<(), TlsError> {
        self.require_stage(KeyScheduleStage::Initial, "derive_early_secret")?;
        let zero_psk = vec![0u8; self.params.hash_len];
        self.current_secret = hkdf_extract(&*self.hash_factory, &[], psk.unwrap_or(&zero_psk))?;
        self.stage = KeyScheduleStage::EarlySecret;
        Ok(())
    }

    /// Mix in the (EC)DHE shared secret.
    ///
    /// Transitions: EarlySecret → HandshakeSecret.
    pub fn derive_handshake_secret(&mut self, dhe_shared_secret: &[u8]) -> Result<(), TlsError> {
        self.require_stage(KeyScheduleStage::EarlySecret, "derive_handshake_secret")?;
        self.advance(dhe_shared_secret, KeyScheduleStage::HandshakeSecret)
    }

    /// Transitions: HandshakeSecret → MasterSecret.
    pub fn derive_master_secret(&mut self) -> Result<(), TlsError> {
        self.require_stage(KeyScheduleStage::HandshakeSecret, "derive_master_secret")?;
        let zero_ikm = vec![0u8; self.params.hash_len];
        self.advance(&zero_ikm, KeyScheduleStage::MasterSecret)
    }

    /// Client early traffic secret for 0-RTT data.
    ///
    /// `transcript_hash` = Hash(ClientHello).
    pub fn derive_early_traffic_secret(&self, transcript_hash: &[u8]) -> Result<Vec<u8>, TlsError> {
        self.require_stage(KeyScheduleStage::EarlySecret, "derive_early_traffic_secret")?;
        self.derive_from_current(b"c e traffic", transcript_hash)
    }

    /// `transcript_hash` = Hash(ClientHello).
    pub fn derive_early_exporter_master_secret(
        &self,
        transcript_hash: &[u8],
    ) -> Result<Vec<u8>, TlsError> {
        self.require_stage(
            KeyScheduleStage::EarlySecret,
            "derive_early_exporter_master_secret",
        )?;
        self.derive_from_current(b"e exp master", transcript_hash)
    }

    /// PSK binder key: "ext binder" for external PSKs, "res binder" for
    /// resumption PSKs.
    pub fn derive_binder_key(&self, external: bool) -> Result<Vec<u8>, TlsError> {
        self.require_stage(KeyScheduleStage::EarlySecret, "derive_binder_key")?;
        let label: &[u8] = if external { b"ext binder" } else { b"res binder" };
        let empty = empty_hash(&*self.hash_factory)?;
        self.derive_from_current(label, &empty)
    }

    /// `transcript_hash` = Hash(ClientHello..ServerHello).
    ///
    /// Returns `(client_hs_traffic_secret, server_hs_traffic_secret)`.
    pub fn derive_handshake_traffic_secrets(
        &self,
        transcript_hash: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>), TlsError> {
        self.require_stage(
            KeyScheduleStage::HandshakeSecret,
            "derive_handshake_traffic_secrets",
        )?;
        let client = self.derive_from_current(b"c hs traffic", transcript_hash)?;
        let server = self.derive_from_current(b"s hs traffic", transcript_hash)?;
        Ok((client, server))
    }

    /// `transcript_hash` = Hash(ClientHello..server Finished).
    ///
    /// Returns `(client_app_traffic_secret, server_app_traffic_secret)`.
    pub fn derive_app_traffic_secrets(
        &self,
        transcript_hash: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>), TlsError> {
        self.require_stage(KeyScheduleStage::MasterSecret, "derive_app_traffic_secrets")?;
        let client = self.derive_from_current(b"c ap traffic", transcript_hash)?;
        let server = self.derive_from_current(b"s ap traffic", transcript_hash)?;
        Ok((client, server))
    }

    /// `transcript_hash` = Hash(ClientHello..server Finished).
    pub fn derive_exporter_master_secret(
        &self,
        transcript_hash: &[u8],
    ) -> Result<Vec<u8>, TlsError> {
        self.require_stage(KeyScheduleStage::MasterSecret, "derive_exporter_master_secret")?;
        self.derive_from_current(b"exp master", transcript_hash)
    }

    /// `transcript_hash` = Hash(ClientHello..client Finished).
    pub fn derive_resumption_master_secret(
        &self,
        transcript_hash: &[u8],
    ) -> Result<Vec<u8>, TlsError> {
        self.require_stage(
            KeyScheduleStage::MasterSecret,
            "derive_resumption_master_secret",
        )?;
        self.derive_from_current(b"res master", transcript_hash)
    }

    /// Exporter over the master secret held by this schedule.
    ///
    /// `transcript_hash` = Hash(ClientHello..server Finished).
    pub fn exporter(&self, transcript_hash: &[u8]) -> Result<KeyingMaterialExporter, TlsError> {
        self.require_stage(KeyScheduleStage::MasterSecret, "exporter")?;
        self.exporter_provider(&self.current_secret, transcript_hash)
    }

    // Stateless derivations below: they never read `current_secret`.

    /// `resumption_psk = HKDF-Expand-Label(rms, "resumption", nonce, Hash.length)`
    pub fn derive_resumption_psk(&self, rms: &[u8], nonce: &[u8]) -> Result<Vec<u8>, TlsError> {
        hkdf_expand_label(
            &*self.hash_factory,
            rms,
            b"resumption",
            nonce,
            self.params.hash_len,
        )
    }

    /// Next-generation traffic secret for a KeyUpdate.
    ///
    /// `HKDF-Expand-Label(secret, "traffic upd", "", Hash.length)`
    pub fn next_traffic_secret(&self, secret: &[u8]) -> Result<Vec<u8>, TlsError> {
        hkdf_expand_label(
            &*self.hash_factory,
            secret,
            b"traffic upd",
            b"",
            self.params.hash_len,
        )
    }

    /// AEAD write key and IV for a traffic secret.
    pub fn traffic_key_and_iv(&self, secret: &[u8]) -> Result<TrafficKeys, TlsError> {
        TrafficKeys::derive_with(&*self.hash_factory, &self.params, secret)
    }

    /// Finished `verify_data` for the side owning `base_key`.
    ///
    /// ```text
    /// finished_key = HKDF-Expand-Label(base_key, "finished", "", Hash.length)
    /// verify_data  = HMAC(finished_key, transcript_hash)
    /// ```
    pub fn finished_verify_data(
        &self,
        base_key: &[u8],
        transcript_hash: &[u8],
    ) -> Result<Vec<u8>, TlsError> {
        let mut finished_key = hkdf_expand_label(
            &*self.hash_factory,
            base_key,
            b"finished",
            b"",
            self.params.hash_len,
        )?;
        let verify_data = hmac_hash(&*self.hash_factory, &finished_key, transcript_hash);
        finished_key.zeroize();
        verify_data
    }

    /// Check a peer's Finished `verify_data` in constant time.
    pub fn verify_finished(
        &self,
        base_key: &[u8],
        transcript_hash: &[u8],
        received: &[u8],
    ) -> Result<bool, TlsError> {
        let expected = self.finished_verify_data(base_key, transcript_hash)?;
        Ok(bool::from(expected.as_slice().ct_eq(received)))
    }

    /// Exporter for a master secret negotiated elsewhere.
    ///
    /// Derives `exporter_master_secret = Derive-Secret(master_secret, "exp master", transcript_hash)`
    /// once; the returned exporter can then be queried repeatedly.
    /// `transcript_hash` must be `Hash.length` bytes.
    pub fn exporter_provider(
        &self,
        master_secret: &[u8],
        transcript_hash: &[u8],
    ) -> Result<KeyingMaterialExporter, TlsError> {
        let exporter_master_secret = derive_secret(
            &*self.hash_factory,
            master_secret,
            b"exp master",
            transcript_hash,
        )?;
        Ok(KeyingMaterialExporter::new(
            self.params.hash_factory(),
            exporter_master_secret,
        ))
    }
}
