//! Session records and the resumption metadata stored with them.

pub mod extra;

use crate::{CipherSuite, TlsVersion};
use tlskeys_types::TlsError;
use zeroize::Zeroize;

pub use extra::{
    decode_session_extra, encode_extra_fields, encode_session_extra, ExtraDecode, ExtraField,
    ExtraFieldId, ExtraFieldRef, ExtraFields, SessionRecord, SessionResumptionData,
    SESSION_EXTRA_VERSION,
};

/// Resumption path that produced a session.
///
/// Unknown on-wire values are kept as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ResumeMechanism(pub u8);

impl ResumeMechanism {
    pub const UNKNOWN: Self = Self(0);
    pub const SESSION_ID: Self = Self(1);
    pub const SESSION_TICKET: Self = Self(2);

    /// Mechanism to record once a full handshake completes.
    ///
    /// A received ticket always wins. Session-id resumption only exists up to
    /// TLS 1.2 and needs a non-empty id from the server.
    pub fn select(version: TlsVersion, server_session_id: &[u8], ticket: Option<&[u8]>) -> Self {
        if ticket.is_some() {
            Self::SESSION_TICKET
        } else if version <= TlsVersion::Tls12 && !server_session_id.is_empty() {
            Self::SESSION_ID
        } else {
            Self::UNKNOWN
        }
    }
}

/// A TLS session that can be used for resumption.
#[derive(Debug, Clone)]
pub struct TlsSession {
    /// Session identifier assigned by the server.
    pub id: Vec<u8>,
    /// Negotiated protocol version.
    pub version: TlsVersion,
    pub cipher_suite: CipherSuite,
    /// Master secret (TLS 1.2) or resumption master secret (TLS 1.3).
    pub master_secret: Vec<u8>,
    pub alpn_protocol: Option<Vec<u8>>,
    /// Session ticket, if the server issued one.
    pub ticket: Option<Vec<u8>>,
    /// Ticket lifetime in seconds.
    pub ticket_lifetime: u32,
    pub ticket_age_add: u32,
    pub ticket_nonce: Vec<u8>,
    /// Seconds since UNIX epoch.
    pub created_at: u64,
    /// Pre-shared key derived from the resumption master secret and nonce.
    pub psk: Vec<u8>,
    /// Whether the Extended Master Secret extension (RFC 7627) was used.
    pub extended_master_secret: bool,
    pub resume_type: ResumeMechanism,
    /// Opaque extra slots; see [`SessionRecord`].
    pub extra: Vec<Vec<u8>>,
}

impl Drop for TlsSession {
    fn drop(&mut self) {
        self.master_secret.zeroize();
        self.psk.zeroize();
    }
}

impl TlsSession {
    pub fn new(version: TlsVersion, cipher_suite: CipherSuite, master_secret: Vec<u8>) -> Self {
        Self {
            id: Vec::new(),
            version,
            cipher_suite,
            master_secret,
            alpn_protocol: None,
            ticket: None,
            ticket_lifetime: 0,
            ticket_age_add: 0,
            ticket_nonce: Vec::new(),
            created_at: 0,
            psk: Vec::new(),
            extended_master_secret: false,
            resume_type: ResumeMechanism::UNKNOWN,
            extra: Vec::new(),
        }
    }

    /// Set `resume_type` from the completed handshake's id and ticket.
    pub fn select_resume_type(&mut self) {
        self.resume_type =
            ResumeMechanism::select(self.version, &self.id, self.ticket.as_deref());
    }

    pub fn resumption_data(&self) -> SessionResumptionData {
        SessionResumptionData {
            resume_type: self.resume_type,
            session_id: self.id.clone(),
        }
    }
}

impl SessionRecord for TlsSession {
    fn extra(&self) -> &[Vec<u8>] {
        &self.extra
    }

    fn extra_mut(&mut self) -> &mut Vec<Vec<u8>> {
        &mut self.extra
    }
}

/// Encode the resumable part of a session.
///
/// ```text
/// cipher_suite(2) || ms_len(2) || master_secret || created_at(8) || lifetime(4)
/// || ems(1) || version(2) || slot_count(2) || (slot_len(2) || slot)*
/// ```
///
/// The resumption metadata is written into the extra slots, replacing any
/// stale codec slot; foreign slots are carried over verbatim.
pub fn encode_session_state(session: &TlsSession) -> Result<Vec<u8>, TlsError> {
    let mut extra = session.extra.clone();
    extra.set_session_extra(&session.resumption_data())?;

    let ms_len = u16::try_from(session.master_secret.len())
        .map_err(|_| TlsError::SessionState("master secret too long".into()))?;
    let slot_count = u16::try_from(extra.len())
        .map_err(|_| TlsError::SessionState("too many extra slots".into()))?;

    let mut data = Vec::with_capacity(
        2 + 2 + session.master_secret.len() + 8 + 4 + 1 + 2 + 2
            + extra.iter().map(|s| 2 + s.len()).sum::<usize>(),
    );
    data.extend_from_slice(&session.cipher_suite.0.to_be_bytes());
    data.extend_from_slice(&ms_len.to_be_bytes());
    data.extend_from_slice(&session.master_secret);
    data.extend_from_slice(&session.created_at.to_be_bytes());
    data.extend_from_slice(&session.ticket_lifetime.to_be_bytes());
    data.push(u8::from(session.extended_master_secret));
    data.extend_from_slice(&session.version.wire_value().to_be_bytes());
    data.extend_from_slice(&slot_count.to_be_bytes());
    for slot in &extra {
        let slot_len = u16::try_from(slot.len())
            .map_err(|_| TlsError::SessionState("extra slot too long".into()))?;
        data.extend_from_slice(&slot_len.to_be_bytes());
        data.extend_from_slice(slot);
    }
    Ok(data)
}

fn take<'a>(data: &mut &'a [u8], n: usize, what: &str) -> Result<&'a [u8], TlsError> {
    if data.len() < n {
        return Err(TlsError::SessionState(format!("truncated {what}")));
    }
    let (head, tail) = data.split_at(n);
    *data = tail;
    Ok(head)
}

fn take_u16(data: &mut &[u8], what: &str) -> Result<u16, TlsError> {
    let b = take(data, 2, what)?;
    Ok(u16::from_be_bytes([b[0], b[1]]))
}

/// Decode a session written by [`encode_session_state`].
///
/// Everything after the lifetime is optional, so records written before the
/// EMS flag, the version or the extra slots were added still load (as TLS 1.3
/// sessions without resumption metadata). A malformed codec slot leaves the
/// metadata unset rather than failing the load.
pub fn decode_session_state(data: &[u8]) -> Result<TlsSession, TlsError> {
    let mut rest = data;
    let cipher_suite = CipherSuite(take_u16(&mut rest, "cipher suite")?);
    let ms_len = take_u16(&mut rest, "master secret length")? as usize;
    let master_secret = take(&mut rest, ms_len, "master secret")?.to_vec();
    let mut session = TlsSession::new(TlsVersion::Tls13, cipher_suite, master_secret);

    let created_at = take(&mut rest, 8, "creation time")?;
    session.created_at = u64::from_be_bytes([
        created_at[0],
        created_at[1],
        created_at[2],
        created_at[3],
        created_at[4],
        created_at[5],
        created_at[6],
        created_at[7],
    ]);
    let lifetime = take(&mut rest, 4, "ticket lifetime")?;
    session.ticket_lifetime = u32::from_be_bytes([lifetime[0], lifetime[1], lifetime[2], lifetime[3]]);

    if rest.is_empty() {
        return Ok(session);
    }
    session.extended_master_secret = take(&mut rest, 1, "ems flag")?[0] != 0;

    if rest.is_empty() {
        return Ok(session);
    }
    let wire_version = take_u16(&mut rest, "version")?;
    session.version = TlsVersion::from_wire(wire_version).ok_or_else(|| {
        TlsError::SessionState(format!("unknown protocol version 0x{wire_version:04x}"))
    })?;
    let slot_count = take_u16(&mut rest, "extra slot count")?;
    for _ in 0..slot_count {
        let slot_len = take_u16(&mut rest, "extra slot length")? as usize;
        session
            .extra
            .push(take(&mut rest, slot_len, "extra slot")?.to_vec());
    }

    if let Some(resumption) = session.session_extra() {
        session.resume_type = resumption.resume_type;
        session.id = resumption.session_id;
    }
    Ok(session)
}
