//! Versioned resumption metadata stored in a session record's extra slots.
//!
//! A session record carries an ordered list of opaque byte slots. Slots whose
//! first byte is [`SESSION_EXTRA_VERSION`] belong to this codec; every other
//! slot is foreign and is preserved untouched, in order.
//!
//! Wire layout (all integers big-endian):
//!
//! ```text
//! container:  version(1) || field_count(2) || field*
//! field:      id(2) || field_version(1) || data_len(2) || data
//! field 0x7001 data (SessionResumptionData):
//!             resume_type(1) || session_id_len(2) || session_id
//! ```
//!
//! Containers with another version byte, and fields with unknown ids or
//! versions, are skipped rather than rejected so that records written by
//! newer builds remain readable.

use tlskeys_types::SessionExtraError;
use tracing::debug;

use super::ResumeMechanism;

/// Container and field format version understood by this build.
pub const SESSION_EXTRA_VERSION: u8 = 0x01;

const CONTAINER_HEADER_LEN: usize = 3;
const FIELD_HEADER_LEN: usize = 5;

/// Identifier of a field inside an extra container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtraFieldId(pub u16);

impl ExtraFieldId {
    /// Payload is a [`SessionResumptionData`].
    pub const SESSION_RESUMPTION: Self = Self(0x7001);
}

/// How a session was established for resumption, and the server-assigned
/// session id when that is the mechanism.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionResumptionData {
    pub resume_type: ResumeMechanism,
    pub session_id: Vec<u8>,
}

impl SessionResumptionData {
    /// Empty values carry no information and are never written.
    pub fn is_empty(&self) -> bool {
        self.resume_type == ResumeMechanism::UNKNOWN && self.session_id.is_empty()
    }

    /// `resume_type(1) || session_id_len(2) || session_id`, or `None` when empty.
    pub fn encode(&self) -> Result<Option<Vec<u8>>, SessionExtraError> {
        if self.is_empty() {
            return Ok(None);
        }
        let id_len = u16::try_from(self.session_id.len())
            .map_err(|_| SessionExtraError::FieldTooLong)?;
        let mut out = Vec::with_capacity(3 + self.session_id.len());
        out.push(self.resume_type.0);
        out.extend_from_slice(&id_len.to_be_bytes());
        out.extend_from_slice(&self.session_id);
        Ok(Some(out))
    }

    /// Parse a field payload. The session id is copied out of `data`.
    pub fn decode(data: &[u8]) -> Result<Self, SessionExtraError> {
        if data.len() < 3 {
            return Err(SessionExtraError::TooShort);
        }
        let id_len = u16::from_be_bytes([data[1], data[2]]) as usize;
        let session_id = data
            .get(3..3 + id_len)
            .ok_or(SessionExtraError::SessionIdIncomplete)?;
        Ok(Self {
            resume_type: ResumeMechanism(data[0]),
            session_id: session_id.to_vec(),
        })
    }
}

/// An owned container field, for encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraField {
    pub id: ExtraFieldId,
    pub version: u8,
    pub data: Vec<u8>,
}

/// A field borrowed from a container being decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtraFieldRef<'a> {
    pub id: ExtraFieldId,
    pub version: u8,
    pub data: &'a [u8],
}

impl ExtraFieldRef<'_> {
    pub fn to_field(&self) -> ExtraField {
        ExtraField {
            id: self.id,
            version: self.version,
            data: self.data.to_vec(),
        }
    }
}

/// Encode a container holding `fields` in order.
pub fn encode_extra_fields(fields: &[ExtraField]) -> Result<Vec<u8>, SessionExtraError> {
    let count = u16::try_from(fields.len()).map_err(|_| SessionExtraError::TooManyFields)?;
    let body_len: usize = fields.iter().map(|f| FIELD_HEADER_LEN + f.data.len()).sum();
    let mut out = Vec::with_capacity(CONTAINER_HEADER_LEN + body_len);
    out.push(SESSION_EXTRA_VERSION);
    out.extend_from_slice(&count.to_be_bytes());
    for field in fields {
        let data_len =
            u16::try_from(field.data.len()).map_err(|_| SessionExtraError::FieldTooLong)?;
        out.extend_from_slice(&field.id.0.to_be_bytes());
        out.push(field.version);
        out.extend_from_slice(&data_len.to_be_bytes());
        out.extend_from_slice(&field.data);
    }
    Ok(out)
}

/// Encode `data` as a single-field container, or `None` when it is empty.
///
/// The payload (`3 + id_len` bytes) must fit the field's u16 length, so
/// session ids longer than 65532 bytes fail with `FieldTooLong` here even
/// though [`SessionResumptionData::encode`] accepts up to 65535.
pub fn encode_session_extra(
    data: &SessionResumptionData,
) -> Result<Option<Vec<u8>>, SessionExtraError> {
    let Some(payload) = data.encode()? else {
        return Ok(None);
    };
    let field = ExtraField {
        id: ExtraFieldId::SESSION_RESUMPTION,
        version: SESSION_EXTRA_VERSION,
        data: payload,
    };
    encode_extra_fields(std::slice::from_ref(&field)).map(Some)
}

/// Lazy walk over the fields of a container.
///
/// Yields each field in order, or the first structural error and then
/// nothing.
#[derive(Debug, Clone)]
pub struct ExtraFields<'a> {
    rest: &'a [u8],
    index: u16,
    count: u16,
    done: bool,
}

impl<'a> ExtraFields<'a> {
    /// `Ok(None)` for a container this build does not understand (empty, or a
    /// different version byte).
    ///
    /// The version byte is classified before the header length, so a short
    /// foreign input such as `[0x02]` is unrecognized rather than too short.
    pub fn parse(container: &'a [u8]) -> Result<Option<Self>, SessionExtraError> {
        match container.first() {
            Some(&SESSION_EXTRA_VERSION) => {}
            _ => return Ok(None),
        }
        if container.len() < CONTAINER_HEADER_LEN {
            return Err(SessionExtraError::FieldCountTruncated);
        }
        let count = u16::from_be_bytes([container[1], container[2]]);
        Ok(Some(Self {
            rest: &container[CONTAINER_HEADER_LEN..],
            index: 0,
            count,
            done: false,
        }))
    }

    /// Declared number of fields.
    pub fn declared_count(&self) -> u16 {
        self.count
    }
}

impl<'a> Iterator for ExtraFields<'a> {
    type Item = Result<ExtraFieldRef<'a>, SessionExtraError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.index >= self.count {
            return None;
        }
        let index = self.index;
        self.index += 1;

        if self.rest.len() < FIELD_HEADER_LEN {
            self.done = true;
            return Some(Err(SessionExtraError::FieldHeaderIncomplete { index }));
        }
        let (header, body) = self.rest.split_at(FIELD_HEADER_LEN);
        let data_len = u16::from_be_bytes([header[3], header[4]]) as usize;
        if body.len() < data_len {
            self.done = true;
            return Some(Err(SessionExtraError::FieldDataIncomplete { index }));
        }
        let (data, rest) = body.split_at(data_len);
        self.rest = rest;
        Some(Ok(ExtraFieldRef {
            id: ExtraFieldId(u16::from_be_bytes([header[0], header[1]])),
            version: header[2],
            data,
        }))
    }
}

/// Outcome of decoding one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtraDecode<T> {
    /// A field this build understands was found and decoded.
    Recognized(T),
    /// Nothing this build understands: empty input, another container
    /// version, or no matching field. Not an error.
    Unrecognized,
    /// Truncated or inconsistent input.
    Malformed(SessionExtraError),
}

impl<T> ExtraDecode<T> {
    pub fn into_result(self) -> Result<Option<T>, SessionExtraError> {
        match self {
            ExtraDecode::Recognized(v) => Ok(Some(v)),
            ExtraDecode::Unrecognized => Ok(None),
            ExtraDecode::Malformed(e) => Err(e),
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, ExtraDecode::Recognized(_))
    }
}

/// Find and decode the first resumption field of a container.
///
/// Fields before it are checked for structural integrity only; fields after
/// it are not looked at.
pub fn decode_session_extra(container: &[u8]) -> ExtraDecode<SessionResumptionData> {
    let fields = match ExtraFields::parse(container) {
        Ok(Some(fields)) => fields,
        Ok(None) => return ExtraDecode::Unrecognized,
        Err(e) => return ExtraDecode::Malformed(e),
    };
    for field in fields {
        let field = match field {
            Ok(field) => field,
            Err(e) => return ExtraDecode::Malformed(e),
        };
        if field.id == ExtraFieldId::SESSION_RESUMPTION && field.version == SESSION_EXTRA_VERSION
        {
            return match SessionResumptionData::decode(field.data) {
                Ok(v) => ExtraDecode::Recognized(v),
                Err(e) => ExtraDecode::Malformed(e),
            };
        }
    }
    ExtraDecode::Unrecognized
}

fn is_codec_owned(slot: &[u8]) -> bool {
    slot.first() == Some(&SESSION_EXTRA_VERSION)
}

/// A session record with opaque extra slots.
///
/// Implementors only expose the slot list; the provided methods never read
/// or modify foreign slots.
pub trait SessionRecord {
    fn extra(&self) -> &[Vec<u8>];

    fn extra_mut(&mut self) -> &mut Vec<Vec<u8>>;

    /// Whether any slot is owned by this codec. Does not parse.
    fn has_session_extra(&self) -> bool {
        self.extra().iter().any(|slot| is_codec_owned(slot))
    }

    /// Resumption metadata from the first codec slot that decodes.
    ///
    /// Malformed slots are skipped. A well-formed slot without a resumption
    /// field ends the search.
    fn session_extra(&self) -> Option<SessionResumptionData> {
        for (slot_index, slot) in self.extra().iter().enumerate() {
            if !is_codec_owned(slot) {
                continue;
            }
            match decode_session_extra(slot) {
                ExtraDecode::Recognized(v) => return Some(v),
                ExtraDecode::Unrecognized => return None,
                ExtraDecode::Malformed(e) => {
                    debug!(slot_index, error = %e, "skipping malformed session extra slot");
                }
            }
        }
        None
    }

    /// Replace all codec slots with one holding `data`; an empty `data` just
    /// clears them. On error the record is left unchanged.
    fn set_session_extra(&mut self, data: &SessionResumptionData) -> Result<(), SessionExtraError> {
        let encoded = encode_session_extra(data)?;
        self.clear_session_extra();
        if let Some(slot) = encoded {
            self.extra_mut().push(slot);
        }
        Ok(())
    }

    /// Remove every codec slot, keeping foreign slots in order.
    fn clear_session_extra(&mut self) {
        self.extra_mut().retain(|slot| !is_codec_owned(slot));
    }
}

impl SessionRecord for Vec<Vec<u8>> {
    fn extra(&self) -> &[Vec<u8>] {
        self
    }

    fn extra_mut(&mut self) -> &mut Vec<Vec<u8>> {
        self
    }
}
