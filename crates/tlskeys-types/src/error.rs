/// Cryptographic primitive errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid argument")]
    InvalidArg,
    #[error("random generation failed")]
    RandGenFail,

    // Buffer errors
    #[error("buffer length not enough: need {need}, got {got}")]
    BufferTooSmall { need: usize, got: usize },

    // ECC errors
    #[error("ecc: point at infinity")]
    EccPointAtInfinity,
    #[error("ecc: invalid private key")]
    EccInvalidPrivateKey,
    #[error("ecc: invalid public key")]
    EccInvalidPublicKey,

    // KDF errors
    #[error("kdf: derived key length overflow")]
    KdfDkLenOverflow,
    #[error("kdf: label or context too long")]
    KdfLabelTooLong,
}

/// Malformed session extra data.
///
/// Unknown container versions and unknown field ids are not errors; these
/// variants only describe truncated or inconsistent input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionExtraError {
    #[error("invalid session resumption data: too short")]
    TooShort,
    #[error("invalid session resumption data: session id incomplete")]
    SessionIdIncomplete,
    #[error("invalid extra data: cannot read field count")]
    FieldCountTruncated,
    #[error("invalid extra data: field {index} header incomplete")]
    FieldHeaderIncomplete { index: u16 },
    #[error("invalid extra data: field {index} data incomplete")]
    FieldDataIncomplete { index: u16 },
    #[error("invalid extra data: field data exceeds 65535 bytes")]
    FieldTooLong,
    #[error("invalid extra data: more than 65535 fields")]
    TooManyFields,
}

/// TLS protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),
    #[error("unsupported named group: 0x{0:04x}")]
    UnsupportedGroup(u16),
    #[error("no shared cipher suite")]
    NoSharedCipherSuite,
    #[error("session state error: {0}")]
    SessionState(String),
    #[error("session extra error: {0}")]
    SessionExtra(#[from] SessionExtraError),
    #[error("crypto error: {0}")]
    CryptoError(#[from] CryptoError),
}
