/// Hash algorithm identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgId {
    Sha256,
    Sha384,
}

impl HashAlgId {
    /// Digest output size in bytes.
    pub fn output_size(self) -> usize {
        match self {
            HashAlgId::Sha256 => 32,
            HashAlgId::Sha384 => 48,
        }
    }
}

/// Elliptic curve identifiers usable for ephemeral Diffie-Hellman.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EccCurveId {
    NistP256,
    NistP384,
    NistP521,
}

impl EccCurveId {
    /// Size of a field element (and of the ECDH shared secret) in bytes.
    pub fn field_size(self) -> usize {
        match self {
            EccCurveId::NistP256 => 32,
            EccCurveId::NistP384 => 48,
            EccCurveId::NistP521 => 66,
        }
    }

    /// Size of an uncompressed SEC1 point: `0x04 || x || y`.
    pub fn uncompressed_point_size(self) -> usize {
        1 + 2 * self.field_size()
    }
}
