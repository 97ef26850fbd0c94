//! Layout of the store account data and of the instruction data.
//!
//! Both are the same: a single `num` field encoded as 4-byte little-endian
//! unsigned integer.  There is no discriminant.

/// Length of the encoded value in bytes.  This is also the size of the store
/// account.
pub const LEN: usize = core::mem::size_of::<u32>();

/// Value held in the store account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoredValue {
    pub num: u32,
}

/// Error returned when decoding a buffer which isn’t exactly [`LEN`] bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_more::Display)]
pub enum DecodeError {
    #[display("malformed account data: expected 4 bytes, got {_0}")]
    WrongLength(usize),
}

impl StoredValue {
    pub fn encode(&self) -> [u8; LEN] { self.num.to_le_bytes() }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        <[u8; LEN]>::try_from(bytes)
            .map(|bytes| Self { num: u32::from_le_bytes(bytes) })
            .map_err(|_| DecodeError::WrongLength(bytes.len()))
    }
}

impl From<u32> for StoredValue {
    fn from(num: u32) -> Self { Self { num } }
}

/// Encodes `num` into its wire representation.
pub fn encode(num: u32) -> [u8; LEN] { StoredValue::from(num).encode() }

/// Decodes the `num` field from its wire representation.
pub fn decode(bytes: &[u8]) -> Result<u32, DecodeError> {
    StoredValue::decode(bytes).map(|value| value.num)
}
