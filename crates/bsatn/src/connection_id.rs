//! The `ConnectionId` special product: a 128-bit label for one client
//! connection, serialized as its `u128` payload only. The reserved field
//! name `__connection_id__` in its schema keeps it inline, never registered.

use std::fmt;

use crate::algebraic_type::AlgebraicType;
use crate::buffer::{BufReader, BufWriter, DecodeError};
use crate::de::Deserialize;
use crate::ser::Serialize;
use crate::typespace::TypespaceBuilder;
use crate::SpacetimeType;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ConnectionId {
    __connection_id__: u128,
}

impl ConnectionId {
    /// The all-zero connection id, standing for "not connected".
    pub const ZERO: Self = Self::from_u128(0);

    pub const fn from_u128(id: u128) -> Self {
        Self { __connection_id__: id }
    }

    pub const fn to_u128(self) -> u128 {
        self.__connection_id__
    }

    /// Constructs a connection id from its wire-order (little-endian) bytes.
    pub const fn from_byte_array(bytes: [u8; 16]) -> Self {
        Self::from_u128(u128::from_le_bytes(bytes))
    }

    /// The wire-order (little-endian) bytes.
    pub const fn to_byte_array(self) -> [u8; 16] {
        self.__connection_id__.to_le_bytes()
    }

    /// Parses the 32-digit hex form, most significant byte first.
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(hex, &mut bytes)?;
        Ok(Self::from_u128(u128::from_be_bytes(bytes)))
    }

    /// The 32-digit lowercase hex form, most significant byte first.
    pub fn to_hex(self) -> String {
        hex::encode(self.__connection_id__.to_be_bytes())
    }

    pub fn get_type() -> AlgebraicType {
        AlgebraicType::connection_id()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConnectionId({})", self.to_hex())
    }
}

impl From<u128> for ConnectionId {
    fn from(id: u128) -> Self {
        Self::from_u128(id)
    }
}

impl From<ConnectionId> for u128 {
    fn from(id: ConnectionId) -> Self {
        id.to_u128()
    }
}

impl Serialize for ConnectionId {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        writer.put_u128(self.__connection_id__);
    }
}

impl<'de> Deserialize<'de> for ConnectionId {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
        reader.get_u128().map(Self::from_u128)
    }
}

impl SpacetimeType for ConnectionId {
    fn make_type<S: TypespaceBuilder>(_ts: &mut S) -> AlgebraicType {
        AlgebraicType::connection_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_is_sixteen_le_bytes() {
        let id = ConnectionId::from_u128(0x0102_0304_0506_0708_090a_0b0c_0d0e_0f10);
        let mut out = Vec::new();
        id.serialize(&mut out);
        assert_eq!(out[0], 0x10);
        assert_eq!(out[15], 0x01);
        assert_eq!(ConnectionId::deserialize(&mut out.as_slice()).unwrap(), id);
    }

    #[test]
    fn hex_round_trip() {
        let id = ConnectionId::from_u128(0xfeed_f00d);
        assert_eq!(ConnectionId::from_hex(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn type_is_the_special_product() {
        let ty = ConnectionId::get_type();
        assert!(ty.is_connection_id());
        assert!(ty.is_inline());
    }
}
