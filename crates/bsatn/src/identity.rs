//! The `Identity` special product.
//!
//! An identity is an opaque 256-bit label for an actor. On the wire it is
//! its `u256` payload and nothing else: the surrounding one-element product
//! exists only in the schema, where the reserved field name `__identity__`
//! marks the type as special so it is inlined at every use site and never
//! registered.

use std::fmt;

use ethnum::u256;

use crate::algebraic_type::AlgebraicType;
use crate::buffer::{BufReader, BufWriter, DecodeError};
use crate::de::Deserialize;
use crate::ser::Serialize;
use crate::typespace::TypespaceBuilder;
use crate::SpacetimeType;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Identity {
    __identity__: u256,
}

impl Identity {
    /// The all-zero identity, used as a placeholder for "no one".
    pub const ZERO: Self = Self::from_u256(u256::ZERO);

    pub const fn from_u256(id: u256) -> Self {
        Self { __identity__: id }
    }

    pub const fn to_u256(self) -> u256 {
        self.__identity__
    }

    /// Constructs an identity from its wire-order (little-endian) bytes.
    pub fn from_byte_array(bytes: [u8; 32]) -> Self {
        Self::from_u256(u256::from_le_bytes(bytes))
    }

    /// The wire-order (little-endian) bytes of this identity.
    pub fn to_byte_array(self) -> [u8; 32] {
        self.__identity__.to_le_bytes()
    }

    /// Constructs an identity from its big-endian bytes, the order hex
    /// strings display in.
    pub fn from_be_byte_array(bytes: [u8; 32]) -> Self {
        Self::from_u256(u256::from_be_bytes(bytes))
    }

    pub fn to_be_byte_array(self) -> [u8; 32] {
        self.__identity__.to_be_bytes()
    }

    /// Parses the 64-digit hex form, most significant byte first.
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hex, &mut bytes)?;
        Ok(Self::from_be_byte_array(bytes))
    }

    /// The 64-digit lowercase hex form, most significant byte first.
    pub fn to_hex(self) -> String {
        hex::encode(self.to_be_byte_array())
    }

    /// The schema of `Identity`: a one-element product whose reserved field
    /// name identifies it.
    pub fn get_type() -> AlgebraicType {
        AlgebraicType::identity()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.to_hex())
    }
}

impl From<u256> for Identity {
    fn from(id: u256) -> Self {
        Self::from_u256(id)
    }
}

impl From<Identity> for u256 {
    fn from(id: Identity) -> Self {
        id.to_u256()
    }
}

impl Serialize for Identity {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        // Payload only; the field name lives in the schema, not on the wire.
        writer.put_u256(self.__identity__);
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
        reader.get_u256().map(Self::from_u256)
    }
}

impl SpacetimeType for Identity {
    fn make_type<S: TypespaceBuilder>(_ts: &mut S) -> AlgebraicType {
        AlgebraicType::identity()
    }
}
