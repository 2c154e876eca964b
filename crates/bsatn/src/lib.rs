//! BSATN: the Binary SpacetimeDB Algebraic Type Notation.
//!
//! The wire format spoken between SpacetimeDB hosts and modules, together
//! with the schema metadata that describes every value on it:
//!
//! - [`buffer`] — the little-endian byte codec: [`BufWriter`], [`BufReader`],
//!   the pre-sizing [`CountWriter`] and [`DecodeError`].
//! - [`AlgebraicType`] — the self-describing schema tree of sums, products,
//!   arrays, refs and primitives.
//! - [`TypeRegistry`] / [`Typespace`] — deduplicated interning of named
//!   complex types, frozen and emitted once at module-description time.
//! - [`Serialize`] / [`Deserialize`] / [`SpacetimeType`] — the trait triple
//!   binding a user-defined type to the codec.
//! - The special products [`Identity`], [`ConnectionId`], [`Timestamp`],
//!   [`TimeDuration`] and the [`ScheduleAt`] sum, which serialize as their
//!   payloads and stay inline in every schema.
//!
//! Cross-language interop hangs on the exact framing rules here: identical
//! bytes are produced by several independent implementations, and the
//! reserved names of [`product_type`] and [`sum_type`] are part of the
//! protocol. See the `tests/` directory for the byte-level scenarios.
//!
//! The codec performs no I/O: it is handed byte buffers and produces byte
//! buffers, synchronously, with no global state beyond a registry its owner
//! builds and freezes.

pub mod buffer;
pub mod de;
pub mod ser;

pub mod algebraic_type;
pub mod array_type;
pub mod product_type;
pub mod sum_type;

pub mod algebraic_value;
pub mod array_value;
pub mod product_value;
pub mod sum_value;

pub mod meta_type;
pub mod registry;
pub mod typespace;

pub mod connection_id;
pub mod identity;
pub mod schedule_at;
pub mod time_duration;
pub mod timestamp;

pub use algebraic_type::AlgebraicType;
pub use algebraic_value::{AlgebraicValue, F32, F64};
pub use array_type::ArrayType;
pub use array_value::ArrayValue;
pub use buffer::{BufReader, BufWriter, CountWriter, Cursor, DecodeError};
pub use connection_id::ConnectionId;
pub use de::{Deserialize, DeserializeOwned};
pub use identity::Identity;
pub use meta_type::MetaType;
pub use product_type::{ProductType, ProductTypeElement};
pub use product_value::ProductValue;
pub use registry::{Registration, RegistryConflict, TypeRegistry};
pub use schedule_at::ScheduleAt;
pub use ser::Serialize;
pub use sum_type::{SumType, SumTypeVariant};
pub use sum_value::SumValue;
pub use time_duration::TimeDuration;
pub use timestamp::Timestamp;
pub use typespace::{AlgebraicTypeRef, Typespace, TypespaceBuilder, WithTypespace};

/// A type with a statically-known schema in the algebraic type system.
///
/// Together with [`Serialize`] and [`Deserialize`] this completes the trait
/// triple the codec requires of user-defined types. `make_type` returns the
/// `AlgebraicType` to use at the use site: named types intern themselves
/// through [`TypespaceBuilder::add`] and return a `Ref`, while inline types
/// (primitives, arrays, options, the special products) return their type
/// structurally without touching the builder.
///
/// Adding a new type means implementing these traits for it; the codec
/// itself never changes.
pub trait SpacetimeType {
    fn make_type<S: TypespaceBuilder>(ts: &mut S) -> AlgebraicType;
}

macro_rules! impl_spacetime_type {
    ($($ty:ty => $make:expr,)*) => {
        $(impl SpacetimeType for $ty {
            fn make_type<S: TypespaceBuilder>(_ts: &mut S) -> AlgebraicType {
                $make
            }
        })*
    };
}

impl_spacetime_type! {
    bool => AlgebraicType::Bool,
    i8 => AlgebraicType::I8,
    u8 => AlgebraicType::U8,
    i16 => AlgebraicType::I16,
    u16 => AlgebraicType::U16,
    i32 => AlgebraicType::I32,
    u32 => AlgebraicType::U32,
    i64 => AlgebraicType::I64,
    u64 => AlgebraicType::U64,
    i128 => AlgebraicType::I128,
    u128 => AlgebraicType::U128,
    ethnum::i256 => AlgebraicType::I256,
    ethnum::u256 => AlgebraicType::U256,
    f32 => AlgebraicType::F32,
    f64 => AlgebraicType::F64,
    F32 => AlgebraicType::F32,
    F64 => AlgebraicType::F64,
    String => AlgebraicType::String,
    str => AlgebraicType::String,
    () => AlgebraicType::unit(),
}

impl<T: SpacetimeType> SpacetimeType for Vec<T> {
    fn make_type<S: TypespaceBuilder>(ts: &mut S) -> AlgebraicType {
        AlgebraicType::array(T::make_type(ts))
    }
}

impl<T: SpacetimeType> SpacetimeType for Box<[T]> {
    fn make_type<S: TypespaceBuilder>(ts: &mut S) -> AlgebraicType {
        AlgebraicType::array(T::make_type(ts))
    }
}

impl SpacetimeType for Box<str> {
    fn make_type<S: TypespaceBuilder>(_ts: &mut S) -> AlgebraicType {
        AlgebraicType::String
    }
}

impl<T: SpacetimeType> SpacetimeType for Option<T> {
    fn make_type<S: TypespaceBuilder>(ts: &mut S) -> AlgebraicType {
        AlgebraicType::option(T::make_type(ts))
    }
}

impl<T: SpacetimeType, E: SpacetimeType> SpacetimeType for Result<T, E> {
    fn make_type<S: TypespaceBuilder>(ts: &mut S) -> AlgebraicType {
        AlgebraicType::result(T::make_type(ts), E::make_type(ts))
    }
}

impl<T: SpacetimeType> SpacetimeType for Box<T> {
    fn make_type<S: TypespaceBuilder>(ts: &mut S) -> AlgebraicType {
        T::make_type(ts)
    }
}

impl<T: SpacetimeType + ?Sized> SpacetimeType for &T {
    fn make_type<S: TypespaceBuilder>(ts: &mut S) -> AlgebraicType {
        T::make_type(ts)
    }
}

/// Serializes `value` into `writer`.
pub fn to_writer<W: BufWriter, T: Serialize + ?Sized>(writer: &mut W, value: &T) {
    value.serialize(writer);
}

/// The number of bytes [`to_vec`] would produce for `value`, counted without
/// allocating.
pub fn to_len<T: Serialize + ?Sized>(value: &T) -> usize {
    let mut counter = CountWriter::new();
    value.serialize(&mut counter);
    counter.finish()
}

/// Serializes `value` into a fresh buffer, pre-sized via [`to_len`].
pub fn to_vec<T: Serialize + ?Sized>(value: &T) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(to_len(value));
    value.serialize(&mut bytes);
    bytes
}

/// Deserializes a `T` from `bytes`, requiring the input to be exactly one
/// encoded value: leftover input fails with [`DecodeError::TrailingBytes`].
pub fn from_slice<'de, T: Deserialize<'de>>(bytes: &'de [u8]) -> Result<T, DecodeError> {
    let mut reader = bytes;
    let value = T::deserialize(&mut reader)?;
    match reader.remaining() {
        0 => Ok(value),
        remaining => Err(DecodeError::TrailingBytes { remaining }),
    }
}

/// Deserializes a `T` from `reader`, leaving any trailing bytes for the
/// caller to interpret.
pub fn from_reader<'de, T: Deserialize<'de>, R: BufReader<'de>>(reader: &mut R) -> Result<T, DecodeError> {
    T::deserialize(reader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_len_agrees_with_to_vec() {
        let values: Vec<Option<String>> = vec![Some("hi".into()), None, Some("".into())];
        assert_eq!(to_len(&values), to_vec(&values).len());
        assert_eq!(to_len(&Identity::ZERO), 32);
        assert_eq!(to_len(&true), 1);
    }

    #[test]
    fn from_slice_rejects_trailing_bytes() {
        let mut bytes = to_vec(&7u16);
        bytes.push(0xaa);
        assert_eq!(
            from_slice::<u16>(&bytes),
            Err(DecodeError::TrailingBytes { remaining: 1 })
        );
    }

    #[test]
    fn from_reader_leaves_trailing_bytes() {
        let mut bytes = to_vec(&7u16);
        bytes.push(0xaa);
        let mut reader = bytes.as_slice();
        assert_eq!(from_reader::<u16, _>(&mut reader), Ok(7));
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn container_types_are_inline() {
        let mut registry = TypeRegistry::new();
        assert_eq!(
            <Vec<Option<u32>>>::make_type(&mut registry),
            AlgebraicType::array(AlgebraicType::option(AlgebraicType::U32))
        );
        assert_eq!(
            <Result<u8, String>>::make_type(&mut registry),
            AlgebraicType::result(AlgebraicType::U8, AlgebraicType::String)
        );
        assert_eq!(registry.len(), 0);
    }
}
