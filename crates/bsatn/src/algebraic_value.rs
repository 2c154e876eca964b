//! Dynamically-typed values of the wire format.
//!
//! An [`AlgebraicValue`] owns its contents and can encode itself without a
//! schema; decoding is always schema-directed, because the wire format
//! carries no framing or type information of its own.
//!
//! Floats are stored as [`F32`]/[`F64`], total-ordered wrappers under which
//! NaN equals itself, so `deserialize(serialize(v)) == v` holds bit-exactly
//! for every float payload.

use enum_as_inner::EnumAsInner;
use ethnum::{i256, u256};

use crate::algebraic_type::AlgebraicType;
use crate::array_value::ArrayValue;
use crate::buffer::{BufReader, BufWriter, DecodeError};
use crate::de::Deserialize;
use crate::product_value::ProductValue;
use crate::ser::Serialize;
use crate::sum_value::SumValue;
use crate::typespace::{Typespace, WithTypespace, EMPTY_TYPESPACE};

/// A totally-ordered `f32`: `NaN == NaN`, and all values order.
pub type F32 = decorum::Total<f32>;
/// A totally-ordered `f64`.
pub type F64 = decorum::Total<f64>;

/// A value, of any type in the algebraic type system.
#[derive(Clone, Debug, PartialEq, Eq, Hash, EnumAsInner)]
pub enum AlgebraicValue {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    I128(i128),
    U128(u128),
    I256(Box<i256>),
    U256(Box<u256>),
    F32(F32),
    F64(F64),
    String(Box<str>),
    Sum(SumValue),
    Product(ProductValue),
    Array(ArrayValue),
}

impl AlgebraicValue {
    /// The unit value, the product of no fields.
    pub fn unit() -> Self {
        Self::Product(ProductValue::unit())
    }

    /// A product value with the given field values.
    pub fn product(elements: impl Into<ProductValue>) -> Self {
        Self::Product(elements.into())
    }

    /// A sum value with variant `tag` active and payload `value`.
    pub fn sum(tag: u8, value: AlgebraicValue) -> Self {
        Self::Sum(SumValue::new(tag, value))
    }

    /// The `some` case of an option: tag 0 around `value`.
    pub fn option_some(value: AlgebraicValue) -> Self {
        Self::sum(0, value)
    }

    /// The `none` case of an option: tag 1 with a unit payload.
    pub fn option_none() -> Self {
        Self::sum(1, Self::unit())
    }

    /// A byte-array value.
    pub fn bytes(bytes: impl Into<Box<[u8]>>) -> Self {
        Self::Array(ArrayValue::U8(bytes.into()))
    }

    /// The type this value self-describes as.
    ///
    /// For sum values the variants below the active tag are invisible and
    /// padded as unnamed units, and empty composite arrays fall back to a
    /// unit element type; bytes encoded by this value always decode against
    /// the returned type, but it is not necessarily the schema the value was
    /// produced from.
    pub fn type_of(&self) -> AlgebraicType {
        match self {
            Self::Bool(_) => AlgebraicType::Bool,
            Self::I8(_) => AlgebraicType::I8,
            Self::U8(_) => AlgebraicType::U8,
            Self::I16(_) => AlgebraicType::I16,
            Self::U16(_) => AlgebraicType::U16,
            Self::I32(_) => AlgebraicType::I32,
            Self::U32(_) => AlgebraicType::U32,
            Self::I64(_) => AlgebraicType::I64,
            Self::U64(_) => AlgebraicType::U64,
            Self::I128(_) => AlgebraicType::I128,
            Self::U128(_) => AlgebraicType::U128,
            Self::I256(_) => AlgebraicType::I256,
            Self::U256(_) => AlgebraicType::U256,
            Self::F32(_) => AlgebraicType::F32,
            Self::F64(_) => AlgebraicType::F64,
            Self::String(_) => AlgebraicType::String,
            Self::Sum(sum) => AlgebraicType::Sum(sum.type_of()),
            Self::Product(prod) => AlgebraicType::Product(prod.type_of()),
            Self::Array(arr) => AlgebraicType::array(arr.elem_type()),
        }
    }

    /// Writes this value per the layout of its type. No framing, no
    /// terminator.
    pub fn encode(&self, bytes: &mut impl BufWriter) {
        match self {
            Self::Bool(v) => bytes.put_bool(*v),
            Self::I8(v) => bytes.put_i8(*v),
            Self::U8(v) => bytes.put_u8(*v),
            Self::I16(v) => bytes.put_i16(*v),
            Self::U16(v) => bytes.put_u16(*v),
            Self::I32(v) => bytes.put_i32(*v),
            Self::U32(v) => bytes.put_u32(*v),
            Self::I64(v) => bytes.put_i64(*v),
            Self::U64(v) => bytes.put_u64(*v),
            Self::I128(v) => bytes.put_i128(*v),
            Self::U128(v) => bytes.put_u128(*v),
            Self::I256(v) => bytes.put_i256(**v),
            Self::U256(v) => bytes.put_u256(**v),
            Self::F32(v) => bytes.put_f32(v.into_inner()),
            Self::F64(v) => bytes.put_f64(v.into_inner()),
            Self::String(v) => bytes.put_str(v),
            Self::Sum(sum) => sum.encode(bytes),
            Self::Product(prod) => prod.encode(bytes),
            Self::Array(arr) => arr.encode(bytes),
        }
    }

    /// Decodes a value of type `ty`, which must contain no refs; decode
    /// ref-bearing schemas through [`WithTypespace::decode_value`].
    pub fn decode<'de>(ty: &AlgebraicType, bytes: &mut impl BufReader<'de>) -> Result<Self, DecodeError> {
        decode_at(&EMPTY_TYPESPACE, ty, bytes)
    }
}

impl WithTypespace<'_, AlgebraicType> {
    /// Decodes a value of `self.ty()`, resolving refs in the typespace.
    pub fn decode_value<'de>(&self, bytes: &mut impl BufReader<'de>) -> Result<AlgebraicValue, DecodeError> {
        decode_at(self.typespace(), self.ty(), bytes)
    }
}

impl Serialize for AlgebraicValue {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        self.encode(writer);
    }
}

pub(crate) fn decode_at<'de>(
    ts: &Typespace,
    ty: &AlgebraicType,
    bytes: &mut impl BufReader<'de>,
) -> Result<AlgebraicValue, DecodeError> {
    match ty {
        AlgebraicType::Ref(r) => decode_at(ts, ts.resolve(*r)?, bytes),
        AlgebraicType::Sum(sum) => SumValue::decode_at(ts, sum, bytes).map(AlgebraicValue::Sum),
        AlgebraicType::Product(prod) => ProductValue::decode_at(ts, prod, bytes).map(AlgebraicValue::Product),
        AlgebraicType::Array(arr) => ArrayValue::decode_at(ts, arr, bytes).map(AlgebraicValue::Array),
        AlgebraicType::String => Box::<str>::deserialize(bytes).map(AlgebraicValue::String),
        AlgebraicType::Bool => bool::deserialize(bytes).map(AlgebraicValue::Bool),
        AlgebraicType::I8 => bytes.get_i8().map(AlgebraicValue::I8),
        AlgebraicType::U8 => bytes.get_u8().map(AlgebraicValue::U8),
        AlgebraicType::I16 => bytes.get_i16().map(AlgebraicValue::I16),
        AlgebraicType::U16 => bytes.get_u16().map(AlgebraicValue::U16),
        AlgebraicType::I32 => bytes.get_i32().map(AlgebraicValue::I32),
        AlgebraicType::U32 => bytes.get_u32().map(AlgebraicValue::U32),
        AlgebraicType::I64 => bytes.get_i64().map(AlgebraicValue::I64),
        AlgebraicType::U64 => bytes.get_u64().map(AlgebraicValue::U64),
        AlgebraicType::I128 => bytes.get_i128().map(AlgebraicValue::I128),
        AlgebraicType::U128 => bytes.get_u128().map(AlgebraicValue::U128),
        AlgebraicType::I256 => bytes.get_i256().map(|v| AlgebraicValue::I256(Box::new(v))),
        AlgebraicType::U256 => bytes.get_u256().map(|v| AlgebraicValue::U256(Box::new(v))),
        AlgebraicType::F32 => F32::deserialize(bytes).map(AlgebraicValue::F32),
        AlgebraicType::F64 => F64::deserialize(bytes).map(AlgebraicValue::F64),
    }
}

macro_rules! impl_from {
    ($($from:ty => $variant:ident $(: $conv:expr)?,)*) => {
        $(impl From<$from> for AlgebraicValue {
            fn from(value: $from) -> Self {
                Self::$variant(impl_from!(@conv value $(, $conv)?))
            }
        })*
    };
    (@conv $value:ident) => { $value };
    (@conv $value:ident, $conv:expr) => { ($conv)($value) };
}

impl_from! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    i128 => I128,
    u128 => U128,
    i256 => I256: Box::new,
    u256 => U256: Box::new,
    F32 => F32,
    F64 => F64,
    f32 => F32: F32::from_inner,
    f64 => F64: F64::from_inner,
    Box<str> => String,
    &str => String: Box::from,
    SumValue => Sum,
    ProductValue => Product,
    ArrayValue => Array,
}

impl From<String> for AlgebraicValue {
    fn from(value: String) -> Self {
        Self::String(value.into())
    }
}

impl From<Option<AlgebraicValue>> for AlgebraicValue {
    fn from(value: Option<AlgebraicValue>) -> Self {
        match value {
            Some(value) => Self::option_some(value),
            None => Self::option_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product;

    #[track_caller]
    fn round_trip(value: AlgebraicValue) {
        let ty = value.type_of();
        let mut bytes = Vec::new();
        value.encode(&mut bytes);
        let mut reader = bytes.as_slice();
        let decoded = AlgebraicValue::decode(&ty, &mut reader).unwrap();
        assert_eq!(reader.remaining(), 0, "trailing bytes after decode");
        assert_eq!(decoded, value);
    }

    #[test]
    fn round_trip_against_self_described_type() {
        round_trip(AlgebraicValue::from(true));
        round_trip(AlgebraicValue::from(-7i32));
        round_trip(AlgebraicValue::from(u256::MAX));
        round_trip(AlgebraicValue::from(f32::NAN));
        round_trip(AlgebraicValue::from("hello"));
        round_trip(AlgebraicValue::bytes([1, 2, 3]));
        round_trip(AlgebraicValue::option_some(AlgebraicValue::from(42u32)));
        round_trip(AlgebraicValue::option_none());
        round_trip(AlgebraicValue::Product(product![1u8, "x", false]));
        round_trip(AlgebraicValue::Array(ArrayValue::from(vec![1u16, 2, 3])));
        round_trip(AlgebraicValue::sum(2, AlgebraicValue::from("payload")));
    }

    #[test]
    fn option_layout() {
        let mut bytes = Vec::new();
        AlgebraicValue::option_some(AlgebraicValue::from(42u32)).encode(&mut bytes);
        assert_eq!(bytes, [0x00, 0x2a, 0, 0, 0]);

        bytes.clear();
        AlgebraicValue::option_none().encode(&mut bytes);
        assert_eq!(bytes, [0x01]);
    }

    #[test]
    fn decode_through_typespace_resolves_refs() {
        use crate::typespace::AlgebraicTypeRef;
        let ts = Typespace::new(vec![AlgebraicType::product([("x", AlgebraicType::I32)])]);
        let ty = AlgebraicType::array(AlgebraicType::Ref(AlgebraicTypeRef(0)));
        let bytes = [0x02, 0, 0, 0, 0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0];
        let value = ts.with_type(&ty).decode_value(&mut bytes.as_slice()).unwrap();
        let arr = value.as_array().unwrap().as_product().unwrap();
        assert_eq!(arr[0], product![-1i32]);
        assert_eq!(arr[1], product![0i32]);
    }

    #[test]
    fn bare_ref_without_typespace_fails() {
        use crate::typespace::AlgebraicTypeRef;
        let ty = AlgebraicType::Ref(AlgebraicTypeRef(0));
        assert_eq!(
            AlgebraicValue::decode(&ty, &mut [0u8].as_slice()),
            Err(DecodeError::InvalidTypeRef(0))
        );
    }

    #[test]
    fn nan_equals_itself_in_values() {
        assert_eq!(AlgebraicValue::from(f64::NAN), AlgebraicValue::from(f64::NAN));
    }
}
