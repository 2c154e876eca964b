//! Values of array type, stored monomorphically.
//!
//! An `ArrayValue` keeps its elements in a typed slice per element kind
//! rather than as boxed `AlgebraicValue`s, so bulk encodes and decodes touch
//! primitive memory directly. On the wire all variants share one layout: a
//! `u32` element count followed by the encoded elements.

use enum_as_inner::EnumAsInner;
use ethnum::{i256, u256};

use crate::algebraic_type::AlgebraicType;
use crate::algebraic_value::{F32, F64};
use crate::array_type::ArrayType;
use crate::buffer::{BufReader, BufWriter, DecodeError};
use crate::de::Deserialize;
use crate::product_value::ProductValue;
use crate::ser::Serialize;
use crate::sum_value::SumValue;
use crate::typespace::{Typespace, EMPTY_TYPESPACE};

#[derive(Clone, Debug, PartialEq, Eq, Hash, EnumAsInner)]
pub enum ArrayValue {
    Bool(Box<[bool]>),
    I8(Box<[i8]>),
    U8(Box<[u8]>),
    I16(Box<[i16]>),
    U16(Box<[u16]>),
    I32(Box<[i32]>),
    U32(Box<[u32]>),
    I64(Box<[i64]>),
    U64(Box<[u64]>),
    I128(Box<[i128]>),
    U128(Box<[u128]>),
    I256(Box<[i256]>),
    U256(Box<[u256]>),
    F32(Box<[F32]>),
    F64(Box<[F64]>),
    String(Box<[Box<str>]>),
    Sum(Box<[SumValue]>),
    Product(Box<[ProductValue]>),
    Array(Box<[ArrayValue]>),
}

macro_rules! for_each_variant {
    ($mac:ident) => {
        $mac! {
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
            I256(i256),
            U256(u256),
            F32(F32),
            F64(F64),
            String(Box<str>),
            Sum(SumValue),
            Product(ProductValue),
            Array(ArrayValue),
        }
    };
}

macro_rules! impl_from_vec {
    ($($variant:ident($elem:ty),)*) => {
        $(impl From<Vec<$elem>> for ArrayValue {
            fn from(elems: Vec<$elem>) -> Self {
                Self::$variant(elems.into())
            }
        })*
    };
}
for_each_variant!(impl_from_vec);

impl From<Vec<String>> for ArrayValue {
    fn from(elems: Vec<String>) -> Self {
        Self::String(elems.into_iter().map(Box::from).collect())
    }
}

impl From<Vec<f32>> for ArrayValue {
    fn from(elems: Vec<f32>) -> Self {
        Self::F32(elems.into_iter().map(F32::from_inner).collect())
    }
}

impl From<Vec<f64>> for ArrayValue {
    fn from(elems: Vec<f64>) -> Self {
        Self::F64(elems.into_iter().map(F64::from_inner).collect())
    }
}

impl ArrayValue {
    pub fn len(&self) -> usize {
        macro_rules! impl_len {
            ($($variant:ident($elem:ty),)*) => {
                match self { $(Self::$variant(elems) => elems.len(),)* }
            };
        }
        for_each_variant!(impl_len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element type this array self-describes as.
    ///
    /// An empty `Sum`/`Product`/`Array`-element array has no element to
    /// inspect and falls back to the unit type; decode such arrays
    /// schema-directed instead.
    pub fn elem_type(&self) -> AlgebraicType {
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
            Self::Sum(elems) => elems
                .first()
                .map(|sum| AlgebraicType::Sum(sum.type_of()))
                .unwrap_or_else(AlgebraicType::unit),
            Self::Product(elems) => elems
                .first()
                .map(|prod| AlgebraicType::Product(prod.type_of()))
                .unwrap_or_else(AlgebraicType::unit),
            Self::Array(elems) => elems
                .first()
                .map(|arr| AlgebraicType::array(arr.elem_type()))
                .unwrap_or_else(AlgebraicType::unit),
        }
    }

    /// Writes the `u32` element count, then each element in order.
    pub fn encode(&self, bytes: &mut impl BufWriter) {
        // Byte arrays go through the length-prefixed raw write.
        if let Self::U8(elems) = self {
            bytes.put_bytes(elems);
            return;
        }
        macro_rules! impl_encode {
            ($($variant:ident($elem:ty),)*) => {
                match self {
                    $(Self::$variant(elems) => {
                        bytes.put_u32(elems.len() as u32);
                        for elem in &**elems {
                            encode_elem(elem, bytes);
                        }
                    })*
                }
            };
        }
        for_each_variant!(impl_encode)
    }

    /// Decodes an array value against `ty`, which must contain no refs.
    pub fn decode<'de>(ty: &ArrayType, bytes: &mut impl BufReader<'de>) -> Result<Self, DecodeError> {
        Self::decode_at(&EMPTY_TYPESPACE, ty, bytes)
    }

    pub(crate) fn decode_at<'de>(
        ts: &Typespace,
        ty: &ArrayType,
        bytes: &mut impl BufReader<'de>,
    ) -> Result<Self, DecodeError> {
        // Resolve ref chains up front so the element loop is monomorphic.
        let mut elem_ty = &*ty.elem_ty;
        while let AlgebraicType::Ref(r) = elem_ty {
            elem_ty = ts.resolve(*r)?;
        }

        macro_rules! read_elems {
            ($variant:ident, $bytes:expr, |$r:ident| $read:expr) => {{
                let len = crate::de::read_len($bytes)?;
                let mut elems = Vec::with_capacity(len.min($bytes.remaining()));
                for _ in 0..len {
                    let $r = &mut *$bytes;
                    elems.push($read);
                }
                Ok(Self::$variant(elems.into()))
            }};
        }

        match elem_ty {
            AlgebraicType::Ref(_) => unreachable!("ref chains resolved above"),
            AlgebraicType::Sum(sum) => read_elems!(Sum, bytes, |r| SumValue::decode_at(ts, sum, r)?),
            AlgebraicType::Product(prod) => {
                read_elems!(Product, bytes, |r| ProductValue::decode_at(ts, prod, r)?)
            }
            AlgebraicType::Array(arr) => read_elems!(Array, bytes, |r| ArrayValue::decode_at(ts, arr, r)?),
            AlgebraicType::String => read_elems!(String, bytes, |r| Box::<str>::deserialize(r)?),
            AlgebraicType::Bool => read_elems!(Bool, bytes, |r| bool::deserialize(r)?),
            AlgebraicType::I8 => read_elems!(I8, bytes, |r| r.get_i8()?),
            AlgebraicType::U8 => {
                let data = crate::de::read_len_prefixed(bytes)?;
                Ok(Self::U8(data.into()))
            }
            AlgebraicType::I16 => read_elems!(I16, bytes, |r| r.get_i16()?),
            AlgebraicType::U16 => read_elems!(U16, bytes, |r| r.get_u16()?),
            AlgebraicType::I32 => read_elems!(I32, bytes, |r| r.get_i32()?),
            AlgebraicType::U32 => read_elems!(U32, bytes, |r| r.get_u32()?),
            AlgebraicType::I64 => read_elems!(I64, bytes, |r| r.get_i64()?),
            AlgebraicType::U64 => read_elems!(U64, bytes, |r| r.get_u64()?),
            AlgebraicType::I128 => read_elems!(I128, bytes, |r| r.get_i128()?),
            AlgebraicType::U128 => read_elems!(U128, bytes, |r| r.get_u128()?),
            AlgebraicType::I256 => read_elems!(I256, bytes, |r| r.get_i256()?),
            AlgebraicType::U256 => read_elems!(U256, bytes, |r| r.get_u256()?),
            AlgebraicType::F32 => read_elems!(F32, bytes, |r| F32::deserialize(r)?),
            AlgebraicType::F64 => read_elems!(F64, bytes, |r| F64::deserialize(r)?),
        }
    }
}

/// Encodes one element of an array.
fn encode_elem<T: Serialize>(elem: &T, bytes: &mut impl BufWriter) {
    elem.serialize(bytes);
}

impl Serialize for ArrayValue {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        self.encode(writer);
    }
}
