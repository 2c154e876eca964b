//! The schema language: a tagged tree describing any value on the wire.
//!
//! An `AlgebraicType` is finite and acyclic; cycles in user type graphs are
//! expressed exclusively through [`AlgebraicType::Ref`] indices into the
//! containing [`crate::Typespace`]. Equality and hashing are purely
//! structural over the local tree — a `Ref` hashes its index and is never
//! dereferenced during comparison.

use crate::algebraic_value::AlgebraicValue;
use crate::array_type::ArrayType;
use crate::buffer::{BufReader, BufWriter, DecodeError};
use crate::meta_type::MetaType;
use crate::product_type::{ProductType, ProductTypeElement};
use crate::sum_type::{SumType, SumTypeVariant};
use crate::sum_value::SumValue;
use crate::typespace::AlgebraicTypeRef;
use crate::{product_type, ser};

/// The schema of a single BSATN value.
///
/// The variant order matches the wire tags of the type's own serialized form
/// (see [`AlgebraicType::encode`]): `Ref` is tag 0 through `F64` at tag 19.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AlgebraicType {
    /// An index into the containing typespace. Refs never cross typespaces.
    Ref(AlgebraicTypeRef),
    /// A discriminated union; values carry a `u8` variant tag plus payload.
    Sum(SumType),
    /// An ordered record; values are the concatenation of encoded fields.
    Product(ProductType),
    /// A homogeneous sequence with a `u32` length prefix.
    Array(ArrayType),
    /// A `u32`-length-prefixed UTF-8 string.
    String,
    /// A single byte, `0` or `1`.
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    I128,
    U128,
    I256,
    U256,
    /// IEEE-754 binary32, little-endian.
    F32,
    /// IEEE-754 binary64, little-endian.
    F64,
}

impl AlgebraicType {
    /// The unit type: the product of no elements.
    pub fn unit() -> Self {
        ProductType::unit().into()
    }

    /// A byte array, `Array<U8>`.
    pub fn bytes() -> Self {
        Self::array(Self::U8)
    }

    /// A sum with the given `variants`.
    pub fn sum<V: Into<SumType>>(variants: V) -> Self {
        Self::Sum(variants.into())
    }

    /// A product with the given `elements`.
    pub fn product<E: Into<ProductType>>(elements: E) -> Self {
        Self::Product(elements.into())
    }

    /// An array with elements of type `elem_ty`.
    pub fn array(elem_ty: Self) -> Self {
        Self::Array(ArrayType::new(elem_ty))
    }

    /// The option type over `some_ty`, with the reserved variant names and
    /// tag order `{some -> 0, none -> 1}`.
    pub fn option(some_ty: Self) -> Self {
        Self::Sum(SumType::option(some_ty))
    }

    /// The result type over `ok_ty` and `err_ty`, `{ok -> 0, err -> 1}`.
    pub fn result(ok_ty: Self, err_ty: Self) -> Self {
        Self::Sum(SumType::result(ok_ty, err_ty))
    }

    /// The `Identity` special product: `{ __identity__: U256 }`.
    pub fn identity() -> Self {
        Self::product([(product_type::IDENTITY_TAG, Self::U256)])
    }

    /// The `ConnectionId` special product: `{ __connection_id__: U128 }`.
    pub fn connection_id() -> Self {
        Self::product([(product_type::CONNECTION_ID_TAG, Self::U128)])
    }

    /// The `Timestamp` special product:
    /// `{ __timestamp_micros_since_unix_epoch__: I64 }`.
    pub fn timestamp() -> Self {
        Self::product([(product_type::TIMESTAMP_TAG, Self::I64)])
    }

    /// The `TimeDuration` special product: `{ __time_duration_micros__: I64 }`.
    pub fn time_duration() -> Self {
        Self::product([(product_type::TIME_DURATION_TAG, Self::I64)])
    }

    /// The `ScheduleAt` sum: `{ Interval(TimeDuration), Time(Timestamp) }`.
    pub fn schedule_at() -> Self {
        Self::Sum(SumType::schedule_at())
    }

    pub fn as_ref(&self) -> Option<AlgebraicTypeRef> {
        match self {
            Self::Ref(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_sum(&self) -> Option<&SumType> {
        match self {
            Self::Sum(sum) => Some(sum),
            _ => None,
        }
    }

    pub fn as_product(&self) -> Option<&ProductType> {
        match self {
            Self::Product(prod) => Some(prod),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayType> {
        match self {
            Self::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// If this is an option sum, the payload type of its `some` variant.
    pub fn as_option(&self) -> Option<&AlgebraicType> {
        self.as_sum().and_then(SumType::as_option)
    }

    pub fn is_option(&self) -> bool {
        self.as_option().is_some()
    }

    /// If this is a result sum, the payload types of `ok` and `err`.
    pub fn as_result(&self) -> Option<(&AlgebraicType, &AlgebraicType)> {
        self.as_sum().and_then(SumType::as_result)
    }

    pub fn is_result(&self) -> bool {
        self.as_result().is_some()
    }

    pub fn is_unit(&self) -> bool {
        self.as_product().is_some_and(ProductType::is_unit)
    }

    pub fn is_bytes(&self) -> bool {
        self.as_array().is_some_and(|arr| *arr.elem_ty == Self::U8)
    }

    pub fn is_identity(&self) -> bool {
        self.as_product().is_some_and(ProductType::is_identity)
    }

    pub fn is_connection_id(&self) -> bool {
        self.as_product().is_some_and(ProductType::is_connection_id)
    }

    pub fn is_timestamp(&self) -> bool {
        self.as_product().is_some_and(ProductType::is_timestamp)
    }

    pub fn is_time_duration(&self) -> bool {
        self.as_product().is_some_and(ProductType::is_time_duration)
    }

    pub fn is_schedule_at(&self) -> bool {
        self.as_sum().is_some_and(SumType::is_schedule_at)
    }

    /// Whether this is one of the special products of the protocol:
    /// a one-element product whose field name is reserved.
    pub fn is_special(&self) -> bool {
        self.as_product().is_some_and(ProductType::is_special)
    }

    /// Whether this type is always inlined at its use site and never
    /// interned in a typespace: primitives, strings, arrays, options,
    /// results, special products and `ScheduleAt`.
    ///
    /// Registering an inline type would change the generated client code
    /// downstream, so the registry refuses to.
    pub fn is_inline(&self) -> bool {
        match self {
            Self::Ref(_) => false,
            Self::Sum(sum) => sum.is_option() || sum.is_result() || sum.is_schedule_at(),
            Self::Product(prod) => prod.is_special(),
            _ => true,
        }
    }

    /// The wire tag of this variant in the type's own serialized form.
    pub(crate) fn tag(&self) -> u8 {
        match self {
            Self::Ref(_) => 0,
            Self::Sum(_) => 1,
            Self::Product(_) => 2,
            Self::Array(_) => 3,
            Self::String => 4,
            Self::Bool => 5,
            Self::I8 => 6,
            Self::U8 => 7,
            Self::I16 => 8,
            Self::U16 => 9,
            Self::I32 => 10,
            Self::U32 => 11,
            Self::I64 => 12,
            Self::U64 => 13,
            Self::I128 => 14,
            Self::U128 => 15,
            Self::I256 => 16,
            Self::U256 => 17,
            Self::F32 => 18,
            Self::F64 => 19,
        }
    }

    /// Serializes the type itself, as done when emitting a typespace:
    /// the variant tag, then the variant's payload.
    pub fn encode(&self, bytes: &mut impl BufWriter) {
        bytes.put_u8(self.tag());
        match self {
            Self::Ref(r) => bytes.put_u32(r.0),
            Self::Sum(sum) => sum.encode(bytes),
            Self::Product(prod) => prod.encode(bytes),
            Self::Array(arr) => arr.encode(bytes),
            _ => {}
        }
    }

    /// Decodes a type serialized by [`AlgebraicType::encode`].
    pub fn decode<'de>(bytes: &mut impl BufReader<'de>) -> Result<Self, DecodeError> {
        match bytes.get_u8()? {
            0 => bytes.get_u32().map(|r| Self::Ref(AlgebraicTypeRef(r))),
            1 => SumType::decode(bytes).map(Self::Sum),
            2 => ProductType::decode(bytes).map(Self::Product),
            3 => ArrayType::decode(bytes).map(Self::Array),
            4 => Ok(Self::String),
            5 => Ok(Self::Bool),
            6 => Ok(Self::I8),
            7 => Ok(Self::U8),
            8 => Ok(Self::I16),
            9 => Ok(Self::U16),
            10 => Ok(Self::I32),
            11 => Ok(Self::U32),
            12 => Ok(Self::I64),
            13 => Ok(Self::U64),
            14 => Ok(Self::I128),
            15 => Ok(Self::U128),
            16 => Ok(Self::I256),
            17 => Ok(Self::U256),
            18 => Ok(Self::F32),
            19 => Ok(Self::F64),
            tag => Err(DecodeError::InvalidTypeTag(tag)),
        }
    }

    /// The value of this type under its [meta type](MetaType): a sum value
    /// whose tag is the variant tag and whose payload mirrors the variant.
    ///
    /// Encoding the result is byte-identical to [`AlgebraicType::encode`].
    pub fn as_value(&self) -> AlgebraicValue {
        let payload = match self {
            Self::Ref(r) => AlgebraicValue::U32(r.0),
            Self::Sum(sum) => sum.as_value(),
            Self::Product(prod) => prod.as_value(),
            Self::Array(arr) => arr.elem_ty.as_value(),
            _ => AlgebraicValue::unit(),
        };
        AlgebraicValue::Sum(SumValue::new(self.tag(), payload))
    }
}

impl MetaType for AlgebraicType {
    /// The type of `AlgebraicType` itself.
    ///
    /// Nested occurrences of `AlgebraicType` are expressed as
    /// [`AlgebraicTypeRef::META`], which resolves in a typespace whose slot 0
    /// holds this meta type.
    fn meta_type() -> Self {
        AlgebraicType::sum([
            SumTypeVariant::new_named(AlgebraicTypeRef::meta_type(), "ref"),
            SumTypeVariant::new_named(SumType::meta_type(), "sum"),
            SumTypeVariant::new_named(ProductType::meta_type(), "product"),
            SumTypeVariant::new_named(AlgebraicType::Ref(AlgebraicTypeRef::META), "array"),
            SumTypeVariant::unit("string"),
            SumTypeVariant::unit("bool"),
            SumTypeVariant::unit("i8"),
            SumTypeVariant::unit("u8"),
            SumTypeVariant::unit("i16"),
            SumTypeVariant::unit("u16"),
            SumTypeVariant::unit("i32"),
            SumTypeVariant::unit("u32"),
            SumTypeVariant::unit("i64"),
            SumTypeVariant::unit("u64"),
            SumTypeVariant::unit("i128"),
            SumTypeVariant::unit("u128"),
            SumTypeVariant::unit("i256"),
            SumTypeVariant::unit("u256"),
            SumTypeVariant::unit("f32"),
            SumTypeVariant::unit("f64"),
        ])
    }
}

impl ser::Serialize for AlgebraicType {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        self.encode(writer);
    }
}

impl<'de> crate::de::Deserialize<'de> for AlgebraicType {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
        Self::decode(reader)
    }
}

impl From<SumType> for AlgebraicType {
    fn from(sum: SumType) -> Self {
        Self::Sum(sum)
    }
}

impl From<ProductType> for AlgebraicType {
    fn from(prod: ProductType) -> Self {
        Self::Product(prod)
    }
}

impl From<ArrayType> for AlgebraicType {
    fn from(arr: ArrayType) -> Self {
        Self::Array(arr)
    }
}

impl From<ProductTypeElement> for AlgebraicType {
    fn from(elem: ProductTypeElement) -> Self {
        elem.algebraic_type
    }
}
