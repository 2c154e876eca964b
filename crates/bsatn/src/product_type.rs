//! Product types: ordered records of (optionally) named fields.
//!
//! Element order defines the wire layout of product values. Field names are
//! schema metadata only — they contribute no bytes to encoded values — but
//! they are load-bearing for special-product recognition: a product whose
//! sole element carries one of the reserved names below *is* an `Identity`,
//! `ConnectionId`, `Timestamp` or `TimeDuration` and is always inlined,
//! never registered.

use crate::algebraic_type::AlgebraicType;
use crate::algebraic_value::AlgebraicValue;
use crate::array_value::ArrayValue;
use crate::buffer::{BufReader, BufWriter, DecodeError};
use crate::de::Deserialize;
use crate::meta_type::MetaType;
use crate::product_value::ProductValue;
use crate::ser::Serialize;
use crate::typespace::AlgebraicTypeRef;

/// The reserved field name marking a one-element product as an `Identity`.
pub const IDENTITY_TAG: &str = "__identity__";
/// The reserved field name marking a one-element product as a `ConnectionId`.
pub const CONNECTION_ID_TAG: &str = "__connection_id__";
/// The reserved field name marking a one-element product as a `Timestamp`.
pub const TIMESTAMP_TAG: &str = "__timestamp_micros_since_unix_epoch__";
/// The reserved field name marking a one-element product as a `TimeDuration`.
pub const TIME_DURATION_TAG: &str = "__time_duration_micros__";

/// Every reserved special-product field name.
///
/// User-defined types must not use these as field names, or the codec will
/// misidentify them as special products.
pub const SPECIAL_TAGS: [&str; 4] = [IDENTITY_TAG, CONNECTION_ID_TAG, TIMESTAMP_TAG, TIME_DURATION_TAG];

/// The schema of a BSATN product: an ordered list of elements.
///
/// A product value encodes as the concatenation of its encoded fields in
/// declared order, with no count and no delimiters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProductType {
    pub elements: Box<[ProductTypeElement]>,
}

/// An element of a [`ProductType`]: an optional name and the field's type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProductTypeElement {
    pub name: Option<Box<str>>,
    pub algebraic_type: AlgebraicType,
}

impl ProductTypeElement {
    pub fn new(algebraic_type: AlgebraicType, name: Option<Box<str>>) -> Self {
        Self { name, algebraic_type }
    }

    pub fn new_named(algebraic_type: AlgebraicType, name: impl Into<Box<str>>) -> Self {
        Self::new(algebraic_type, Some(name.into()))
    }

    pub fn new_unnamed(algebraic_type: AlgebraicType) -> Self {
        Self::new(algebraic_type, None)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether this element carries `name`.
    pub fn has_name(&self, name: &str) -> bool {
        self.name() == Some(name)
    }

    pub fn encode(&self, bytes: &mut impl BufWriter) {
        // The optional name reuses the value-level `Option` encoding,
        // so schema bytes and value bytes share one layout.
        self.name.as_deref().serialize(bytes);
        self.algebraic_type.encode(bytes);
    }

    pub fn decode<'de>(bytes: &mut impl BufReader<'de>) -> Result<Self, DecodeError> {
        let name = Option::<Box<str>>::deserialize(bytes)?;
        let algebraic_type = AlgebraicType::decode(bytes)?;
        Ok(Self { name, algebraic_type })
    }
}

impl From<AlgebraicType> for ProductTypeElement {
    fn from(algebraic_type: AlgebraicType) -> Self {
        Self::new_unnamed(algebraic_type)
    }
}

impl<N: Into<Box<str>>> From<(N, AlgebraicType)> for ProductTypeElement {
    fn from((name, ty): (N, AlgebraicType)) -> Self {
        Self::new_named(ty, name)
    }
}

impl ProductType {
    pub fn new(elements: Box<[ProductTypeElement]>) -> Self {
        Self { elements }
    }

    /// The unit type: a product of no elements, encoding to zero bytes.
    pub fn unit() -> Self {
        Self::new([].into())
    }

    pub fn is_unit(&self) -> bool {
        self.elements.is_empty()
    }

    /// If this is a one-element named product, its field name.
    fn lone_name(&self) -> Option<&str> {
        match &*self.elements {
            [elem] => elem.name(),
            _ => None,
        }
    }

    /// Whether this is the `Identity` special product.
    pub fn is_identity(&self) -> bool {
        self.lone_name() == Some(IDENTITY_TAG)
    }

    /// Whether this is the `ConnectionId` special product.
    pub fn is_connection_id(&self) -> bool {
        self.lone_name() == Some(CONNECTION_ID_TAG)
    }

    /// Whether this is the `Timestamp` special product.
    pub fn is_timestamp(&self) -> bool {
        self.lone_name() == Some(TIMESTAMP_TAG)
    }

    /// Whether this is the `TimeDuration` special product.
    pub fn is_time_duration(&self) -> bool {
        self.lone_name() == Some(TIME_DURATION_TAG)
    }

    /// Whether this product is special: exactly one element, that element is
    /// named, and the name is reserved.
    ///
    /// This check runs whenever a product is about to be registered, so that
    /// special products stay inline in every emitted typespace.
    pub fn is_special(&self) -> bool {
        self.lone_name().is_some_and(|name| SPECIAL_TAGS.contains(&name))
    }

    /// Writes the element count and each element; the `Product` tag byte is
    /// written by [`AlgebraicType::encode`]. Byte-identical in shape to
    /// [`crate::SumType::encode`].
    pub fn encode(&self, bytes: &mut impl BufWriter) {
        bytes.put_u32(self.elements.len() as u32);
        for element in &*self.elements {
            element.encode(bytes);
        }
    }

    pub fn decode<'de>(bytes: &mut impl BufReader<'de>) -> Result<Self, DecodeError> {
        let len = crate::de::read_len(bytes)?;
        let mut elements = Vec::with_capacity(len.min(bytes.remaining()));
        for _ in 0..len {
            elements.push(ProductTypeElement::decode(bytes)?);
        }
        Ok(Self::new(elements.into()))
    }

    /// The meta-value form of this type, encoding byte-identically to
    /// [`ProductType::encode`] prefixed with the `Product` tag.
    pub fn as_value(&self) -> AlgebraicValue {
        let elements: Vec<ProductValue> = self.elements.iter().map(ProductTypeElement::as_value_inner).collect();
        AlgebraicValue::product([AlgebraicValue::Array(ArrayValue::Product(elements.into()))])
    }
}

impl ProductTypeElement {
    fn as_value_inner(&self) -> ProductValue {
        ProductValue::new(
            [
                crate::sum_type::name_as_value(self.name()),
                self.algebraic_type.as_value(),
            ]
            .into(),
        )
    }

    /// The meta-value form of this element.
    pub fn as_value(&self) -> AlgebraicValue {
        AlgebraicValue::Product(self.as_value_inner())
    }
}

impl MetaType for ProductType {
    fn meta_type() -> AlgebraicType {
        AlgebraicType::product([("elements", AlgebraicType::array(ProductTypeElement::meta_type()))])
    }
}

impl MetaType for ProductTypeElement {
    fn meta_type() -> AlgebraicType {
        AlgebraicType::product([
            ("name", AlgebraicType::option(AlgebraicType::String)),
            ("algebraic_type", AlgebraicType::Ref(AlgebraicTypeRef::META)),
        ])
    }
}

impl<E: Into<ProductTypeElement>> FromIterator<E> for ProductType {
    fn from_iter<T: IntoIterator<Item = E>>(iter: T) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

impl<E: Into<ProductTypeElement>, const N: usize> From<[E; N]> for ProductType {
    fn from(elements: [E; N]) -> Self {
        elements.into_iter().collect()
    }
}
