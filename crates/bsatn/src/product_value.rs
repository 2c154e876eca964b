use crate::algebraic_value::AlgebraicValue;
use crate::buffer::{BufReader, BufWriter, DecodeError};
use crate::product_type::ProductType;
use crate::typespace::{Typespace, EMPTY_TYPESPACE};

/// A value of a product type: the field values in declared order.
///
/// Products carry no count and no delimiters on the wire; the schema alone
/// determines where one field ends and the next begins.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct ProductValue {
    pub elements: Box<[AlgebraicValue]>,
}

/// Constructs a [`ProductValue`] from its field values.
///
/// ```
/// use bsatn::product;
/// let row = product![1u8, "hi"];
/// assert_eq!(row.elements.len(), 2);
/// ```
#[macro_export]
macro_rules! product {
    [$($elems:expr),* $(,)?] => {
        $crate::ProductValue {
            elements: Box::from([$($crate::AlgebraicValue::from($elems)),*]),
        }
    };
}

impl ProductValue {
    pub fn new(elements: Box<[AlgebraicValue]>) -> Self {
        Self { elements }
    }

    /// The unit value: no fields, no bytes.
    pub fn unit() -> Self {
        Self::default()
    }

    pub fn get_field(&self, index: usize) -> Option<&AlgebraicValue> {
        self.elements.get(index)
    }

    /// The product type this value self-describes as: the field types in
    /// order, unnamed.
    pub fn type_of(&self) -> ProductType {
        self.elements
            .iter()
            .map(|element| crate::product_type::ProductTypeElement::new_unnamed(element.type_of()))
            .collect()
    }

    /// Writes the fields in declared order, nothing else.
    pub fn encode(&self, bytes: &mut impl BufWriter) {
        for element in &*self.elements {
            element.encode(bytes);
        }
    }

    /// Decodes a product value against `ty`, which must contain no refs.
    pub fn decode<'de>(ty: &ProductType, bytes: &mut impl BufReader<'de>) -> Result<Self, DecodeError> {
        Self::decode_at(&EMPTY_TYPESPACE, ty, bytes)
    }

    pub(crate) fn decode_at<'de>(
        ts: &Typespace,
        ty: &ProductType,
        bytes: &mut impl BufReader<'de>,
    ) -> Result<Self, DecodeError> {
        let mut elements = Vec::with_capacity(ty.elements.len());
        for elem_ty in &*ty.elements {
            elements.push(crate::algebraic_value::decode_at(ts, &elem_ty.algebraic_type, bytes)?);
        }
        Ok(Self::new(elements.into()))
    }
}

impl crate::ser::Serialize for ProductValue {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        self.encode(writer);
    }
}

impl FromIterator<AlgebraicValue> for ProductValue {
    fn from_iter<T: IntoIterator<Item = AlgebraicValue>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl From<Vec<AlgebraicValue>> for ProductValue {
    fn from(elements: Vec<AlgebraicValue>) -> Self {
        Self::new(elements.into())
    }
}

impl<const N: usize> From<[AlgebraicValue; N]> for ProductValue {
    fn from(elements: [AlgebraicValue; N]) -> Self {
        Self::new(elements.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebraic_type::AlgebraicType;

    #[test]
    fn fields_are_concatenated() {
        let row = product![1u8, 0x0203u16, "hi"];
        let mut bytes = Vec::new();
        row.encode(&mut bytes);
        assert_eq!(bytes, [0x01, 0x03, 0x02, 0x02, 0, 0, 0, b'h', b'i']);
    }

    #[test]
    fn decode_reads_fields_in_order() {
        let ty = ProductType::from([
            ("a", AlgebraicType::U8),
            ("b", AlgebraicType::U16),
            ("c", AlgebraicType::String),
        ]);
        let bytes = [0x01, 0x03, 0x02, 0x02, 0, 0, 0, b'h', b'i'];
        let row = ProductValue::decode(&ty, &mut bytes.as_slice()).unwrap();
        assert_eq!(row, product![1u8, 0x0203u16, "hi"]);
    }

    #[test]
    fn unit_decodes_from_nothing() {
        let row = ProductValue::decode(&ProductType::unit(), &mut [].as_slice()).unwrap();
        assert_eq!(row, ProductValue::unit());
    }

    #[test]
    fn field_permutation_changes_bytes() {
        let ab = product![1u8, 0x0203u16];
        let ba = product![0x0203u16, 1u8];
        let mut b_ab = Vec::new();
        let mut b_ba = Vec::new();
        ab.encode(&mut b_ab);
        ba.encode(&mut b_ba);
        assert_ne!(b_ab, b_ba);
    }
}
