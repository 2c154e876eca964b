use crate::algebraic_value::AlgebraicValue;
use crate::buffer::{BufReader, BufWriter, DecodeError};
use crate::sum_type::SumType;
use crate::typespace::{Typespace, EMPTY_TYPESPACE};

/// A value of a sum type: the active variant's tag plus its payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SumValue {
    /// The index of the active variant in the sum's declared variant order.
    pub tag: u8,
    /// The payload of the active variant.
    pub value: Box<AlgebraicValue>,
}

impl SumValue {
    pub fn new(tag: u8, value: AlgebraicValue) -> Self {
        Self {
            tag,
            value: Box::new(value),
        }
    }

    /// A variant with a unit payload, as in C-style enums.
    pub fn unit_variant(tag: u8) -> Self {
        Self::new(tag, AlgebraicValue::unit())
    }

    /// The sum type this value self-describes as.
    ///
    /// Only the active variant is visible from a value, so variants below
    /// `tag` are padded as unnamed units. The result decodes this value's
    /// bytes; it is not the declared schema.
    pub fn type_of(&self) -> crate::sum_type::SumType {
        use crate::algebraic_type::AlgebraicType;
        use crate::sum_type::{SumType, SumTypeVariant};
        let mut variants = Vec::with_capacity(self.tag as usize + 1);
        variants.extend((0..self.tag).map(|_| SumTypeVariant::new_unnamed(AlgebraicType::unit())));
        variants.push(SumTypeVariant::new_unnamed(self.value.type_of()));
        SumType::new(variants.into())
    }

    /// Writes the variant tag, then the payload.
    pub fn encode(&self, bytes: &mut impl BufWriter) {
        bytes.put_u8(self.tag);
        self.value.encode(bytes);
    }

    /// Decodes a sum value against `ty`, which must contain no refs.
    pub fn decode<'de>(ty: &SumType, bytes: &mut impl BufReader<'de>) -> Result<Self, DecodeError> {
        Self::decode_at(&EMPTY_TYPESPACE, ty, bytes)
    }

    /// A tag at or past the sum's arity is fatal; no default variant is ever
    /// substituted.
    pub(crate) fn decode_at<'de>(
        ts: &Typespace,
        ty: &SumType,
        bytes: &mut impl BufReader<'de>,
    ) -> Result<Self, DecodeError> {
        let tag = bytes.get_u8()?;
        let variant = ty.variants.get(tag as usize).ok_or(DecodeError::InvalidSumTag {
            tag,
            arity: ty.variants.len(),
        })?;
        let value = crate::algebraic_value::decode_at(ts, &variant.algebraic_type, bytes)?;
        Ok(Self::new(tag, value))
    }
}

impl crate::ser::Serialize for SumValue {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        self.encode(writer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebraic_type::AlgebraicType;

    fn two_variant_sum() -> SumType {
        SumType::from([("V0", AlgebraicType::U8), ("V1", AlgebraicType::String)])
    }

    #[test]
    fn tag_then_payload() {
        let mut bytes = Vec::new();
        SumValue::new(1, AlgebraicValue::String("x".into())).encode(&mut bytes);
        assert_eq!(bytes, [0x01, 0x01, 0, 0, 0, b'x']);
    }

    #[test]
    fn decode_dispatches_on_tag() {
        let ty = two_variant_sum();
        let v0 = SumValue::decode(&ty, &mut [0x00, 0x07].as_slice()).unwrap();
        assert_eq!(v0, SumValue::new(0, AlgebraicValue::U8(7)));
        let v1 = SumValue::decode(&ty, &mut [0x01, 0x01, 0, 0, 0, b'x'].as_slice()).unwrap();
        assert_eq!(v1, SumValue::new(1, AlgebraicValue::String("x".into())));
    }

    #[test]
    fn out_of_range_tag_is_fatal() {
        let ty = two_variant_sum();
        assert_eq!(
            SumValue::decode(&ty, &mut [0x02, 0x07].as_slice()),
            Err(DecodeError::InvalidSumTag { tag: 2, arity: 2 })
        );
    }
}
