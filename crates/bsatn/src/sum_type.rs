//! Sum types: discriminated unions.
//!
//! Variant order defines tag assignment: a sum value encodes as a `u8`
//! variant tag followed by that variant's payload. Reordering variants
//! changes the wire format, so the `some`/`none`, `ok`/`err` and
//! `Interval`/`Time` orders below are fixed by the protocol.

use crate::algebraic_type::AlgebraicType;
use crate::algebraic_value::AlgebraicValue;
use crate::array_value::ArrayValue;
use crate::buffer::{BufReader, BufWriter, DecodeError};
use crate::de::Deserialize;
use crate::meta_type::MetaType;
use crate::product_value::ProductValue;
use crate::ser::Serialize;
use crate::typespace::AlgebraicTypeRef;

/// The reserved name of the payload-carrying option variant, tag 0.
///
/// This tag assignment is what the codec writes; peers must match it exactly
/// and not reverse it silently.
pub const OPTION_SOME_TAG: &str = "some";
/// The reserved name of the empty option variant, tag 1.
pub const OPTION_NONE_TAG: &str = "none";
/// The reserved name of the success variant of `Result`, tag 0.
pub const RESULT_OK_TAG: &str = "ok";
/// The reserved name of the failure variant of `Result`, tag 1.
pub const RESULT_ERR_TAG: &str = "err";
/// The name of the repeating variant of `ScheduleAt`, tag 0.
pub const SCHEDULE_AT_INTERVAL_TAG: &str = "Interval";
/// The name of the one-shot variant of `ScheduleAt`, tag 1.
pub const SCHEDULE_AT_TIME_TAG: &str = "Time";

/// The schema of a BSATN sum: an ordered list of variants.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SumType {
    pub variants: Box<[SumTypeVariant]>,
}

/// A variant of a [`SumType`]: an optional name and the payload type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SumTypeVariant {
    pub name: Option<Box<str>>,
    pub algebraic_type: AlgebraicType,
}

impl SumTypeVariant {
    pub fn new(algebraic_type: AlgebraicType, name: Option<Box<str>>) -> Self {
        Self { name, algebraic_type }
    }

    pub fn new_named(algebraic_type: AlgebraicType, name: impl Into<Box<str>>) -> Self {
        Self::new(algebraic_type, Some(name.into()))
    }

    pub fn new_unnamed(algebraic_type: AlgebraicType) -> Self {
        Self::new(algebraic_type, None)
    }

    /// A named variant with no payload, as used by C-style enums.
    pub fn unit(name: impl Into<Box<str>>) -> Self {
        Self::new_named(AlgebraicType::unit(), name)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether this variant carries `name` and a unit payload.
    fn is_unit_named(&self, name: &str) -> bool {
        self.name() == Some(name) && self.algebraic_type.is_unit()
    }

    pub fn encode(&self, bytes: &mut impl BufWriter) {
        self.name.as_deref().serialize(bytes);
        self.algebraic_type.encode(bytes);
    }

    pub fn decode<'de>(bytes: &mut impl BufReader<'de>) -> Result<Self, DecodeError> {
        let name = Option::<Box<str>>::deserialize(bytes)?;
        let algebraic_type = AlgebraicType::decode(bytes)?;
        Ok(Self { name, algebraic_type })
    }
}

impl From<AlgebraicType> for SumTypeVariant {
    fn from(algebraic_type: AlgebraicType) -> Self {
        Self::new_unnamed(algebraic_type)
    }
}

impl<N: Into<Box<str>>> From<(N, AlgebraicType)> for SumTypeVariant {
    fn from((name, ty): (N, AlgebraicType)) -> Self {
        Self::new_named(ty, name)
    }
}

impl SumType {
    pub fn new(variants: Box<[SumTypeVariant]>) -> Self {
        Self { variants }
    }

    /// The sum shape of `Option<T>`: `some(some_ty)` at tag 0, `none` (unit
    /// payload) at tag 1.
    pub fn option(some_ty: AlgebraicType) -> Self {
        Self::new(
            [
                SumTypeVariant::new_named(some_ty, OPTION_SOME_TAG),
                SumTypeVariant::unit(OPTION_NONE_TAG),
            ]
            .into(),
        )
    }

    /// The sum shape of `Result<T, E>`: `ok(ok_ty)` at tag 0, `err(err_ty)`
    /// at tag 1.
    pub fn result(ok_ty: AlgebraicType, err_ty: AlgebraicType) -> Self {
        Self::new(
            [
                SumTypeVariant::new_named(ok_ty, RESULT_OK_TAG),
                SumTypeVariant::new_named(err_ty, RESULT_ERR_TAG),
            ]
            .into(),
        )
    }

    /// The sum shape of `ScheduleAt`: `Interval(TimeDuration)` at tag 0,
    /// `Time(Timestamp)` at tag 1. Like its payloads, this sum is never
    /// registered.
    pub fn schedule_at() -> Self {
        Self::new(
            [
                SumTypeVariant::new_named(AlgebraicType::time_duration(), SCHEDULE_AT_INTERVAL_TAG),
                SumTypeVariant::new_named(AlgebraicType::timestamp(), SCHEDULE_AT_TIME_TAG),
            ]
            .into(),
        )
    }

    /// If this is the option sum, the payload type of its `some` variant.
    pub fn as_option(&self) -> Option<&AlgebraicType> {
        match &*self.variants {
            [some, none]
                if some.name() == Some(OPTION_SOME_TAG) && none.is_unit_named(OPTION_NONE_TAG) =>
            {
                Some(&some.algebraic_type)
            }
            _ => None,
        }
    }

    pub fn is_option(&self) -> bool {
        self.as_option().is_some()
    }

    /// If this is the result sum, the payload types of `ok` and `err`.
    pub fn as_result(&self) -> Option<(&AlgebraicType, &AlgebraicType)> {
        match &*self.variants {
            [ok, err] if ok.name() == Some(RESULT_OK_TAG) && err.name() == Some(RESULT_ERR_TAG) => {
                Some((&ok.algebraic_type, &err.algebraic_type))
            }
            _ => None,
        }
    }

    pub fn is_result(&self) -> bool {
        self.as_result().is_some()
    }

    /// Whether this is the `ScheduleAt` sum.
    pub fn is_schedule_at(&self) -> bool {
        match &*self.variants {
            [interval, time] => {
                interval.name() == Some(SCHEDULE_AT_INTERVAL_TAG)
                    && interval.algebraic_type.is_time_duration()
                    && time.name() == Some(SCHEDULE_AT_TIME_TAG)
                    && time.algebraic_type.is_timestamp()
            }
            _ => false,
        }
    }

    /// Writes the variant count and each variant; the `Sum` tag byte is
    /// written by [`AlgebraicType::encode`]. Deliberately byte-identical in
    /// shape to [`crate::ProductType::encode`] so both share the entry
    /// encoding of their variants/elements.
    pub fn encode(&self, bytes: &mut impl BufWriter) {
        bytes.put_u32(self.variants.len() as u32);
        for variant in &*self.variants {
            variant.encode(bytes);
        }
    }

    pub fn decode<'de>(bytes: &mut impl BufReader<'de>) -> Result<Self, DecodeError> {
        let len = crate::de::read_len(bytes)?;
        let mut variants = Vec::with_capacity(len.min(bytes.remaining()));
        for _ in 0..len {
            variants.push(SumTypeVariant::decode(bytes)?);
        }
        Ok(Self::new(variants.into()))
    }

    /// The meta-value form of this type, encoding byte-identically to
    /// [`SumType::encode`] prefixed with the `Sum` tag.
    pub fn as_value(&self) -> AlgebraicValue {
        let variants: Vec<ProductValue> = self.variants.iter().map(SumTypeVariant::as_value_inner).collect();
        AlgebraicValue::product([AlgebraicValue::Array(ArrayValue::Product(variants.into()))])
    }
}

/// The meta-value of an optional entry name: `some(name)` or `none`.
pub(crate) fn name_as_value(name: Option<&str>) -> AlgebraicValue {
    match name {
        Some(name) => AlgebraicValue::option_some(AlgebraicValue::String(name.into())),
        None => AlgebraicValue::option_none(),
    }
}

impl SumTypeVariant {
    fn as_value_inner(&self) -> ProductValue {
        ProductValue::new([name_as_value(self.name()), self.algebraic_type.as_value()].into())
    }

    /// The meta-value form of this variant.
    pub fn as_value(&self) -> AlgebraicValue {
        AlgebraicValue::Product(self.as_value_inner())
    }
}

impl MetaType for SumType {
    fn meta_type() -> AlgebraicType {
        AlgebraicType::product([("variants", AlgebraicType::array(SumTypeVariant::meta_type()))])
    }
}

impl MetaType for SumTypeVariant {
    fn meta_type() -> AlgebraicType {
        AlgebraicType::product([
            ("name", AlgebraicType::option(AlgebraicType::String)),
            ("algebraic_type", AlgebraicType::Ref(AlgebraicTypeRef::META)),
        ])
    }
}

impl<V: Into<SumTypeVariant>> FromIterator<V> for SumType {
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<SumTypeVariant>, const N: usize> From<[V; N]> for SumType {
    fn from(variants: [V; N]) -> Self {
        variants.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_shape_is_recognized() {
        let opt = SumType::option(AlgebraicType::U32);
        assert_eq!(opt.as_option(), Some(&AlgebraicType::U32));
        assert_eq!(opt.variants[0].name(), Some("some"));
        assert_eq!(opt.variants[1].name(), Some("none"));
    }

    #[test]
    fn reversed_variants_are_not_an_option() {
        let reversed = SumType::from([
            SumTypeVariant::unit(OPTION_NONE_TAG),
            SumTypeVariant::new_named(AlgebraicType::U32, OPTION_SOME_TAG),
        ]);
        assert!(!reversed.is_option());
    }

    #[test]
    fn none_variant_must_be_unit() {
        let bogus = SumType::from([
            (OPTION_SOME_TAG, AlgebraicType::U32),
            (OPTION_NONE_TAG, AlgebraicType::U8),
        ]);
        assert!(!bogus.is_option());
    }

    #[test]
    fn schedule_at_shape_is_recognized() {
        assert!(SumType::schedule_at().is_schedule_at());
        assert!(!SumType::option(AlgebraicType::U32).is_schedule_at());
    }
}
