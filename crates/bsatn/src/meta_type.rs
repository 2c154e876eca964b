//! Meta types: the schemas of the schema types themselves.
//!
//! The typespace emitted at module-description time is a sequence of
//! serialized `AlgebraicType`s, so the schema types are values of the wire
//! format in their own right. `MetaType` names the `AlgebraicType` a schema
//! type serializes under, and the `as_value` conversions on the schema types
//! produce `AlgebraicValue`s that encode byte-identically to the types'
//! direct `encode` methods.

use crate::algebraic_type::AlgebraicType;

/// A type that knows the [`AlgebraicType`] describing its own BSATN
/// encoding.
pub trait MetaType {
    /// The type of `Self` in the wire format.
    fn meta_type() -> AlgebraicType;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product_type::{ProductType, ProductTypeElement};
    use crate::sum_type::{SumType, SumTypeVariant};
    use crate::typespace::AlgebraicTypeRef;

    fn encoded(ty: &AlgebraicType) -> Vec<u8> {
        let mut direct = Vec::new();
        ty.encode(&mut direct);
        direct
    }

    fn encoded_via_value(ty: &AlgebraicType) -> Vec<u8> {
        let mut through_value = Vec::new();
        ty.as_value().encode(&mut through_value);
        through_value
    }

    #[track_caller]
    fn check_type(ty: &AlgebraicType) {
        assert_eq!(encoded(ty), encoded_via_value(ty));
    }

    #[test]
    fn meta_type_binary_equivalent_to_value_form() {
        check_type(&AlgebraicType::meta_type());
        check_type(&SumType::meta_type());
        check_type(&ProductType::meta_type());
        check_type(&SumTypeVariant::meta_type());
        check_type(&ProductTypeElement::meta_type());
        check_type(&AlgebraicTypeRef::meta_type());
    }

    #[test]
    fn value_form_of_everyday_types_is_binary_equivalent() {
        check_type(&AlgebraicType::identity());
        check_type(&AlgebraicType::timestamp());
        check_type(&AlgebraicType::schedule_at());
        check_type(&AlgebraicType::option(AlgebraicType::array(AlgebraicType::String)));
        check_type(&AlgebraicType::product([
            ("pos", AlgebraicType::product([("x", AlgebraicType::F32), ("y", AlgebraicType::F32)])),
            ("name", AlgebraicType::option(AlgebraicType::String)),
            ("tags", AlgebraicType::array(AlgebraicType::Ref(AlgebraicTypeRef(3)))),
        ]));
    }
}
