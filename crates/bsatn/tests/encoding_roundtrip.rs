use bsatn::{
    product, AlgebraicType, AlgebraicTypeRef, AlgebraicValue, ArrayValue, CountWriter, DecodeError, MetaType,
    ProductType, ProductTypeElement, ProductValue, Registration, SumType, SumTypeVariant, TypeRegistry, F32,
    F64,
};
use proptest::collection::vec;
use proptest::prelude::*;

#[test]
fn type_to_binary_equivalent() {
    check_type(&AlgebraicType::meta_type());
}

#[track_caller]
fn check_type(ty: &AlgebraicType) {
    let mut through_value = Vec::new();
    ty.as_value().encode(&mut through_value);
    let mut direct = Vec::new();
    ty.encode(&mut direct);
    assert_eq!(direct, through_value);
}

fn map_vec<T, U>(vec: Vec<T>, map: impl Fn(T) -> U) -> Vec<U> {
    vec.into_iter().map(map).collect()
}

fn array_value<T>(vec: Vec<T>) -> AlgebraicValue
where
    ArrayValue: From<Vec<T>>,
{
    AlgebraicValue::Array(vec.into())
}

fn array_values() -> impl Strategy<Value = AlgebraicValue> {
    prop_oneof![
        vec(0u8..10, 0..10).prop_map(array_value),
        vec(0i16..10, 0..10).prop_map(array_value),
        vec(0u16..10, 0..10).prop_map(array_value),
        vec(0i32..10, 0..10).prop_map(array_value),
        vec(0u32..10, 0..10).prop_map(array_value),
        vec(0i64..10, 0..10).prop_map(array_value),
        vec(0u64..10, 0..10).prop_map(array_value),
        vec(0i128..10, 0..10).prop_map(array_value),
        vec(0u128..10, 0..10).prop_map(array_value),
        vec(0..10, 0..10).prop_map(|v| array_value(map_vec(v, |x| x == 0))),
        vec(0i32..10, 0..10).prop_map(|v| array_value(map_vec(v, |x| x.to_string()))),
        vec(0i32..10, 0..10).prop_map(|v| array_value(map_vec(v, |x| F32::from_inner(x as f32)))),
        vec(0i32..10, 0..10).prop_map(|v| array_value(map_vec(v, |x| F64::from_inner(x as f64)))),
    ]
}

fn leaf_values() -> impl Strategy<Value = AlgebraicValue> {
    prop_oneof![
        any::<bool>().prop_map(Into::into),
        any::<i8>().prop_map(Into::into),
        any::<u8>().prop_map(Into::into),
        any::<i16>().prop_map(Into::into),
        any::<u16>().prop_map(Into::into),
        any::<i32>().prop_map(Into::into),
        any::<u32>().prop_map(Into::into),
        any::<i64>().prop_map(Into::into),
        any::<u64>().prop_map(Into::into),
        any::<i128>().prop_map(Into::into),
        any::<u128>().prop_map(Into::into),
        any::<f32>().prop_map(Into::into),
        any::<f64>().prop_map(Into::into),
        "[0-1]+".prop_map(|x| array_value(x.into_bytes())),
        ".*".prop_map(AlgebraicValue::from),
    ]
}

fn algebraic_values() -> impl Strategy<Value = AlgebraicValue> {
    let leaf = leaf_values();
    leaf.prop_recursive(
        8,   // 8 levels deep
        128, // Shoot for maximum size of 128 nodes
        10,  // We put up to 10 items per collection
        |inner| {
            prop_oneof![
                array_values(),
                vec(inner.clone(), 0..1).prop_map(|val| val.first().cloned().into()),
                vec(inner, 0..10).prop_map(AlgebraicValue::product)
            ]
        },
    )
}

fn round_trip(value: AlgebraicValue) -> Result<(ProductValue, ProductValue), DecodeError> {
    let ty = value.type_of();
    let schema = ProductType::from([("x", ty)]);

    let row = product!(value);

    let mut bytes = Vec::new();
    row.encode(&mut bytes);
    ProductValue::decode(&schema, &mut &bytes[..]).map(|x| (x, row))
}

proptest! {
    #[test]
    fn parses_all_builtin_values(enc in leaf_values()) {
        let parsed = round_trip(enc);
        prop_assert!(parsed.is_ok());
        let (parsed, original) = parsed.unwrap();
        prop_assert_eq!(parsed, original);
    }

    #[test]
    fn parses_all_values(enc in algebraic_values()) {
        let parsed = round_trip(enc);
        prop_assert!(parsed.is_ok());
        let (parsed, original) = parsed.unwrap();
        prop_assert_eq!(original, parsed, "Original vs Parsed");
    }

    #[test]
    fn serialization_is_deterministic(enc in algebraic_values()) {
        let mut first = Vec::new();
        enc.encode(&mut first);
        let mut second = Vec::new();
        enc.encode(&mut second);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn count_writer_agrees_with_real_writer(enc in algebraic_values()) {
        let mut bytes = Vec::new();
        enc.encode(&mut bytes);
        let mut counter = CountWriter::new();
        enc.encode(&mut counter);
        prop_assert_eq!(counter.finish(), bytes.len());
    }

    #[test]
    fn types_of_values_are_binary_equivalent(enc in algebraic_values()) {
        check_type(&enc.type_of());
    }
}

fn leaf_types() -> impl Strategy<Value = AlgebraicType> {
    prop_oneof![
        Just(AlgebraicType::Bool),
        Just(AlgebraicType::I8),
        Just(AlgebraicType::U8),
        Just(AlgebraicType::I16),
        Just(AlgebraicType::U16),
        Just(AlgebraicType::I32),
        Just(AlgebraicType::U32),
        Just(AlgebraicType::I64),
        Just(AlgebraicType::U64),
        Just(AlgebraicType::I128),
        Just(AlgebraicType::U128),
        Just(AlgebraicType::I256),
        Just(AlgebraicType::U256),
        Just(AlgebraicType::F32),
        Just(AlgebraicType::F64),
        Just(AlgebraicType::String),
        (0u32..16).prop_map(|r| AlgebraicType::Ref(AlgebraicTypeRef(r))),
    ]
}

prop_compose! {
    fn entry_name()(name in proptest::option::of("[a-z_][a-z0-9_]{0,11}")) -> Option<Box<str>> {
        name.map(Into::into)
    }
}

fn algebraic_types() -> impl Strategy<Value = AlgebraicType> {
    leaf_types().prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            inner.clone().prop_map(AlgebraicType::array),
            inner.clone().prop_map(AlgebraicType::option),
            vec((entry_name(), inner.clone()), 0..6).prop_map(|elems| {
                AlgebraicType::product(
                    elems
                        .into_iter()
                        .map(|(name, ty)| ProductTypeElement::new(ty, name))
                        .collect::<ProductType>(),
                )
            }),
            vec((entry_name(), inner), 1..6).prop_map(|variants| {
                AlgebraicType::sum(
                    variants
                        .into_iter()
                        .map(|(name, ty)| SumTypeVariant::new(ty, name))
                        .collect::<SumType>(),
                )
            }),
        ]
    })
}

proptest! {
    #[test]
    fn types_encode_then_decode_back(ty in algebraic_types()) {
        let mut bytes = Vec::new();
        ty.encode(&mut bytes);
        let decoded = AlgebraicType::decode(&mut bytes.as_slice()).unwrap();
        prop_assert_eq!(decoded, ty);
    }

    #[test]
    fn types_are_binary_equivalent_to_their_meta_value(ty in algebraic_types()) {
        check_type(&ty);
    }

    #[test]
    fn type_encoding_is_deterministic(ty in algebraic_types()) {
        let mut first = Vec::new();
        ty.encode(&mut first);
        let mut second = Vec::new();
        ty.encode(&mut second);
        prop_assert_eq!(first, second);
    }

    /// Registering any type twice anonymously yields the same slot (or the
    /// inline marker twice), and never grows the typespace the second time.
    #[test]
    fn registration_is_idempotent(ty in algebraic_types()) {
        let mut registry = TypeRegistry::new();
        let first = registry.register(ty.clone(), None, None).unwrap();
        let len_after_first = registry.len();
        let second = registry.register(ty.clone(), None, None).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(registry.len(), len_after_first);
        if ty.is_inline() {
            prop_assert_eq!(first, Registration::Inline);
            prop_assert_eq!(registry.len(), 0);
        }
    }
}
