//! The typespace: an ordered, frozen collection of interned types.
//!
//! A typespace is built once during module description (through
//! [`crate::TypeRegistry`]), frozen, serialized to the host, and consulted
//! read-only for the process lifetime. [`AlgebraicType::Ref`] indices address
//! the containing typespace only; cross-typespace references are undefined.

use std::any::TypeId;
use std::fmt;

use crate::algebraic_type::AlgebraicType;
use crate::buffer::{BufReader, BufWriter, DecodeError};
use crate::meta_type::MetaType;

/// A stable index into a [`Typespace`], standing in for an `AlgebraicType`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlgebraicTypeRef(pub u32);

impl AlgebraicTypeRef {
    /// The ref to slot 0, which by convention holds
    /// [`AlgebraicType::meta_type`](MetaType) in the meta typespace.
    pub const META: Self = Self(0);

    /// The index as a `usize`.
    pub const fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AlgebraicTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Display refs as `&42`, the notation used in generated schemas.
        write!(f, "&{}", self.0)
    }
}

impl MetaType for AlgebraicTypeRef {
    fn meta_type() -> AlgebraicType {
        AlgebraicType::U32
    }
}

/// An ordered list of [`AlgebraicType`]s with stable indices.
///
/// Once constructed, a typespace never changes: indices are append-only at
/// build time and a registered type's index never moves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Typespace {
    types: Vec<AlgebraicType>,
}

/// The empty typespace, for resolving types that contain no refs.
pub(crate) static EMPTY_TYPESPACE: Typespace = Typespace::new(Vec::new());

impl Typespace {
    pub const fn new(types: Vec<AlgebraicType>) -> Self {
        Self { types }
    }

    pub fn get(&self, r: AlgebraicTypeRef) -> Option<&AlgebraicType> {
        self.types.get(r.idx())
    }

    /// Resolves `r`, failing with [`DecodeError::InvalidTypeRef`] when it is
    /// out of range.
    pub fn resolve(&self, r: AlgebraicTypeRef) -> Result<&AlgebraicType, DecodeError> {
        self.get(r).ok_or(DecodeError::InvalidTypeRef(r.0))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AlgebraicType> {
        self.types.iter()
    }

    pub fn types(&self) -> &[AlgebraicType] {
        &self.types
    }

    /// Pairs `ty` with this typespace for ref resolution.
    pub fn with_type<'a, T: ?Sized>(&'a self, ty: &'a T) -> WithTypespace<'a, T> {
        WithTypespace::new(self, ty)
    }

    /// Serializes the typespace as emitted at module-description time:
    /// a `u32` type count, then each type in index order.
    pub fn encode(&self, bytes: &mut impl BufWriter) {
        bytes.put_u32(self.types.len() as u32);
        for ty in &self.types {
            ty.encode(bytes);
        }
    }

    pub fn decode<'de>(bytes: &mut impl BufReader<'de>) -> Result<Self, DecodeError> {
        let len = crate::de::read_len(bytes)?;
        let mut types = Vec::with_capacity(len.min(bytes.remaining()));
        for _ in 0..len {
            types.push(AlgebraicType::decode(bytes)?);
        }
        Ok(Self::new(types))
    }
}

impl<'a> IntoIterator for &'a Typespace {
    type Item = &'a AlgebraicType;
    type IntoIter = std::slice::Iter<'a, AlgebraicType>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A `T` interpreted in the context of the [`Typespace`] that defines the
/// refs it contains.
pub struct WithTypespace<'a, T: ?Sized> {
    typespace: &'a Typespace,
    ty: &'a T,
}

impl<T: ?Sized> Copy for WithTypespace<'_, T> {}
impl<T: ?Sized> Clone for WithTypespace<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T: ?Sized> WithTypespace<'a, T> {
    pub const fn new(typespace: &'a Typespace, ty: &'a T) -> Self {
        Self { typespace, ty }
    }

    pub const fn typespace(&self) -> &'a Typespace {
        self.typespace
    }

    pub const fn ty(&self) -> &'a T {
        self.ty
    }

    /// Carries the typespace over to `ty`.
    pub fn with<'b, U: ?Sized>(&self, ty: &'b U) -> WithTypespace<'b, U>
    where
        'a: 'b,
    {
        WithTypespace::new(self.typespace, ty)
    }

    /// Resolves `r` in the typespace, keeping the context.
    pub fn resolve(&self, r: AlgebraicTypeRef) -> Result<WithTypespace<'a, AlgebraicType>, DecodeError> {
        self.typespace.resolve(r).map(|ty| WithTypespace::new(self.typespace, ty))
    }
}

/// A sink for the types a [`crate::SpacetimeType`] impl defines.
///
/// `add` interns the type built by `make_ty` under `typeid`, reserving the
/// slot before invoking the closure so self-referential types can mention
/// their own ref, and returns the `AlgebraicType` to use at the use site —
/// a `Ref` for interned types. Inline types never call `add`.
pub trait TypespaceBuilder {
    fn add(
        &mut self,
        typeid: TypeId,
        name: Option<&'static str>,
        make_ty: impl FnOnce(&mut Self) -> AlgebraicType,
    ) -> AlgebraicType;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::DecodeError;

    fn sample() -> Typespace {
        Typespace::new(vec![
            AlgebraicType::product([("x", AlgebraicType::I32), ("y", AlgebraicType::I32)]),
            AlgebraicType::sum([("a", AlgebraicType::Ref(AlgebraicTypeRef(0)))]),
        ])
    }

    #[test]
    fn get_and_resolve() {
        let ts = sample();
        assert_eq!(ts.len(), 2);
        assert!(ts.get(AlgebraicTypeRef(1)).is_some());
        assert_eq!(ts.resolve(AlgebraicTypeRef(2)), Err(DecodeError::InvalidTypeRef(2)));
    }

    #[test]
    fn encode_layout_is_count_then_types() {
        let ts = Typespace::new(vec![AlgebraicType::U8, AlgebraicType::String]);
        let mut bytes = Vec::new();
        ts.encode(&mut bytes);
        assert_eq!(bytes, [2, 0, 0, 0, 7, 4]);
    }

    #[test]
    fn encode_decode_round_trip() {
        let ts = sample();
        let mut bytes = Vec::new();
        ts.encode(&mut bytes);
        let decoded = Typespace::decode(&mut bytes.as_slice()).unwrap();
        assert_eq!(decoded, ts);
    }

    #[test]
    fn ref_displays_with_ampersand() {
        assert_eq!(AlgebraicTypeRef(7).to_string(), "&7");
    }

    #[test]
    fn with_typespace_resolves_refs_in_context() {
        let ts = sample();
        let ty = AlgebraicType::Ref(AlgebraicTypeRef(0));
        let resolved = ts.with_type(&ty).resolve(AlgebraicTypeRef(0)).unwrap();
        assert!(resolved.ty().as_product().is_some());
        assert!(std::ptr::eq(resolved.typespace(), &ts));
        assert!(ts.with_type(&ty).resolve(AlgebraicTypeRef(9)).is_err());
    }
}
