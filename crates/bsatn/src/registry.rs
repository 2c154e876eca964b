//! The type registry: deduplicated interning of named complex types.
//!
//! The registry is the only long-lived mutable state of the codec. It is
//! built during module description on a single thread, then frozen into a
//! read-only [`Typespace`] with [`TypeRegistry::commit`]. Indices are
//! append-only and monotonic; a registered type's index never changes.
//!
//! Two side indices deduplicate registrations: named user types are keyed by
//! their [`TypeId`] — so two distinct user types with identical structure
//! remain distinct entries, disambiguated client-side by their names — and
//! anonymous composites are keyed by structural equality.

use std::any::TypeId;
use std::collections::HashMap;

use thiserror::Error;

use crate::algebraic_type::AlgebraicType;
use crate::typespace::{AlgebraicTypeRef, Typespace, TypespaceBuilder};

/// The outcome of a [`TypeRegistry::register`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// The type occupies (or already occupied) a typespace slot; reference
    /// it as `AlgebraicType::Ref(_)`.
    Ref(AlgebraicTypeRef),
    /// The type is never interned; inline it at the use site.
    Inline,
}

/// An attempt to intern an inline-only type under a name or type identity.
///
/// Primitives, arrays, options, results, special products and `ScheduleAt`
/// must be inlined at every use site; giving one a typespace slot would
/// change the generated client code downstream. This is a programmer error
/// and surfaces at module-init.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("inline-only type cannot occupy a typespace slot: {ty:?}")]
pub struct RegistryConflict {
    /// The offending type.
    pub ty: AlgebraicType,
}

/// The mutable builder of a [`Typespace`].
#[derive(Default)]
pub struct TypeRegistry {
    types: Vec<AlgebraicType>,
    names: Vec<Option<Box<str>>>,
    by_identity: HashMap<TypeId, AlgebraicTypeRef>,
    by_structure: HashMap<AlgebraicType, AlgebraicTypeRef>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot a user type was interned at, keyed by its [`TypeId`].
    ///
    /// Consulted first on registration so that re-registering the same user
    /// type is idempotent.
    pub fn find_by_type_id(&self, typeid: TypeId) -> Option<AlgebraicTypeRef> {
        self.by_identity.get(&typeid).copied()
    }

    /// The slot an anonymous composite was interned at, keyed by structure.
    ///
    /// Named registrations do not populate this index, so a structural match
    /// never promotes one user type's slot to another.
    pub fn find_by_structure(&self, ty: &AlgebraicType) -> Option<AlgebraicTypeRef> {
        self.by_structure.get(ty).copied()
    }

    /// Interns `ty`, deduplicating against earlier registrations, and
    /// returns where the use site should point.
    ///
    /// Inline-only types are never interned: registered anonymously they
    /// yield [`Registration::Inline`], while attaching a `typeid` or `name`
    /// to one is a [`RegistryConflict`]. A bare `Ref` registers as itself.
    pub fn register(
        &mut self,
        ty: AlgebraicType,
        typeid: Option<TypeId>,
        name: Option<&str>,
    ) -> Result<Registration, RegistryConflict> {
        if let Some(r) = ty.as_ref() {
            return Ok(Registration::Ref(r));
        }
        if ty.is_inline() {
            if typeid.is_some() || name.is_some() {
                return Err(RegistryConflict { ty });
            }
            return Ok(Registration::Inline);
        }

        if let Some(typeid) = typeid {
            if let Some(r) = self.find_by_type_id(typeid) {
                return Ok(Registration::Ref(r));
            }
            let r = self.push(ty, name);
            self.by_identity.insert(typeid, r);
            Ok(Registration::Ref(r))
        } else {
            if let Some(r) = self.find_by_structure(&ty) {
                return Ok(Registration::Ref(r));
            }
            let r = self.push(ty.clone(), name);
            self.by_structure.insert(ty, r);
            Ok(Registration::Ref(r))
        }
    }

    fn push(&mut self, ty: AlgebraicType, name: Option<&str>) -> AlgebraicTypeRef {
        let r = AlgebraicTypeRef(self.types.len() as u32);
        self.types.push(ty);
        self.names.push(name.map(Into::into));
        r
    }

    /// The name a slot was registered under, if any.
    pub fn name(&self, r: AlgebraicTypeRef) -> Option<&str> {
        self.names.get(r.idx()).and_then(|name| name.as_deref())
    }

    pub fn get(&self, r: AlgebraicTypeRef) -> Option<&AlgebraicType> {
        self.types.get(r.idx())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The interned types in index order, for emitting the typespace.
    pub fn iter(&self) -> std::slice::Iter<'_, AlgebraicType> {
        self.types.iter()
    }

    /// Freezes the registry into the read-only [`Typespace`] emitted to the
    /// host.
    pub fn commit(self) -> Typespace {
        Typespace::new(self.types)
    }
}

impl TypespaceBuilder for TypeRegistry {
    fn add(
        &mut self,
        typeid: TypeId,
        name: Option<&'static str>,
        make_ty: impl FnOnce(&mut Self) -> AlgebraicType,
    ) -> AlgebraicType {
        if let Some(r) = self.find_by_type_id(typeid) {
            return AlgebraicType::Ref(r);
        }
        // Reserve the slot before building, so a self-referential type sees
        // its own ref through `find_by_type_id` while `make_ty` runs.
        let slot = self.push(AlgebraicType::unit(), name);
        self.by_identity.insert(typeid, slot);
        let ty = make_ty(self);
        if ty.is_inline() || ty.as_ref().is_some() {
            // Inline types must not go through `add`; this is a bug in the
            // `SpacetimeType` impl and aborts module description.
            panic!("{}", RegistryConflict { ty });
        }
        self.types[slot.idx()] = ty;
        AlgebraicType::Ref(slot)
    }
}
