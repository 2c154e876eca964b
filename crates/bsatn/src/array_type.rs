use crate::algebraic_type::AlgebraicType;
use crate::buffer::{BufReader, BufWriter, DecodeError};

/// The schema of BSATN arrays: a homogeneous sequence of `elem_ty` values,
/// encoded as a `u32` element count followed by the elements.
///
/// Array types are always inlined at the use site and never occupy a
/// typespace slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArrayType {
    /// The element type of the array.
    pub elem_ty: Box<AlgebraicType>,
}

impl ArrayType {
    pub fn new(elem_ty: AlgebraicType) -> Self {
        Self {
            elem_ty: Box::new(elem_ty),
        }
    }

    /// The element type of the array.
    pub fn elem_ty(&self) -> &AlgebraicType {
        &self.elem_ty
    }

    /// Writes the schema: just the element type, the `Array` tag having been
    /// written by [`AlgebraicType::encode`].
    pub fn encode(&self, bytes: &mut impl BufWriter) {
        self.elem_ty.encode(bytes);
    }

    pub fn decode<'de>(bytes: &mut impl BufReader<'de>) -> Result<Self, DecodeError> {
        AlgebraicType::decode(bytes).map(Self::new)
    }
}

impl From<AlgebraicType> for ArrayType {
    fn from(elem_ty: AlgebraicType) -> Self {
        Self::new(elem_ty)
    }
}
