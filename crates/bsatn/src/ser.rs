//! The serialization half of the trait framework.
//!
//! [`Serialize`] writes a value's bytes into a [`BufWriter`] according to the
//! layout its `AlgebraicType` dictates. Serialization is infallible: the
//! writer only appends, and every supported value has exactly one encoding.

use ethnum::{i256, u256};

use crate::algebraic_value::{F32, F64};
use crate::buffer::BufWriter;

/// A type which can be written out as BSATN.
///
/// For every value `v`, `serialize` produces the same bytes on every call;
/// the encoding carries no framing and no terminator.
pub trait Serialize {
    fn serialize<W: BufWriter>(&self, writer: &mut W);
}

macro_rules! impl_serialize_primitive {
    ($($prim:ty => $put:ident,)*) => {
        $(impl Serialize for $prim {
            fn serialize<W: BufWriter>(&self, writer: &mut W) {
                writer.$put(*self);
            }
        })*
    };
}

impl_serialize_primitive! {
    bool => put_bool,
    u8 => put_u8,
    u16 => put_u16,
    u32 => put_u32,
    u64 => put_u64,
    u128 => put_u128,
    u256 => put_u256,
    i8 => put_i8,
    i16 => put_i16,
    i32 => put_i32,
    i64 => put_i64,
    i128 => put_i128,
    i256 => put_i256,
    f32 => put_f32,
    f64 => put_f64,
}

impl Serialize for F32 {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        writer.put_f32(self.into_inner());
    }
}

impl Serialize for F64 {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        writer.put_f64(self.into_inner());
    }
}

impl Serialize for str {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        writer.put_str(self);
    }
}

impl Serialize for String {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        writer.put_str(self);
    }
}

/// Arrays serialize as a `u32` element count followed by the elements in
/// order. `[u8]` framed this way is byte-identical to `put_bytes`.
impl<T: Serialize> Serialize for [T] {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        assert!(self.len() <= u32::MAX as usize, "array length exceeds u32::MAX");
        writer.put_u32(self.len() as u32);
        for elem in self {
            elem.serialize(writer);
        }
    }
}

impl<T: Serialize> Serialize for Vec<T> {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        self.as_slice().serialize(writer);
    }
}

/// `some` is tag 0, `none` tag 1. This assignment is what the reference
/// codec writes and must not be reversed.
impl<T: Serialize> Serialize for Option<T> {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        match self {
            Some(val) => {
                writer.put_u8(0);
                val.serialize(writer);
            }
            None => writer.put_u8(1),
        }
    }
}

/// `ok` is tag 0, `err` tag 1.
impl<T: Serialize, E: Serialize> Serialize for Result<T, E> {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        match self {
            Ok(val) => {
                writer.put_u8(0);
                val.serialize(writer);
            }
            Err(err) => {
                writer.put_u8(1);
                err.serialize(writer);
            }
        }
    }
}

/// The unit value is the empty product and contributes no bytes.
impl Serialize for () {
    fn serialize<W: BufWriter>(&self, _writer: &mut W) {}
}

impl<T: Serialize + ?Sized> Serialize for &T {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        (**self).serialize(writer);
    }
}

impl<T: Serialize + ?Sized> Serialize for Box<T> {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        (**self).serialize(writer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_bytes<T: Serialize + ?Sized>(val: &T) -> Vec<u8> {
        let mut buf = Vec::new();
        val.serialize(&mut buf);
        buf
    }

    #[test]
    fn option_tags_are_some_0_none_1() {
        assert_eq!(to_bytes(&Some(42u32)), [0x00, 0x2a, 0, 0, 0]);
        assert_eq!(to_bytes(&None::<u32>), [0x01]);
    }

    #[test]
    fn result_tags_are_ok_0_err_1() {
        let ok: Result<u8, String> = Ok(5);
        let err: Result<u8, String> = Err("no".into());
        assert_eq!(to_bytes(&ok), [0x00, 0x05]);
        assert_eq!(to_bytes(&err), [0x01, 0x02, 0, 0, 0, b'n', b'o']);
    }

    #[test]
    fn strings_are_length_prefixed_utf8() {
        assert_eq!(to_bytes("hi"), [0x02, 0, 0, 0, b'h', b'i']);
        assert_eq!(to_bytes(&String::from("")), [0, 0, 0, 0]);
    }

    #[test]
    fn vec_of_bool_matches_spec_layout() {
        assert_eq!(to_bytes(&vec![true, false, true]), [0x03, 0, 0, 0, 1, 0, 1]);
    }

    #[test]
    fn unit_writes_nothing() {
        assert_eq!(to_bytes(&()), Vec::<u8>::new());
    }

    #[test]
    fn vec_u8_framing_equals_put_bytes() {
        let data = vec![1u8, 2, 3, 4];
        let mut framed = Vec::new();
        framed.put_bytes(&data);
        assert_eq!(to_bytes(&data), framed);
    }
}
