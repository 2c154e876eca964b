//! The deserialization half of the trait framework.
//!
//! [`Deserialize`] reads bytes according to the layout a type's
//! `AlgebraicType` dictates and constructs the value, or fails with a
//! [`DecodeError`]. Deserializers never substitute defaults: an out-of-range
//! tag, invalid bool, invalid UTF-8 or short buffer is fatal to the current
//! decode and surfaces to the caller.

use ethnum::{i256, u256};

use crate::algebraic_value::{F32, F64};
use crate::buffer::{BufReader, DecodeError};

/// A type which can be decoded from BSATN.
///
/// The `'de` lifetime is that of the input buffer; types like `&'de str`
/// deserialize zero-copy by borrowing from it.
pub trait Deserialize<'de>: Sized {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError>;
}

/// A type which can be decoded from BSATN without borrowing from the input.
pub trait DeserializeOwned: for<'de> Deserialize<'de> {}
impl<T: for<'de> Deserialize<'de>> DeserializeOwned for T {}

/// Reads a `u32` count or length prefix.
pub(crate) fn read_len<'de>(reader: &mut impl BufReader<'de>) -> Result<usize, DecodeError> {
    reader.get_u32().map(|len| len as usize)
}

/// Reads a `u32`-length-prefixed slice out of `reader`.
pub(crate) fn read_len_prefixed<'de, R: BufReader<'de>>(reader: &mut R) -> Result<&'de [u8], DecodeError> {
    let len = read_len(reader)?;
    reader.get_slice(len)
}

/// Reads a `u32`-length-prefixed UTF-8 string slice.
pub(crate) fn read_str<'de, R: BufReader<'de>>(reader: &mut R) -> Result<&'de str, DecodeError> {
    Ok(std::str::from_utf8(read_len_prefixed(reader)?)?)
}

macro_rules! impl_deserialize_primitive {
    ($($prim:ty => $get:ident,)*) => {
        $(impl<'de> Deserialize<'de> for $prim {
            fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
                reader.$get()
            }
        })*
    };
}

impl_deserialize_primitive! {
    u8 => get_u8,
    u16 => get_u16,
    u32 => get_u32,
    u64 => get_u64,
    u128 => get_u128,
    u256 => get_u256,
    i8 => get_i8,
    i16 => get_i16,
    i32 => get_i32,
    i64 => get_i64,
    i128 => get_i128,
    i256 => get_i256,
    f32 => get_f32,
    f64 => get_f64,
}

impl<'de> Deserialize<'de> for bool {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
        match reader.get_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(DecodeError::InvalidBool(byte)),
        }
    }
}

impl<'de> Deserialize<'de> for F32 {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
        reader.get_f32().map(F32::from_inner)
    }
}

impl<'de> Deserialize<'de> for F64 {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
        reader.get_f64().map(F64::from_inner)
    }
}

impl<'de> Deserialize<'de> for &'de str {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
        read_str(reader)
    }
}

impl<'de> Deserialize<'de> for String {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
        read_str(reader).map(str::to_owned)
    }
}

impl<'de> Deserialize<'de> for Box<str> {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
        read_str(reader).map(Box::from)
    }
}

impl<'de> Deserialize<'de> for &'de [u8] {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
        read_len_prefixed(reader)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Vec<T> {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
        let len = read_len(reader)?;
        // A corrupt length prefix could claim billions of elements; cap the
        // up-front reservation at what the input could possibly hold.
        let mut elems = Vec::with_capacity(len.min(reader.remaining()));
        for _ in 0..len {
            elems.push(T::deserialize(reader)?);
        }
        Ok(elems)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Box<[T]> {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
        Vec::deserialize(reader).map(Vec::into_boxed_slice)
    }
}

/// Option decodes tag 0 as `some` and tag 1 as `none`, matching what the
/// codec writes; any other tag is [`DecodeError::InvalidOptionTag`].
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Option<T> {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
        match reader.get_u8()? {
            0 => T::deserialize(reader).map(Some),
            1 => Ok(None),
            tag => Err(DecodeError::InvalidOptionTag(tag)),
        }
    }
}

impl<'de, T: Deserialize<'de>, E: Deserialize<'de>> Deserialize<'de> for Result<T, E> {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
        match reader.get_u8()? {
            0 => T::deserialize(reader).map(Ok),
            1 => E::deserialize(reader).map(Err),
            tag => Err(DecodeError::InvalidSumTag { tag, arity: 2 }),
        }
    }
}

impl<'de> Deserialize<'de> for () {
    fn deserialize<R: BufReader<'de>>(_reader: &mut R) -> Result<Self, DecodeError> {
        Ok(())
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Box<T> {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
        T::deserialize(reader).map(Box::new)
    }
}
