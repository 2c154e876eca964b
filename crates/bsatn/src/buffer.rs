//! Little-endian byte sinks and sources for the BSATN wire format.
//!
//! [`BufWriter`] is an append-only sink and [`BufReader`] a cursor over an
//! immutable slice. Neither performs I/O; both operate on in-memory buffers
//! handed in by the caller. Multi-byte values are decomposed arithmetically
//! via `to_le_bytes`/`from_le_bytes`, so the encoding is little-endian on
//! every host.

use std::cell::Cell;
use std::str::Utf8Error;

use ethnum::{i256, u256};
use thiserror::Error;

/// An error that occurred while decoding BSATN.
///
/// The codec never swallows these; a failed decode is fatal to the value
/// being decoded and the error is surfaced to the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A fixed-width read ran past the end of the input.
    #[error("not enough bytes left in the buffer: expected {expected}, given {given}")]
    ShortBuffer { expected: usize, given: usize },
    /// A `u32` length prefix promised more bytes than the input holds.
    #[error("length prefix {length} exceeds the {remaining} bytes remaining")]
    LengthOverflow { length: usize, remaining: usize },
    /// A bool byte outside `{0, 1}`.
    #[error("byte {0:#04x} is not a valid bool")]
    InvalidBool(u8),
    /// String contents that are not valid UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
    /// A sum value carried a variant tag at or past the sum's arity.
    #[error("sum tag {tag} out of range for a sum with {arity} variants")]
    InvalidSumTag { tag: u8, arity: usize },
    /// An option value carried a tag other than `some` (0) or `none` (1).
    #[error("option tag {0} is neither `some` (0) nor `none` (1)")]
    InvalidOptionTag(u8),
    /// Input was left over after a decode that should have consumed it all.
    #[error("decode finished with {remaining} trailing bytes")]
    TrailingBytes { remaining: usize },
    /// An `AlgebraicType` tag byte outside the defined range.
    #[error("byte {0} is not a valid `AlgebraicType` tag")]
    InvalidTypeTag(u8),
    /// A type ref that the typespace in scope does not define.
    #[error("type ref &{0} is not defined in this typespace")]
    InvalidTypeRef(u32),
}

impl From<Utf8Error> for DecodeError {
    fn from(_: Utf8Error) -> Self {
        DecodeError::InvalidUtf8
    }
}

/// An append-only sink for BSATN bytes.
///
/// All operations are infallible barring OOM. Writers own their output until
/// the caller takes it; taking the buffer must not leave the writer aliasing
/// the old allocation.
pub trait BufWriter {
    /// Appends `slice` verbatim, without a length prefix.
    ///
    /// Only higher layers that have already written their own framing should
    /// call this with variable-length data.
    fn put_slice(&mut self, slice: &[u8]);

    fn put_u8(&mut self, val: u8) {
        self.put_slice(&[val]);
    }
    fn put_u16(&mut self, val: u16) {
        self.put_slice(&val.to_le_bytes());
    }
    fn put_u32(&mut self, val: u32) {
        self.put_slice(&val.to_le_bytes());
    }
    fn put_u64(&mut self, val: u64) {
        self.put_slice(&val.to_le_bytes());
    }
    fn put_u128(&mut self, val: u128) {
        self.put_slice(&val.to_le_bytes());
    }
    fn put_u256(&mut self, val: u256) {
        self.put_slice(&val.to_le_bytes());
    }
    fn put_i8(&mut self, val: i8) {
        self.put_u8(val as u8);
    }
    fn put_i16(&mut self, val: i16) {
        self.put_u16(val as u16);
    }
    fn put_i32(&mut self, val: i32) {
        self.put_u32(val as u32);
    }
    fn put_i64(&mut self, val: i64) {
        self.put_u64(val as u64);
    }
    fn put_i128(&mut self, val: i128) {
        self.put_u128(val as u128);
    }
    fn put_i256(&mut self, val: i256) {
        self.put_slice(&val.to_le_bytes());
    }
    fn put_f32(&mut self, val: f32) {
        self.put_u32(val.to_bits());
    }
    fn put_f64(&mut self, val: f64) {
        self.put_u64(val.to_bits());
    }
    fn put_bool(&mut self, val: bool) {
        self.put_u8(val as u8);
    }

    /// Appends `s` as a `u32` length prefix followed by its UTF-8 bytes.
    ///
    /// A string longer than `u32::MAX` bytes is a precondition violation.
    fn put_str(&mut self, s: &str) {
        self.put_bytes(s.as_bytes());
    }

    /// Appends `bytes` with the same framing as [`BufWriter::put_str`].
    fn put_bytes(&mut self, bytes: &[u8]) {
        assert!(bytes.len() <= u32::MAX as usize, "slice length exceeds u32::MAX");
        self.put_u32(bytes.len() as u32);
        self.put_slice(bytes);
    }
}

impl<W: BufWriter + ?Sized> BufWriter for &mut W {
    fn put_slice(&mut self, slice: &[u8]) {
        (**self).put_slice(slice);
    }
}

impl BufWriter for Vec<u8> {
    fn put_slice(&mut self, slice: &[u8]) {
        self.extend_from_slice(slice);
    }
}

impl BufWriter for bytes::BytesMut {
    fn put_slice(&mut self, slice: &[u8]) {
        self.extend_from_slice(slice);
    }
}

/// A [`BufWriter`] that counts bytes without storing them.
///
/// Used to pre-size buffers on hot paths; for any sequence of writes the
/// count equals exactly the number of bytes a real writer would emit.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountWriter {
    num_bytes: usize,
}

impl CountWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of bytes counted so far.
    pub fn finish(self) -> usize {
        self.num_bytes
    }
}

impl BufWriter for CountWriter {
    fn put_slice(&mut self, slice: &[u8]) {
        self.num_bytes += slice.len();
    }
}

/// A cursor over an immutable byte buffer.
///
/// Fixed-width reads that run out of input fail with
/// [`DecodeError::ShortBuffer`]; [`BufReader::get_slice`], which is only ever
/// reached through a length prefix, fails with
/// [`DecodeError::LengthOverflow`]. After any error the cursor position is
/// unspecified and the reader must not be reused.
pub trait BufReader<'de> {
    /// Takes the next `size` bytes, advancing the cursor.
    ///
    /// The returned slice borrows from the underlying buffer, not from the
    /// reader, so decoded `&str`/`&[u8]` values outlive the cursor.
    fn get_slice(&mut self, size: usize) -> Result<&'de [u8], DecodeError>;

    /// The number of unconsumed bytes.
    fn remaining(&self) -> usize;

    /// Takes the next `N` bytes as a fixed-width array.
    fn get_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let given = self.remaining();
        if given < N {
            return Err(DecodeError::ShortBuffer { expected: N, given });
        }
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.get_slice(N)?);
        Ok(arr)
    }

    fn get_u8(&mut self) -> Result<u8, DecodeError> {
        self.get_array().map(|[b]| b)
    }
    fn get_u16(&mut self) -> Result<u16, DecodeError> {
        self.get_array().map(u16::from_le_bytes)
    }
    fn get_u32(&mut self) -> Result<u32, DecodeError> {
        self.get_array().map(u32::from_le_bytes)
    }
    fn get_u64(&mut self) -> Result<u64, DecodeError> {
        self.get_array().map(u64::from_le_bytes)
    }
    fn get_u128(&mut self) -> Result<u128, DecodeError> {
        self.get_array().map(u128::from_le_bytes)
    }
    fn get_u256(&mut self) -> Result<u256, DecodeError> {
        self.get_array().map(u256::from_le_bytes)
    }
    fn get_i8(&mut self) -> Result<i8, DecodeError> {
        self.get_u8().map(|b| b as i8)
    }
    fn get_i16(&mut self) -> Result<i16, DecodeError> {
        self.get_u16().map(|v| v as i16)
    }
    fn get_i32(&mut self) -> Result<i32, DecodeError> {
        self.get_u32().map(|v| v as i32)
    }
    fn get_i64(&mut self) -> Result<i64, DecodeError> {
        self.get_u64().map(|v| v as i64)
    }
    fn get_i128(&mut self) -> Result<i128, DecodeError> {
        self.get_u128().map(|v| v as i128)
    }
    fn get_i256(&mut self) -> Result<i256, DecodeError> {
        self.get_array().map(i256::from_le_bytes)
    }
    fn get_f32(&mut self) -> Result<f32, DecodeError> {
        self.get_u32().map(f32::from_bits)
    }
    fn get_f64(&mut self) -> Result<f64, DecodeError> {
        self.get_u64().map(f64::from_bits)
    }
}

impl<'de> BufReader<'de> for &'de [u8] {
    fn get_slice(&mut self, size: usize) -> Result<&'de [u8], DecodeError> {
        if self.len() < size {
            return Err(DecodeError::LengthOverflow {
                length: size,
                remaining: self.len(),
            });
        }
        let (taken, rest) = self.split_at(size);
        *self = rest;
        Ok(taken)
    }

    fn remaining(&self) -> usize {
        self.len()
    }
}

/// A [`BufReader`] over an owned buffer.
///
/// The position lives in a [`Cell`] so that a shared `&Cursor` can be used as
/// a reader, letting decoded values borrow from the buffer while the cursor
/// advances.
#[derive(Debug)]
pub struct Cursor<I> {
    pub buf: I,
    pub pos: Cell<usize>,
}

impl<I> Cursor<I> {
    /// Wraps `buf` in a cursor positioned at its start.
    pub fn new(buf: I) -> Self {
        Self { buf, pos: Cell::new(0) }
    }
}

impl<'de, I: AsRef<[u8]>> BufReader<'de> for &'de Cursor<I> {
    fn get_slice(&mut self, size: usize) -> Result<&'de [u8], DecodeError> {
        let buf = &self.buf.as_ref()[self.pos.get()..];
        if buf.len() < size {
            return Err(DecodeError::LengthOverflow {
                length: size,
                remaining: buf.len(),
            });
        }
        self.pos.set(self.pos.get() + size);
        Ok(&buf[..size])
    }

    fn remaining(&self) -> usize {
        self.buf.as_ref().len() - self.pos.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn writes_are_little_endian() {
        let mut buf = Vec::new();
        buf.put_u16(0x0203);
        buf.put_u32(0xdead_beef);
        assert_eq!(buf, [0x03, 0x02, 0xef, 0xbe, 0xad, 0xde]);
    }

    #[test]
    fn u128_low_qword_first() {
        let mut buf = Vec::new();
        buf.put_u128(0x0102_0304_0506_0708_090a_0b0c_0d0e_0f10);
        assert_eq!(
            buf,
            [0x10, 0x0f, 0x0e, 0x0d, 0x0c, 0x0b, 0x0a, 0x09, 0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
        );
    }

    #[test]
    fn u256_round_trips_le() {
        let val = u256::from_le_bytes(std::array::from_fn(|i| i as u8));
        let mut buf = Vec::new();
        buf.put_u256(val);
        assert_eq!(buf.len(), 32);
        assert_eq!(buf[0], 0);
        assert_eq!(buf[31], 31);
        assert_eq!((&mut buf.as_slice()).get_u256().unwrap(), val);
    }

    #[test]
    fn short_buffer_on_fixed_width_reads() {
        let mut reader: &[u8] = &[1, 2, 3];
        assert_eq!(
            reader.get_u32(),
            Err(DecodeError::ShortBuffer { expected: 4, given: 3 })
        );
    }

    #[test]
    fn length_overflow_on_get_slice() {
        let mut reader: &[u8] = &[1, 2, 3];
        assert_eq!(
            reader.get_slice(7),
            Err(DecodeError::LengthOverflow { length: 7, remaining: 3 })
        );
    }

    #[test]
    fn cursor_and_slice_agree() {
        let bytes = vec![0x2a, 0, 0, 0, 0xff];
        let cursor = Cursor::new(bytes.clone());
        let mut cur_reader = &cursor;
        let mut slice_reader = bytes.as_slice();
        assert_eq!(cur_reader.get_u32().unwrap(), slice_reader.get_u32().unwrap());
        assert_eq!(cur_reader.get_u8().unwrap(), slice_reader.get_u8().unwrap());
        assert_eq!(cur_reader.remaining(), 0);
        assert_eq!(slice_reader.remaining(), 0);
    }

    #[test]
    fn count_writer_matches_vec_writer() {
        let mut vec = Vec::new();
        let mut count = CountWriter::new();
        fn write_all(w: &mut impl BufWriter) {
            w.put_bool(true);
            w.put_u16(7);
            w.put_i64(-1);
            w.put_f64(2.5);
            w.put_str("hello");
            w.put_bytes(&[1, 2, 3]);
        }
        write_all(&mut vec);
        write_all(&mut count);
        assert_eq!(count.finish(), vec.len());
    }

    proptest! {
        #[test]
        fn primitive_round_trip_u64(val in any::<u64>()) {
            let mut buf = Vec::new();
            buf.put_u64(val);
            prop_assert_eq!((&mut buf.as_slice()).get_u64().unwrap(), val);
        }

        #[test]
        fn primitive_round_trip_i128(val in any::<i128>()) {
            let mut buf = Vec::new();
            buf.put_i128(val);
            prop_assert_eq!((&mut buf.as_slice()).get_i128().unwrap(), val);
        }

        #[test]
        fn float_round_trip_is_bit_exact(bits in any::<u64>()) {
            let val = f64::from_bits(bits);
            let mut buf = Vec::new();
            buf.put_f64(val);
            let back = (&mut buf.as_slice()).get_f64().unwrap();
            prop_assert_eq!(back.to_bits(), bits);
        }
    }
}
