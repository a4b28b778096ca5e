//! A positional reader/writer over byte buffers, with little/big-endian
//! numeric decoding and bounds-checked slicing.
//!
//! Every other stage of the codec is built on top of [`Cursor`] and
//! [`ByteWriter`] so that endianness is handled in exactly one place.

use crate::error::{Result, TruncatedInputSnafu};
use byteordered::{ByteOrdered, Endianness};
use snafu::ensure;
use std::io::Cursor as IoCursor;

/// An immutable, bounds-checked cursor over a byte slice.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
    endianness: Endianness,
}

impl<'a> Cursor<'a> {
    /// Build a cursor over the given buffer, starting at offset 0.
    pub fn new(buf: &'a [u8], endianness: Endianness) -> Self {
        Cursor {
            buf,
            pos: 0,
            endianness,
        }
    }

    /// This cursor's endianness.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// The current absolute offset into the original buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Move the cursor to an absolute offset within the buffer.
    pub fn seek(&mut self, abs: usize) -> Result<()> {
        ensure!(
            abs <= self.buf.len(),
            TruncatedInputSnafu {
                need: abs,
                have: self.buf.len(),
                at_offset: self.pos,
            }
        );
        self.pos = abs;
        Ok(())
    }

    /// Look at the next `n` bytes without advancing the cursor.
    pub fn peek(&self, n: usize) -> Result<&'a [u8]> {
        ensure!(
            self.remaining() >= n,
            TruncatedInputSnafu {
                need: n,
                have: self.remaining(),
                at_offset: self.pos,
            }
        );
        Ok(&self.buf[self.pos..self.pos + n])
    }

    /// Read and consume the next `n` bytes.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8]> {
        let slice = self.peek(n)?;
        self.pos += n;
        Ok(slice)
    }

    /// Carve out an independent cursor over the next `n` bytes, advancing
    /// this cursor past them. The returned cursor shares the same
    /// endianness and cannot read beyond its own `n`-byte window.
    pub fn bounded(&mut self, n: usize) -> Result<Cursor<'a>> {
        let slice = self.read(n)?;
        Ok(Cursor {
            buf: slice,
            pos: 0,
            endianness: self.endianness,
        })
    }

    /// Read an unsigned 16-bit integer under this cursor's endianness.
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read(2)?;
        let mut src = IoCursor::new(bytes);
        Ok(match self.endianness {
            Endianness::Little => ByteOrdered::le(&mut src).read_u16(),
            Endianness::Big => ByteOrdered::be(&mut src).read_u16(),
        }
        .expect("reading from an in-memory slice of the right length cannot fail"))
    }

    /// Read an unsigned 32-bit integer under this cursor's endianness.
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read(4)?;
        let mut src = IoCursor::new(bytes);
        Ok(match self.endianness {
            Endianness::Little => ByteOrdered::le(&mut src).read_u32(),
            Endianness::Big => ByteOrdered::be(&mut src).read_u32(),
        }
        .expect("reading from an in-memory slice of the right length cannot fail"))
    }

    /// Read a signed 16-bit integer under this cursor's endianness.
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    /// Read a signed 32-bit integer under this cursor's endianness.
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    /// Read an IEEE-754 single-precision float under this cursor's
    /// endianness.
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Read an IEEE-754 double-precision float under this cursor's
    /// endianness.
    pub fn read_f64(&mut self) -> Result<f64> {
        let bytes = self.read(8)?;
        let mut src = IoCursor::new(bytes);
        let bits = match self.endianness {
            Endianness::Little => ByteOrdered::le(&mut src).read_u64(),
            Endianness::Big => ByteOrdered::be(&mut src).read_u64(),
        }
        .expect("reading from an in-memory slice of the right length cannot fail");
        Ok(f64::from_bits(bits))
    }
}

/// An append-only byte writer with endian-parameterized numeric encoding,
/// the mirror image of [`Cursor`].
#[derive(Debug, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
    endianness: Endianness,
}

impl ByteWriter {
    /// Build an empty writer for the given endianness.
    pub fn new(endianness: Endianness) -> Self {
        ByteWriter {
            buf: Vec::new(),
            endianness,
        }
    }

    /// This writer's endianness.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// The number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append raw bytes verbatim.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write an unsigned 16-bit integer under this writer's endianness.
    pub fn write_u16(&mut self, v: u16) {
        match self.endianness {
            Endianness::Little => ByteOrdered::le(&mut self.buf).write_u16(v),
            Endianness::Big => ByteOrdered::be(&mut self.buf).write_u16(v),
        }
        .expect("writing to a Vec<u8> cannot fail");
    }

    /// Write an unsigned 32-bit integer under this writer's endianness.
    pub fn write_u32(&mut self, v: u32) {
        match self.endianness {
            Endianness::Little => ByteOrdered::le(&mut self.buf).write_u32(v),
            Endianness::Big => ByteOrdered::be(&mut self.buf).write_u32(v),
        }
        .expect("writing to a Vec<u8> cannot fail");
    }

    /// Write a signed 16-bit integer under this writer's endianness.
    pub fn write_i16(&mut self, v: i16) {
        self.write_u16(v as u16);
    }

    /// Write a signed 32-bit integer under this writer's endianness.
    pub fn write_i32(&mut self, v: i32) {
        self.write_u32(v as u32);
    }

    /// Write an IEEE-754 single-precision float under this writer's
    /// endianness.
    pub fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    /// Write an IEEE-754 double-precision float under this writer's
    /// endianness.
    pub fn write_f64(&mut self, v: f64) {
        match self.endianness {
            Endianness::Little => ByteOrdered::le(&mut self.buf).write_u64(v.to_bits()),
            Endianness::Big => ByteOrdered::be(&mut self.buf).write_u64(v.to_bits()),
        }
        .expect("writing to a Vec<u8> cannot fail");
    }

    /// Consume the writer, returning the accumulated buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_u32() {
        let data = [0x78, 0x56, 0x34, 0x12];
        let mut c = Cursor::new(&data, Endianness::Little);
        assert_eq!(c.read_u32().unwrap(), 0x1234_5678);
    }

    #[test]
    fn reads_big_endian_u32() {
        let data = [0x12, 0x34, 0x56, 0x78];
        let mut c = Cursor::new(&data, Endianness::Big);
        assert_eq!(c.read_u32().unwrap(), 0x1234_5678);
    }

    #[test]
    fn write_matches_scenario_6_of_spec() {
        let mut w = ByteWriter::new(Endianness::Little);
        w.write_u32(0x1234_5678);
        assert_eq!(w.clone().into_vec(), vec![0x78, 0x56, 0x34, 0x12]);

        let mut w = ByteWriter::new(Endianness::Big);
        w.write_u32(0x1234_5678);
        assert_eq!(w.into_vec(), vec![0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn bounded_cursor_does_not_overrun() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let mut c = Cursor::new(&data, Endianness::Little);
        let sub = c.bounded(4).unwrap();
        assert_eq!(sub.remaining(), 4);
        assert!(sub.peek(5).is_err());
        assert_eq!(c.remaining(), 2);
    }

    #[test]
    fn truncated_read_is_an_error() {
        let data = [1u8, 2];
        let mut c = Cursor::new(&data, Endianness::Little);
        assert!(c.read_u32().is_err());
    }
}
