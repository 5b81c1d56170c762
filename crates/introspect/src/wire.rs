//! Bounds-checked little-endian cursor over an encoded message.
//!
//! Every read checks the remaining length first and fails with
//! [`Error::BufferExhausted`] instead of reading past the end.

use crate::error::{Error, Result};
use introspect_types::{Duration, ScalarTag, Time, Variant};

/// Read cursor over a borrowed byte buffer.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

macro_rules! read_le {
    ($($name:ident => $t:ty : $width:literal),* $(,)?) => {
        $(
            pub fn $name(&mut self) -> Result<$t> {
                let bytes = self.read_array::<$width>()?;
                Ok(<$t>::from_le_bytes(bytes))
            }
        )*
    };
}

impl<'a> WireReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    /// Cursor positioned at `offset`. Reads fail if it lies past the end.
    pub fn at(buffer: &'a [u8], offset: usize) -> Self {
        Self { buffer, offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    /// True once every byte has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    /// Borrow the next `count` bytes and advance past them.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(Error::BufferExhausted {
                offset: self.offset,
                needed: count,
                available: self.remaining(),
            });
        }
        let start = self.offset;
        self.offset += count;
        Ok(&self.buffer[start..self.offset])
    }

    /// Advance past `count` bytes without looking at them.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.read_bytes(count).map(|_| ())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    read_le!(
        read_u16 => u16: 2,
        read_i16 => i16: 2,
        read_u32 => u32: 4,
        read_i32 => i32: 4,
        read_u64 => u64: 8,
        read_i64 => i64: 8,
        read_f32 => f32: 4,
        read_f64 => f64: 8,
    );

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_time(&mut self) -> Result<Time> {
        Ok(Time::new(self.read_u32()?, self.read_u32()?))
    }

    pub fn read_duration(&mut self) -> Result<Duration> {
        Ok(Duration::new(self.read_i32()?, self.read_i32()?))
    }

    /// Length prefix of a string or variable-length array.
    pub fn read_len(&mut self) -> Result<usize> {
        Ok(self.read_u32()? as usize)
    }

    /// u32 byte count followed by that many bytes; no terminator.
    pub fn read_string(&mut self) -> Result<&'a [u8]> {
        let len = self.read_len()?;
        self.read_bytes(len)
    }

    /// Decode one builtin value of type `tag`.
    pub fn read_scalar(&mut self, tag: ScalarTag) -> Result<Variant> {
        Ok(match tag {
            ScalarTag::Bool => Variant::Bool(self.read_bool()?),
            ScalarTag::Byte => Variant::Byte(self.read_u8()?),
            ScalarTag::Char => Variant::Char(self.read_i8()?),
            ScalarTag::Int8 => Variant::Int8(self.read_i8()?),
            ScalarTag::Uint8 => Variant::Uint8(self.read_u8()?),
            ScalarTag::Int16 => Variant::Int16(self.read_i16()?),
            ScalarTag::Uint16 => Variant::Uint16(self.read_u16()?),
            ScalarTag::Int32 => Variant::Int32(self.read_i32()?),
            ScalarTag::Uint32 => Variant::Uint32(self.read_u32()?),
            ScalarTag::Int64 => Variant::Int64(self.read_i64()?),
            ScalarTag::Uint64 => Variant::Uint64(self.read_u64()?),
            ScalarTag::Float32 => Variant::Float32(self.read_f32()?),
            ScalarTag::Float64 => Variant::Float64(self.read_f64()?),
            ScalarTag::Time => Variant::Time(self.read_time()?),
            ScalarTag::Duration => Variant::Duration(self.read_duration()?),
            ScalarTag::String => Variant::from_bytes(self.read_string()?),
            ScalarTag::Composite => return Err(Error::NotBuiltin(tag.to_string())),
        })
    }

    /// Advance past `count` consecutive builtin values of type `tag`.
    pub fn skip_scalars(&mut self, tag: ScalarTag, count: usize) -> Result<()> {
        match tag.wire_size() {
            Some(width) => {
                let total = width.checked_mul(count).ok_or(Error::BufferExhausted {
                    offset: self.offset,
                    needed: usize::MAX,
                    available: self.remaining(),
                })?;
                self.skip(total)
            }
            None => {
                for _ in 0..count {
                    self.read_scalar(tag)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_little_endian() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0xff];
        let mut reader = WireReader::new(&buf);
        assert_eq!(reader.read_u32().expect("4 bytes"), 0x0403_0201);
        assert_eq!(reader.read_i8().expect("1 byte"), -1);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_read_past_end_fails_without_advancing() {
        let buf = [0u8; 3];
        let mut reader = WireReader::new(&buf);
        let err = reader.read_u32().expect_err("short buffer");
        assert!(matches!(
            err,
            Error::BufferExhausted {
                offset: 0,
                needed: 4,
                available: 3
            }
        ));
        assert_eq!(reader.offset(), 0);
    }

    #[test]
    fn test_read_string() {
        let mut buf = 5u32.to_le_bytes().to_vec();
        buf.extend_from_slice(b"hello");
        let mut reader = WireReader::new(&buf);
        assert_eq!(reader.read_string().expect("string"), b"hello");
        assert_eq!(reader.offset(), 9);
    }

    #[test]
    fn test_string_length_beyond_buffer() {
        let mut buf = 100u32.to_le_bytes().to_vec();
        buf.extend_from_slice(b"short");
        let mut reader = WireReader::new(&buf);
        assert!(matches!(
            reader.read_string(),
            Err(Error::BufferExhausted { needed: 100, .. })
        ));
    }

    #[test]
    fn test_read_scalar_time_and_duration() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&7u32.to_le_bytes());
        buf.extend_from_slice(&250_000_000u32.to_le_bytes());
        buf.extend_from_slice(&(-2i32).to_le_bytes());
        buf.extend_from_slice(&0i32.to_le_bytes());
        let mut reader = WireReader::new(&buf);
        assert_eq!(
            reader.read_scalar(ScalarTag::Time).expect("time"),
            Variant::Time(Time::new(7, 250_000_000))
        );
        assert_eq!(
            reader.read_scalar(ScalarTag::Duration).expect("duration"),
            Variant::Duration(Duration::new(-2, 0))
        );
    }

    #[test]
    fn test_skip_scalars_fixed_and_strings() {
        let mut buf = vec![0u8; 12];
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.push(b'a');
        buf.extend_from_slice(&0u32.to_le_bytes());
        let mut reader = WireReader::new(&buf);
        reader.skip_scalars(ScalarTag::Float32, 3).expect("12 bytes");
        assert_eq!(reader.offset(), 12);
        reader.skip_scalars(ScalarTag::String, 2).expect("two strings");
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_skip_overflowing_count() {
        let buf = [0u8; 8];
        let mut reader = WireReader::new(&buf);
        assert!(reader.skip_scalars(ScalarTag::Float64, usize::MAX).is_err());
    }

    #[test]
    fn test_reader_at_offset_past_end() {
        let buf = [1u8, 2];
        let mut reader = WireReader::at(&buf, 5);
        assert_eq!(reader.remaining(), 0);
        assert!(reader.read_u8().is_err());
    }
}
