//! Primitive encoding/decoding shared by AMF0 and AMF3.
//!
//! Implements the byte source/sink abstraction, big-endian fixed-width
//! numbers, the U29 variable-length integer and the string bodies of both
//! formats.

use std::io;

use crate::error::{DecodeError, EncodeError};
use crate::limits::{MAX_AMF3_LEN, MAX_LONG_STRING_LEN, MAX_SHORT_STRING_LEN, U29_MAX};

/// Chunk size for reads from sources that cannot report their length.
const READ_CHUNK: usize = 8 * 1024;

// =============================================================================
// DECODING
// =============================================================================

/// A source of bytes for decoding.
///
/// Short reads fail with [`DecodeError::UnexpectedEof`].
pub trait ByteSource {
    /// Reads a single byte.
    fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError>;

    /// Fills `buf` completely.
    fn read_exact(&mut self, buf: &mut [u8], context: &'static str) -> Result<(), DecodeError>;

    /// Reads exactly `n` bytes into a new vector.
    ///
    /// The default grows the vector chunk by chunk so a corrupt length
    /// cannot force a large allocation before the data runs out.
    fn read_vec(&mut self, n: usize, context: &'static str) -> Result<Vec<u8>, DecodeError> {
        let mut out = Vec::with_capacity(n.min(READ_CHUNK));
        let mut chunk = [0u8; READ_CHUNK];
        let mut left = n;
        while left > 0 {
            let take = left.min(READ_CHUNK);
            self.read_exact(&mut chunk[..take], context)?;
            out.extend_from_slice(&chunk[..take]);
            left -= take;
        }
        Ok(out)
    }

    /// Reads a big-endian u16.
    #[inline]
    fn read_u16_be(&mut self, context: &'static str) -> Result<u16, DecodeError> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf, context)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Reads a big-endian i16.
    #[inline]
    fn read_i16_be(&mut self, context: &'static str) -> Result<i16, DecodeError> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf, context)?;
        Ok(i16::from_be_bytes(buf))
    }

    /// Reads a big-endian u32.
    #[inline]
    fn read_u32_be(&mut self, context: &'static str) -> Result<u32, DecodeError> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf, context)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Reads a big-endian IEEE 754 double.
    #[inline]
    fn read_f64_be(&mut self, context: &'static str) -> Result<f64, DecodeError> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf, context)?;
        Ok(f64::from_be_bytes(buf))
    }

    /// Reads a U29.
    ///
    /// Up to three bytes contribute 7 bits each while their high bit is
    /// set; a fourth byte contributes all 8 bits.
    fn read_u29(&mut self, context: &'static str) -> Result<u32, DecodeError> {
        let mut n: u32 = 0;
        for _ in 0..3 {
            let byte = self.read_byte(context)?;
            n = (n << 7) | (byte & 0x7F) as u32;
            if byte & 0x80 == 0 {
                return Ok(n);
            }
        }
        let byte = self.read_byte(context)?;
        Ok((n << 8) | byte as u32)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline]
    fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        (**self).read_byte(context)
    }

    #[inline]
    fn read_exact(&mut self, buf: &mut [u8], context: &'static str) -> Result<(), DecodeError> {
        (**self).read_exact(buf, context)
    }

    #[inline]
    fn read_vec(&mut self, n: usize, context: &'static str) -> Result<Vec<u8>, DecodeError> {
        (**self).read_vec(n, context)
    }
}

/// Reader for decoding from an in-memory buffer.
///
/// Wraps a byte slice and tracks the read position.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current position in the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the remaining bytes.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Returns the number of remaining bytes.
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true if all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads exactly n bytes, borrowing from the underlying slice.
    #[inline]
    pub fn read_bytes(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining_len() {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }
}

impl ByteSource for Reader<'_> {
    #[inline]
    fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        if self.pos >= self.data.len() {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    #[inline]
    fn read_exact(&mut self, buf: &mut [u8], context: &'static str) -> Result<(), DecodeError> {
        let bytes = self.read_bytes(buf.len(), context)?;
        buf.copy_from_slice(bytes);
        Ok(())
    }

    fn read_vec(&mut self, n: usize, context: &'static str) -> Result<Vec<u8>, DecodeError> {
        self.read_bytes(n, context).map(<[u8]>::to_vec)
    }
}

/// Adapts any [`io::Read`] into a [`ByteSource`].
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
}

impl<R: io::Read> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

fn map_read_error(err: io::Error, context: &'static str) -> DecodeError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        DecodeError::UnexpectedEof { context }
    } else {
        DecodeError::Io(err.to_string())
    }
}

impl<R: io::Read> ByteSource for IoSource<R> {
    fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf, context)?;
        Ok(buf[0])
    }

    fn read_exact(&mut self, buf: &mut [u8], context: &'static str) -> Result<(), DecodeError> {
        self.inner
            .read_exact(buf)
            .map_err(|e| map_read_error(e, context))
    }
}

/// Reads an AMF0 short string body: u16 length + UTF-8.
pub fn read_utf8<S: ByteSource + ?Sized>(source: &mut S, context: &'static str) -> Result<String, DecodeError> {
    let len = source.read_u16_be(context)? as usize;
    read_utf8_bytes(source, len, context)
}

/// Reads an AMF0 long string body: u32 length + UTF-8.
pub fn read_utf8_long<S: ByteSource + ?Sized>(
    source: &mut S,
    max_len: usize,
    context: &'static str,
) -> Result<String, DecodeError> {
    let len = source.read_u32_be(context)? as usize;
    if len > max_len {
        return Err(DecodeError::LengthExceedsLimit {
            field: context,
            len,
            max: max_len,
        });
    }
    read_utf8_bytes(source, len, context)
}

/// Reads an AMF3 `U29S-value` string body.
///
/// Only inline strings are accepted; string-table references fail.
pub fn read_utf8_vr<S: ByteSource + ?Sized>(
    source: &mut S,
    max_len: usize,
    context: &'static str,
) -> Result<String, DecodeError> {
    let len = read_inline_len(source, max_len, context)?;
    read_utf8_bytes(source, len, context)
}

/// Reads an AMF3 `U29 << 1 | 1` header and returns the length.
pub fn read_inline_len<S: ByteSource + ?Sized>(
    source: &mut S,
    max_len: usize,
    context: &'static str,
) -> Result<usize, DecodeError> {
    let header = source.read_u29(context)?;
    if header & 0x01 == 0 {
        return Err(DecodeError::ReferenceUnsupported { context });
    }
    let len = (header >> 1) as usize;
    if len > max_len {
        return Err(DecodeError::LengthExceedsLimit {
            field: context,
            len,
            max: max_len,
        });
    }
    Ok(len)
}

fn read_utf8_bytes<S: ByteSource + ?Sized>(
    source: &mut S,
    len: usize,
    context: &'static str,
) -> Result<String, DecodeError> {
    if len == 0 {
        return Ok(String::new());
    }
    let bytes = source.read_vec(len, context)?;
    String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { context })
}

// =============================================================================
// ENCODING
// =============================================================================

/// A sink for encoded bytes.
pub trait ByteSink {
    /// Writes a single byte.
    fn write_byte(&mut self, byte: u8) -> Result<(), EncodeError>;

    /// Writes all of `bytes`.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), EncodeError>;

    /// Writes a big-endian u16.
    #[inline]
    fn write_u16_be(&mut self, value: u16) -> Result<(), EncodeError> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Writes a big-endian i16.
    #[inline]
    fn write_i16_be(&mut self, value: i16) -> Result<(), EncodeError> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Writes a big-endian u32.
    #[inline]
    fn write_u32_be(&mut self, value: u32) -> Result<(), EncodeError> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Writes a big-endian IEEE 754 double.
    #[inline]
    fn write_f64_be(&mut self, value: f64) -> Result<(), EncodeError> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Writes a U29, failing for values above `0x1FFFFFFF`.
    fn write_u29(&mut self, value: u32) -> Result<(), EncodeError> {
        let mut buf = [0u8; 4];
        let len = encode_u29(value, &mut buf)?;
        self.write_bytes(&buf[..len])
    }
}

impl<W: ByteSink + ?Sized> ByteSink for &mut W {
    #[inline]
    fn write_byte(&mut self, byte: u8) -> Result<(), EncodeError> {
        (**self).write_byte(byte)
    }

    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        (**self).write_bytes(bytes)
    }
}

/// Packs a U29 into `buf`, returning the number of bytes used.
///
/// The 4-byte form carries 7+7+7 bits with continuation flags followed by
/// a full 8-bit final byte.
pub fn encode_u29(value: u32, buf: &mut [u8; 4]) -> Result<usize, EncodeError> {
    if value <= 0x7F {
        buf[0] = value as u8;
        Ok(1)
    } else if value <= 0x3FFF {
        buf[0] = (value >> 7) as u8 | 0x80;
        buf[1] = (value & 0x7F) as u8;
        Ok(2)
    } else if value <= 0x1F_FFFF {
        buf[0] = (value >> 14) as u8 | 0x80;
        buf[1] = ((value >> 7) & 0x7F) as u8 | 0x80;
        buf[2] = (value & 0x7F) as u8;
        Ok(3)
    } else if value <= U29_MAX {
        buf[0] = (value >> 22) as u8 | 0x80;
        buf[1] = ((value >> 15) & 0x7F) as u8 | 0x80;
        buf[2] = ((value >> 8) & 0x7F) as u8 | 0x80;
        buf[3] = value as u8;
        Ok(4)
    } else {
        Err(EncodeError::U29OutOfRange { value: value as u64 })
    }
}

/// Writer for encoding into an in-memory buffer.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl ByteSink for Writer {
    #[inline]
    fn write_byte(&mut self, byte: u8) -> Result<(), EncodeError> {
        self.buf.push(byte);
        Ok(())
    }

    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }
}

/// Adapts any [`io::Write`] into a [`ByteSink`].
///
/// Bytes written before a failure stay written.
#[derive(Debug)]
pub struct IoSink<W> {
    inner: W,
}

impl<W: io::Write> IoSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Flushes the wrapped writer.
    pub fn flush(&mut self) -> Result<(), EncodeError> {
        self.inner.flush().map_err(|e| EncodeError::Io(e.to_string()))
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> ByteSink for IoSink<W> {
    fn write_byte(&mut self, byte: u8) -> Result<(), EncodeError> {
        self.write_bytes(&[byte])
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.inner
            .write_all(bytes)
            .map_err(|e| EncodeError::Io(e.to_string()))
    }
}

/// Writes an AMF0 short string body: u16 length + UTF-8.
///
/// Used for object member names, which have no long form.
pub fn write_utf8<W: ByteSink + ?Sized>(sink: &mut W, s: &str) -> Result<(), EncodeError> {
    let len = s.len();
    if len > MAX_SHORT_STRING_LEN {
        return Err(EncodeError::NameTooLong {
            len,
            max: MAX_SHORT_STRING_LEN,
        });
    }
    sink.write_u16_be(len as u16)?;
    sink.write_bytes(s.as_bytes())
}

/// Writes an AMF0 long string body: u32 length + UTF-8.
pub fn write_utf8_long<W: ByteSink + ?Sized>(sink: &mut W, s: &str) -> Result<(), EncodeError> {
    let len = s.len();
    if len > MAX_LONG_STRING_LEN {
        return Err(EncodeError::LengthExceedsLimit {
            field: "long string",
            len,
            max: MAX_LONG_STRING_LEN,
        });
    }
    sink.write_u32_be(len as u32)?;
    sink.write_bytes(s.as_bytes())
}

/// Writes an AMF3 `U29 << 1 | 1` inline length header.
pub fn write_inline_len<W: ByteSink + ?Sized>(sink: &mut W, len: usize) -> Result<(), EncodeError> {
    if len > MAX_AMF3_LEN {
        return Err(EncodeError::U29OutOfRange {
            value: ((len as u64) << 1) | 1,
        });
    }
    sink.write_u29(((len as u32) << 1) | 1)
}

/// Writes an AMF3 inline string body.
pub fn write_utf8_vr<W: ByteSink + ?Sized>(sink: &mut W, s: &str) -> Result<(), EncodeError> {
    write_inline_len(sink, s.len())?;
    sink.write_bytes(s.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u29_bytes(v: u32) -> Vec<u8> {
        let mut writer = Writer::new();
        writer.write_u29(v).unwrap();
        writer.into_bytes()
    }

    #[test]
    fn test_u29_boundaries() {
        let cases: [(u32, &[u8]); 8] = [
            (1, &[0x01]),
            (127, &[0x7F]),
            (128, &[0x81, 0x00]),
            (16383, &[0xFF, 0x7F]),
            (16384, &[0x81, 0x80, 0x00]),
            (2097151, &[0xFF, 0xFF, 0x7F]),
            (2097152, &[0x80, 0xC0, 0x80, 0x00]),
            (268435455, &[0xBF, 0xFF, 0xFF, 0xFF]),
        ];
        for (v, expected) in cases {
            let bytes = u29_bytes(v);
            assert_eq!(bytes, expected, "encode {}", v);
            let decoded = Reader::new(&bytes).read_u29("test").unwrap();
            assert_eq!(decoded, v, "decode {}", v);
        }
    }

    #[test]
    fn test_u29_max() {
        let bytes = u29_bytes(U29_MAX);
        assert_eq!(bytes, [0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(Reader::new(&bytes).read_u29("test").unwrap(), U29_MAX);
    }

    #[test]
    fn test_u29_out_of_range() {
        let mut writer = Writer::new();
        let result = writer.write_u29(U29_MAX + 1);
        assert!(matches!(result, Err(EncodeError::U29OutOfRange { value: 0x2000_0000 })));
        assert!(writer.is_empty());
    }

    #[test]
    fn test_u29_truncated() {
        let result = Reader::new(&[0x81]).read_u29("test");
        assert!(matches!(result, Err(DecodeError::UnexpectedEof { context: "test" })));
    }

    #[test]
    fn test_fixed_width_big_endian() {
        let mut writer = Writer::new();
        writer.write_u16_be(0x0102).unwrap();
        writer.write_u32_be(0x03040506).unwrap();
        writer.write_f64_be(1.2).unwrap();
        assert_eq!(
            writer.as_bytes(),
            [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x3f, 0xf3, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33]
        );

        let mut reader = Reader::new(writer.as_bytes());
        assert_eq!(reader.read_u16_be("a").unwrap(), 0x0102);
        assert_eq!(reader.read_u32_be("b").unwrap(), 0x03040506);
        assert_eq!(reader.read_f64_be("c").unwrap(), 1.2);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_utf8_short() {
        let mut writer = Writer::new();
        write_utf8(&mut writer, "你好").unwrap();
        assert_eq!(writer.as_bytes(), [0x00, 0x06, 0xe4, 0xbd, 0xa0, 0xe5, 0xa5, 0xbd]);
        let decoded = read_utf8(&mut Reader::new(writer.as_bytes()), "test").unwrap();
        assert_eq!(decoded, "你好");
    }

    #[test]
    fn test_utf8_short_name_too_long() {
        let name = "x".repeat(MAX_SHORT_STRING_LEN + 1);
        let mut writer = Writer::new();
        let result = write_utf8(&mut writer, &name);
        assert!(matches!(result, Err(EncodeError::NameTooLong { len: 65536, .. })));
    }

    #[test]
    fn test_utf8_vr_reference_rejected() {
        // 0x06 = U29(3 << 1 | 0): string-table reference 3
        let result = read_utf8_vr(&mut Reader::new(&[0x06]), 1024, "string");
        assert!(matches!(result, Err(DecodeError::ReferenceUnsupported { .. })));
    }

    #[test]
    fn test_utf8_vr_roundtrip() {
        let mut writer = Writer::new();
        write_utf8_vr(&mut writer, "foo").unwrap();
        assert_eq!(writer.as_bytes(), [0x07, b'f', b'o', b'o']);
        let decoded = read_utf8_vr(&mut Reader::new(writer.as_bytes()), 1024, "test").unwrap();
        assert_eq!(decoded, "foo");
    }

    #[test]
    fn test_invalid_utf8() {
        let result = read_utf8(&mut Reader::new(&[0x00, 0x02, 0xff, 0xfe]), "name");
        assert!(matches!(result, Err(DecodeError::InvalidUtf8 { context: "name" })));
    }

    #[test]
    fn test_long_length_limit() {
        let data = [0x00, 0x01, 0x00, 0x00];
        let result = read_utf8_long(&mut Reader::new(&data), 100, "long string");
        assert!(matches!(
            result,
            Err(DecodeError::LengthExceedsLimit { len: 65536, max: 100, .. })
        ));
    }

    #[test]
    fn test_io_source_eof() {
        let data: &[u8] = &[0x00, 0x05, b'a'];
        let mut source = IoSource::new(data);
        let result = read_utf8(&mut source, "name");
        assert!(matches!(result, Err(DecodeError::UnexpectedEof { context: "name" })));
    }

    #[test]
    fn test_io_sink() {
        let mut sink = IoSink::new(Vec::new());
        write_utf8_vr(&mut sink, "").unwrap();
        sink.write_u29(128).unwrap();
        assert_eq!(sink.into_inner(), [0x01, 0x81, 0x00]);
    }

    #[test]
    fn test_io_source_read_vec_chunks() {
        let data = vec![7u8; READ_CHUNK * 2 + 3];
        let mut source = IoSource::new(data.as_slice());
        assert_eq!(source.read_vec(data.len(), "blob").unwrap(), data);
        assert!(matches!(
            source.read_byte("blob"),
            Err(DecodeError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_unexpected_eof() {
        let data = [0u8; 5];
        let mut reader = Reader::new(&data);
        let result = reader.read_bytes(10, "test");
        assert!(matches!(result, Err(DecodeError::UnexpectedEof { .. })));
    }
}
