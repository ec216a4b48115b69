//! AMF0 encoding/decoding.
//!
//! Wire grammar (all multi-byte integers big-endian):
//!
//! ```text
//! number       = 0x00 DOUBLE
//! boolean      = 0x01 U8
//! string       = 0x02 U16 *(UTF-8)  |  0x0c U32 *(UTF-8)
//! object       = 0x03 *(name value) 0x00 0x00 0x09
//! null         = 0x05
//! undefined    = 0x06
//! ecma-array   = 0x08 U32 *(name value) 0x00 0x00 0x09
//! strict-array = 0x0a U32 *(value)
//! date         = 0x0b DOUBLE S16
//! avmplus      = 0x11 amf3-value
//! name         = U16 *(UTF-8)
//! ```

use tracing::{debug, trace};

use crate::codec::amf3;
use crate::codec::options::{Amf0ArrayStyle, DecodeOptions, EncodeOptions};
use crate::codec::primitives::{
    read_utf8, read_utf8_long, write_utf8, write_utf8_long, ByteSink, ByteSource,
};
use crate::codec::record::record_pairs;
use crate::error::{DecodeError, EncodeError};
use crate::limits::{AMF0_OBJECT_END, MAX_PREALLOC, MAX_SHORT_STRING_LEN, U29_MAX};
use crate::model::{Amf0Marker, Field, Format, Object, Record, Value};
use crate::util::Timestamp;

// =============================================================================
// DECODING
// =============================================================================

/// Decodes one AMF0 value.
pub fn decode_value<S: ByteSource + ?Sized>(
    source: &mut S,
    options: &DecodeOptions,
) -> Result<Value, DecodeError> {
    decode_value_at(source, options, 0)
}

pub(crate) fn decode_value_at<S: ByteSource + ?Sized>(
    source: &mut S,
    options: &DecodeOptions,
    depth: usize,
) -> Result<Value, DecodeError> {
    let byte = source.read_byte("amf0 marker")?;
    let Some(marker) = Amf0Marker::from_u8(byte) else {
        debug!(marker = byte, "unknown AMF0 marker");
        return Err(DecodeError::UnknownMarker {
            format: Format::Amf0,
            marker: byte,
        });
    };
    match marker {
        Amf0Marker::Number => Ok(Value::Number(source.read_f64_be("number")?)),
        Amf0Marker::Boolean => Ok(Value::Boolean(source.read_byte("boolean")? != 0)),
        Amf0Marker::String => Ok(Value::String(read_utf8(source, "string")?)),
        Amf0Marker::LongString => Ok(Value::String(read_utf8_long(
            source,
            options.max_len,
            "long string",
        )?)),
        Amf0Marker::Object => {
            let depth = enter_decode(depth, options)?;
            Ok(Value::Object(decode_object_body(source, options, depth)?))
        }
        Amf0Marker::Null => Ok(Value::Null),
        Amf0Marker::Undefined => Ok(Value::Undefined),
        Amf0Marker::EcmaArray => {
            let depth = enter_decode(depth, options)?;
            // The count is advisory; the sentinel ends the array.
            let count = source.read_u32_be("ecma array count")?;
            trace!(count, depth, "decoding ECMA array");
            Ok(Value::Object(decode_object_body(source, options, depth)?))
        }
        Amf0Marker::StrictArray => {
            let depth = enter_decode(depth, options)?;
            decode_strict_array(source, options, depth).map(Value::Array)
        }
        Amf0Marker::Date => decode_date(source).map(Value::Date),
        Amf0Marker::ObjectEnd => Err(DecodeError::UnexpectedObjectEnd),
        Amf0Marker::AvmPlus => amf3::decode_value_at(source, options, depth),
        Amf0Marker::MovieClip
        | Amf0Marker::Reference
        | Amf0Marker::Unsupported
        | Amf0Marker::RecordSet
        | Amf0Marker::XmlDocument
        | Amf0Marker::TypedObject => {
            debug!(marker = byte, name = marker.name(), "rejecting unsupported AMF0 marker");
            Err(DecodeError::UnsupportedMarker {
                format: Format::Amf0,
                marker: byte,
                name: marker.name(),
            })
        }
    }
}

fn enter_decode(depth: usize, options: &DecodeOptions) -> Result<usize, DecodeError> {
    let depth = depth + 1;
    if depth > options.max_depth {
        debug!(max = options.max_depth, "AMF0 decode depth exceeded");
        return Err(DecodeError::DepthExceeded {
            max: options.max_depth,
        });
    }
    Ok(depth)
}

/// Reads `*(name value)` up to and including the end sentinel.
fn decode_object_body<S: ByteSource + ?Sized>(
    source: &mut S,
    options: &DecodeOptions,
    depth: usize,
) -> Result<Object, DecodeError> {
    let mut obj = Object::new();
    loop {
        let name = read_utf8(source, "object name")?;
        if name.is_empty() {
            let end = source.read_byte("object end")?;
            if end != Amf0Marker::ObjectEnd.as_u8() {
                return Err(DecodeError::MissingObjectEnd { found: end });
            }
            return Ok(obj);
        }
        let value = decode_value_at(source, options, depth)?;
        if let Err((key, _)) = obj.insert_unique(name, value) {
            debug!(key = %key, "duplicate AMF0 object key");
            return Err(DecodeError::DuplicateKey { key });
        }
    }
}

fn decode_strict_array<S: ByteSource + ?Sized>(
    source: &mut S,
    options: &DecodeOptions,
    depth: usize,
) -> Result<Vec<Value>, DecodeError> {
    let count = source.read_u32_be("strict array count")? as usize;
    if count > options.max_len {
        return Err(DecodeError::LengthExceedsLimit {
            field: "strict array",
            len: count,
            max: options.max_len,
        });
    }
    trace!(count, depth, "decoding strict array");
    let mut items = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        items.push(decode_value_at(source, options, depth)?);
    }
    Ok(items)
}

/// Reads the date payload. The timezone field is reserved and ignored.
fn decode_date<S: ByteSource + ?Sized>(source: &mut S) -> Result<Timestamp, DecodeError> {
    let millis = source.read_f64_be("date")?;
    let _timezone = source.read_i16_be("date timezone")?;
    Timestamp::from_epoch_millis(millis).ok_or(DecodeError::InvalidDate { millis })
}

fn read_marker<S: ByteSource + ?Sized>(
    source: &mut S,
    expected: &'static str,
    accept: &[Amf0Marker],
) -> Result<Amf0Marker, DecodeError> {
    let byte = source.read_byte("amf0 marker")?;
    match Amf0Marker::from_u8(byte) {
        Some(marker) if accept.contains(&marker) => Ok(marker),
        _ => Err(DecodeError::TypeMismatch {
            format: Format::Amf0,
            expected,
            found: byte,
        }),
    }
}

/// Reads a string, short or long form.
pub fn read_string<S: ByteSource + ?Sized>(
    source: &mut S,
    options: &DecodeOptions,
) -> Result<String, DecodeError> {
    match read_marker(source, "string", &[Amf0Marker::String, Amf0Marker::LongString])? {
        Amf0Marker::String => read_utf8(source, "string"),
        _ => read_utf8_long(source, options.max_len, "long string"),
    }
}

/// Reads a number.
pub fn read_number<S: ByteSource + ?Sized>(source: &mut S) -> Result<f64, DecodeError> {
    read_marker(source, "number", &[Amf0Marker::Number])?;
    source.read_f64_be("number")
}

/// Reads a boolean.
pub fn read_boolean<S: ByteSource + ?Sized>(source: &mut S) -> Result<bool, DecodeError> {
    read_marker(source, "boolean", &[Amf0Marker::Boolean])?;
    Ok(source.read_byte("boolean")? != 0)
}

/// Reads an anonymous object (marker `0x03` only).
pub fn read_object<S: ByteSource + ?Sized>(
    source: &mut S,
    options: &DecodeOptions,
) -> Result<Object, DecodeError> {
    read_marker(source, "object", &[Amf0Marker::Object])?;
    let depth = enter_decode(0, options)?;
    decode_object_body(source, options, depth)
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes one AMF0 value.
pub fn encode_value<W: ByteSink + ?Sized>(
    sink: &mut W,
    value: &Value,
    options: &EncodeOptions,
) -> Result<(), EncodeError> {
    encode_value_at(sink, value, options, 0)
}

fn encode_value_at<W: ByteSink + ?Sized>(
    sink: &mut W,
    value: &Value,
    options: &EncodeOptions,
    depth: usize,
) -> Result<(), EncodeError> {
    match value {
        Value::Null => sink.write_byte(Amf0Marker::Null.as_u8()),
        Value::Undefined => sink.write_byte(Amf0Marker::Undefined.as_u8()),
        Value::Boolean(b) => write_boolean(sink, *b),
        Value::Number(n) => write_number(sink, *n),
        Value::Integer(n) => {
            // AMF0 has no integer type; keep the U29 contract anyway.
            if *n > U29_MAX {
                return Err(EncodeError::U29OutOfRange { value: *n as u64 });
            }
            write_number(sink, *n as f64)
        }
        Value::String(s) => write_string(sink, s),
        Value::Date(ts) => write_date(sink, ts),
        Value::ByteArray(_) => Err(EncodeError::UnsupportedValue {
            format: Format::Amf0,
            what: "byte array",
        }),
        Value::Array(items) => {
            let depth = enter_encode(depth, options)?;
            match options.amf0_array_style {
                Amf0ArrayStyle::Ecma => encode_ecma_array(sink, items, options, depth),
                Amf0ArrayStyle::Strict => encode_strict_array(sink, items, options, depth),
            }
        }
        Value::Object(obj) => {
            let depth = enter_encode(depth, options)?;
            sink.write_byte(Amf0Marker::Object.as_u8())?;
            for (name, value) in obj {
                write_member_name(sink, name)?;
                encode_value_at(sink, value, options, depth)?;
            }
            sink.write_bytes(&AMF0_OBJECT_END)
        }
    }
}

fn enter_encode(depth: usize, options: &EncodeOptions) -> Result<usize, EncodeError> {
    let depth = depth + 1;
    if depth > options.max_depth {
        return Err(EncodeError::DepthExceeded {
            max: options.max_depth,
        });
    }
    Ok(depth)
}

/// An empty name would read back as the start of the end sentinel.
fn write_member_name<W: ByteSink + ?Sized>(sink: &mut W, name: &str) -> Result<(), EncodeError> {
    if name.is_empty() {
        return Err(EncodeError::EmptyName);
    }
    write_utf8(sink, name)
}

fn array_count(len: usize) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::LengthExceedsLimit {
        field: "array",
        len,
        max: u32::MAX as usize,
    })
}

fn encode_ecma_array<W: ByteSink + ?Sized>(
    sink: &mut W,
    items: &[Value],
    options: &EncodeOptions,
    depth: usize,
) -> Result<(), EncodeError> {
    sink.write_byte(Amf0Marker::EcmaArray.as_u8())?;
    sink.write_u32_be(array_count(items.len())?)?;
    for (index, item) in items.iter().enumerate() {
        write_utf8(sink, &index.to_string())?;
        encode_value_at(sink, item, options, depth)?;
    }
    sink.write_bytes(&AMF0_OBJECT_END)
}

fn encode_strict_array<W: ByteSink + ?Sized>(
    sink: &mut W,
    items: &[Value],
    options: &EncodeOptions,
    depth: usize,
) -> Result<(), EncodeError> {
    sink.write_byte(Amf0Marker::StrictArray.as_u8())?;
    sink.write_u32_be(array_count(items.len())?)?;
    for item in items {
        encode_value_at(sink, item, options, depth)?;
    }
    Ok(())
}

/// Writes a boolean.
pub fn write_boolean<W: ByteSink + ?Sized>(sink: &mut W, b: bool) -> Result<(), EncodeError> {
    sink.write_bytes(&[Amf0Marker::Boolean.as_u8(), b as u8])
}

/// Writes a number. NaN and infinities are rejected.
pub fn write_number<W: ByteSink + ?Sized>(sink: &mut W, n: f64) -> Result<(), EncodeError> {
    if !n.is_finite() {
        return Err(EncodeError::NonFiniteNumber { value: n });
    }
    sink.write_byte(Amf0Marker::Number.as_u8())?;
    sink.write_f64_be(n)
}

/// Writes a string, switching to the long form above 65535 bytes.
pub fn write_string<W: ByteSink + ?Sized>(sink: &mut W, s: &str) -> Result<(), EncodeError> {
    if s.len() > MAX_SHORT_STRING_LEN {
        sink.write_byte(Amf0Marker::LongString.as_u8())?;
        write_utf8_long(sink, s)
    } else {
        sink.write_byte(Amf0Marker::String.as_u8())?;
        write_utf8(sink, s)
    }
}

/// Writes a date with a zero timezone field.
pub fn write_date<W: ByteSink + ?Sized>(sink: &mut W, ts: &Timestamp) -> Result<(), EncodeError> {
    sink.write_byte(Amf0Marker::Date.as_u8())?;
    sink.write_f64_be(ts.epoch_millis())?;
    sink.write_i16_be(0)
}

/// Encodes a typed record as an AMF0 object.
pub fn encode_record<W: ByteSink + ?Sized>(
    sink: &mut W,
    record: &dyn Record,
    options: &EncodeOptions,
) -> Result<(), EncodeError> {
    encode_record_at(sink, record, options, 0)
}

fn encode_record_at<W: ByteSink + ?Sized>(
    sink: &mut W,
    record: &dyn Record,
    options: &EncodeOptions,
    depth: usize,
) -> Result<(), EncodeError> {
    let depth = enter_encode(depth, options)?;
    let pairs = record_pairs(record, depth, options.max_depth)?;
    sink.write_byte(Amf0Marker::Object.as_u8())?;
    for pair in pairs {
        write_member_name(sink, pair.name)?;
        match pair.field {
            Field::Value(value) => encode_value_at(sink, &value, options, depth)?,
            Field::Record(inner) => encode_record_at(sink, inner, options, depth)?,
        }
    }
    sink.write_bytes(&AMF0_OBJECT_END)
}
