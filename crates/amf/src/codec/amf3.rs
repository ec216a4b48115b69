//! AMF3 encoding/decoding.
//!
//! Only the reference-free subset is implemented: inline strings, dense
//! arrays and dynamic anonymous objects. String, object and traits
//! references are rejected.
//!
//! ```text
//! undefined  = 0x00
//! null       = 0x01
//! false/true = 0x02 / 0x03
//! integer    = 0x04 U29
//! double     = 0x05 DOUBLE
//! string     = 0x06 U29S-value
//! array      = 0x09 U29A-value 0x01 *(value)
//! object     = 0x0a 0x0b 0x01 *(U29S-value value) 0x01
//! bytearray  = 0x0c U29B-value *(U8)
//! ```

use tracing::{debug, trace};

use crate::codec::options::{DecodeOptions, EncodeOptions};
use crate::codec::primitives::{
    read_inline_len, read_utf8_vr, write_inline_len, write_utf8_vr, ByteSink, ByteSource,
};
use crate::codec::record::record_pairs;
use crate::error::{DecodeError, EncodeError};
use crate::limits::{AMF3_DYNAMIC_TRAITS, AMF3_EMPTY_STRING, MAX_PREALLOC, U29_MAX};
use crate::model::{Amf3Marker, Field, Format, Object, Record, Value};

// =============================================================================
// DECODING
// =============================================================================

/// Decodes one AMF3 value.
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
    let byte = source.read_byte("amf3 marker")?;
    let Some(marker) = Amf3Marker::from_u8(byte) else {
        debug!(marker = byte, "unknown AMF3 marker");
        return Err(DecodeError::UnknownMarker {
            format: Format::Amf3,
            marker: byte,
        });
    };
    match marker {
        Amf3Marker::Undefined => Ok(Value::Undefined),
        Amf3Marker::Null => Ok(Value::Null),
        Amf3Marker::False => Ok(Value::Boolean(false)),
        Amf3Marker::True => Ok(Value::Boolean(true)),
        Amf3Marker::Integer => Ok(Value::Integer(source.read_u29("integer")?)),
        Amf3Marker::Double => Ok(Value::Number(source.read_f64_be("double")?)),
        Amf3Marker::String => Ok(Value::String(read_utf8_vr(source, options.max_len, "string")?)),
        Amf3Marker::Array => {
            let depth = enter_decode(depth, options)?;
            decode_array_body(source, options, depth).map(Value::Array)
        }
        Amf3Marker::Object => {
            let depth = enter_decode(depth, options)?;
            decode_object_body(source, options, depth).map(Value::Object)
        }
        Amf3Marker::ByteArray => {
            let len = read_inline_len(source, options.max_len, "byte array")?;
            Ok(Value::ByteArray(source.read_vec(len, "byte array")?))
        }
        Amf3Marker::XmlDoc | Amf3Marker::Date | Amf3Marker::Xml => {
            debug!(marker = byte, name = marker.name(), "rejecting unsupported AMF3 marker");
            Err(DecodeError::UnsupportedMarker {
                format: Format::Amf3,
                marker: byte,
                name: marker.name(),
            })
        }
    }
}

fn enter_decode(depth: usize, options: &DecodeOptions) -> Result<usize, DecodeError> {
    let depth = depth + 1;
    if depth > options.max_depth {
        debug!(max = options.max_depth, "AMF3 decode depth exceeded");
        return Err(DecodeError::DepthExceeded {
            max: options.max_depth,
        });
    }
    Ok(depth)
}

fn decode_array_body<S: ByteSource + ?Sized>(
    source: &mut S,
    options: &DecodeOptions,
    depth: usize,
) -> Result<Vec<Value>, DecodeError> {
    let count = read_inline_len(source, options.max_len, "array")?;
    let assoc = read_utf8_vr(source, options.max_len, "array key")?;
    if !assoc.is_empty() {
        debug!(key = %assoc, "rejecting associative AMF3 array");
        return Err(DecodeError::AssociativeArrayUnsupported);
    }
    trace!(count, depth, "decoding dense array");
    let mut items = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        items.push(decode_value_at(source, options, depth)?);
    }
    Ok(items)
}

/// Reads traits, class name and members of a dynamic anonymous object.
fn decode_object_body<S: ByteSource + ?Sized>(
    source: &mut S,
    options: &DecodeOptions,
    depth: usize,
) -> Result<Object, DecodeError> {
    let traits = source.read_byte("object traits")?;
    if traits != AMF3_DYNAMIC_TRAITS {
        debug!(traits, "rejecting AMF3 object traits");
        return Err(DecodeError::UnsupportedTraits { traits });
    }
    let class_name = read_utf8_vr(source, options.max_len, "class name")?;
    if !class_name.is_empty() {
        debug!(class = %class_name, "rejecting typed AMF3 object");
        return Err(DecodeError::UnsupportedMarker {
            format: Format::Amf3,
            marker: Amf3Marker::Object.as_u8(),
            name: "typed object",
        });
    }
    let mut obj = Object::new();
    loop {
        let name = read_utf8_vr(source, options.max_len, "object name")?;
        if name.is_empty() {
            return Ok(obj);
        }
        let value = decode_value_at(source, options, depth)?;
        if let Err((key, _)) = obj.insert_unique(name, value) {
            debug!(key = %key, "duplicate AMF3 object key");
            return Err(DecodeError::DuplicateKey { key });
        }
    }
}

fn read_marker<S: ByteSource + ?Sized>(
    source: &mut S,
    expected: &'static str,
    accept: &[Amf3Marker],
) -> Result<Amf3Marker, DecodeError> {
    let byte = source.read_byte("amf3 marker")?;
    match Amf3Marker::from_u8(byte) {
        Some(marker) if accept.contains(&marker) => Ok(marker),
        _ => Err(DecodeError::TypeMismatch {
            format: Format::Amf3,
            expected,
            found: byte,
        }),
    }
}

/// Reads a string.
pub fn read_string<S: ByteSource + ?Sized>(
    source: &mut S,
    options: &DecodeOptions,
) -> Result<String, DecodeError> {
    read_marker(source, "string", &[Amf3Marker::String])?;
    read_utf8_vr(source, options.max_len, "string")
}

/// Reads a U29 integer.
pub fn read_integer<S: ByteSource + ?Sized>(source: &mut S) -> Result<u32, DecodeError> {
    read_marker(source, "integer", &[Amf3Marker::Integer])?;
    source.read_u29("integer")
}

/// Reads a double.
pub fn read_number<S: ByteSource + ?Sized>(source: &mut S) -> Result<f64, DecodeError> {
    read_marker(source, "double", &[Amf3Marker::Double])?;
    source.read_f64_be("double")
}

/// Reads a boolean.
pub fn read_boolean<S: ByteSource + ?Sized>(source: &mut S) -> Result<bool, DecodeError> {
    let marker = read_marker(source, "boolean", &[Amf3Marker::False, Amf3Marker::True])?;
    Ok(marker == Amf3Marker::True)
}

/// Reads a dynamic anonymous object.
pub fn read_object<S: ByteSource + ?Sized>(
    source: &mut S,
    options: &DecodeOptions,
) -> Result<Object, DecodeError> {
    read_marker(source, "object", &[Amf3Marker::Object])?;
    let depth = enter_decode(0, options)?;
    decode_object_body(source, options, depth)
}

/// Reads a byte array.
pub fn read_byte_array<S: ByteSource + ?Sized>(
    source: &mut S,
    options: &DecodeOptions,
) -> Result<Vec<u8>, DecodeError> {
    read_marker(source, "byte array", &[Amf3Marker::ByteArray])?;
    let len = read_inline_len(source, options.max_len, "byte array")?;
    source.read_vec(len, "byte array")
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes one AMF3 value.
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
        Value::Undefined => sink.write_byte(Amf3Marker::Undefined.as_u8()),
        Value::Null => sink.write_byte(Amf3Marker::Null.as_u8()),
        Value::Boolean(false) => sink.write_byte(Amf3Marker::False.as_u8()),
        Value::Boolean(true) => sink.write_byte(Amf3Marker::True.as_u8()),
        Value::Integer(n) => write_integer(sink, *n),
        Value::Number(n) => write_number(sink, *n),
        Value::String(s) => write_string(sink, s),
        Value::Date(_) => Err(EncodeError::UnsupportedValue {
            format: Format::Amf3,
            what: "date",
        }),
        Value::ByteArray(bytes) => write_byte_array(sink, bytes),
        Value::Array(items) => {
            let depth = enter_encode(depth, options)?;
            sink.write_byte(Amf3Marker::Array.as_u8())?;
            write_inline_len(sink, items.len())?;
            // No associative part.
            sink.write_byte(AMF3_EMPTY_STRING)?;
            for item in items {
                encode_value_at(sink, item, options, depth)?;
            }
            Ok(())
        }
        Value::Object(obj) => {
            let depth = enter_encode(depth, options)?;
            write_object_header(sink)?;
            for (name, value) in obj {
                write_member_name(sink, name)?;
                encode_value_at(sink, value, options, depth)?;
            }
            sink.write_byte(AMF3_EMPTY_STRING)
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

fn write_object_header<W: ByteSink + ?Sized>(sink: &mut W) -> Result<(), EncodeError> {
    sink.write_bytes(&[
        Amf3Marker::Object.as_u8(),
        AMF3_DYNAMIC_TRAITS,
        AMF3_EMPTY_STRING,
    ])
}

/// An empty name would read back as the end of the object.
fn write_member_name<W: ByteSink + ?Sized>(sink: &mut W, name: &str) -> Result<(), EncodeError> {
    if name.is_empty() {
        return Err(EncodeError::EmptyName);
    }
    write_utf8_vr(sink, name)
}

/// Writes a U29 integer.
pub fn write_integer<W: ByteSink + ?Sized>(sink: &mut W, n: u32) -> Result<(), EncodeError> {
    if n > U29_MAX {
        return Err(EncodeError::U29OutOfRange { value: n as u64 });
    }
    sink.write_byte(Amf3Marker::Integer.as_u8())?;
    sink.write_u29(n)
}

/// Writes a double. NaN and infinities are rejected.
pub fn write_number<W: ByteSink + ?Sized>(sink: &mut W, n: f64) -> Result<(), EncodeError> {
    if !n.is_finite() {
        return Err(EncodeError::NonFiniteNumber { value: n });
    }
    sink.write_byte(Amf3Marker::Double.as_u8())?;
    sink.write_f64_be(n)
}

/// Writes an inline string.
pub fn write_string<W: ByteSink + ?Sized>(sink: &mut W, s: &str) -> Result<(), EncodeError> {
    sink.write_byte(Amf3Marker::String.as_u8())?;
    write_utf8_vr(sink, s)
}

/// Writes an inline byte array.
pub fn write_byte_array<W: ByteSink + ?Sized>(sink: &mut W, bytes: &[u8]) -> Result<(), EncodeError> {
    sink.write_byte(Amf3Marker::ByteArray.as_u8())?;
    write_inline_len(sink, bytes.len())?;
    sink.write_bytes(bytes)
}

/// Encodes a typed record as a dynamic anonymous AMF3 object.
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
    write_object_header(sink)?;
    for pair in pairs {
        write_member_name(sink, pair.name)?;
        match pair.field {
            Field::Value(value) => encode_value_at(sink, &value, options, depth)?,
            Field::Record(inner) => encode_record_at(sink, inner, options, depth)?,
        }
    }
    sink.write_byte(AMF3_EMPTY_STRING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::primitives::{Reader, Writer};
    use crate::util::Timestamp;

    fn encode(value: &Value) -> Vec<u8> {
        let mut writer = Writer::new();
        encode_value(&mut writer, value, &EncodeOptions::default()).unwrap();
        writer.into_bytes()
    }

    fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
        decode_value(&mut Reader::new(bytes), &DecodeOptions::default())
    }

    #[test]
    fn test_decode_foo() {
        assert_eq!(
            decode(&[0x06, 0x07, b'f', b'o', b'o']).unwrap(),
            Value::String("foo".into())
        );
    }

    #[test]
    fn test_scalar_markers() {
        assert_eq!(encode(&Value::Undefined), [0x00]);
        assert_eq!(encode(&Value::Null), [0x01]);
        assert_eq!(encode(&Value::Boolean(false)), [0x02]);
        assert_eq!(encode(&Value::Boolean(true)), [0x03]);
        assert_eq!(decode(&[0x02]).unwrap(), Value::Boolean(false));
        assert_eq!(decode(&[0x03]).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_encode_double() {
        assert_eq!(
            encode(&Value::Number(1.2)),
            [0x05, 0x3f, 0xf3, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33]
        );
    }

    #[test]
    fn test_integer_roundtrip() {
        for n in [0, 127, 128, 16384, 2097152, U29_MAX] {
            let bytes = encode(&Value::Integer(n));
            assert_eq!(bytes[0], 0x04);
            assert_eq!(decode(&bytes).unwrap(), Value::Integer(n));
        }
    }

    #[test]
    fn test_integer_out_of_range() {
        let mut writer = Writer::new();
        let result = encode_value(
            &mut writer,
            &Value::Integer(U29_MAX + 1),
            &EncodeOptions::default(),
        );
        assert!(matches!(result, Err(EncodeError::U29OutOfRange { .. })));
        assert!(writer.is_empty());
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(encode(&Value::String(String::new())), [0x06, 0x01]);
        assert_eq!(decode(&[0x06, 0x01]).unwrap(), Value::String(String::new()));
    }

    #[test]
    fn test_string_reference_rejected() {
        assert!(matches!(
            decode(&[0x06, 0x00]),
            Err(DecodeError::ReferenceUnsupported { .. })
        ));
    }

    #[test]
    fn test_byte_array() {
        let value = Value::ByteArray(vec![0xde, 0xad]);
        let bytes = encode(&value);
        assert_eq!(bytes, [0x0c, 0x05, 0xde, 0xad]);
        assert_eq!(decode(&bytes).unwrap(), value);
        assert!(matches!(
            decode(&[0x0c, 0x02]),
            Err(DecodeError::ReferenceUnsupported { .. })
        ));
    }

    #[test]
    fn test_dense_array() {
        let value = Value::Array(vec![Value::Integer(1), Value::Null]);
        let bytes = encode(&value);
        assert_eq!(bytes, [0x09, 0x05, 0x01, 0x04, 0x01, 0x01]);
        assert_eq!(decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_associative_array_rejected() {
        // count 0, associative key "a"
        let bytes = [0x09, 0x01, 0x03, b'a', 0x01, 0x01];
        assert!(matches!(
            decode(&bytes),
            Err(DecodeError::AssociativeArrayUnsupported)
        ));
    }

    #[test]
    fn test_object_layout() {
        let obj: Object = [("b", Value::Integer(2)), ("a", Value::Boolean(true))]
            .into_iter()
            .collect();
        let bytes = encode(&Value::Object(obj.clone()));
        assert_eq!(
            bytes,
            [0x0a, 0x0b, 0x01, 0x03, b'a', 0x03, 0x03, b'b', 0x04, 0x02, 0x01]
        );
        assert_eq!(decode(&bytes).unwrap(), Value::Object(obj));
    }

    #[test]
    fn test_sealed_traits_rejected() {
        assert!(matches!(
            decode(&[0x0a, 0x03, 0x01, 0x01]),
            Err(DecodeError::UnsupportedTraits { traits: 0x03 })
        ));
    }

    #[test]
    fn test_typed_object_rejected() {
        let bytes = [0x0a, 0x0b, 0x07, b'F', b'o', b'o', 0x01];
        assert!(matches!(
            decode(&bytes),
            Err(DecodeError::UnsupportedMarker { name: "typed object", .. })
        ));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let bytes = [0x0a, 0x0b, 0x01, 0x03, b'a', 0x01, 0x03, b'a', 0x00, 0x01];
        assert!(matches!(decode(&bytes), Err(DecodeError::DuplicateKey { .. })));
    }

    #[test]
    fn test_empty_member_name_rejected() {
        let mut obj = Object::new();
        obj.insert("", Value::Null);
        let mut writer = Writer::new();
        let result = encode_value(&mut writer, &Value::Object(obj), &EncodeOptions::default());
        assert!(matches!(result, Err(EncodeError::EmptyName)));
    }

    #[test]
    fn test_unsupported_markers() {
        for marker in [0x07u8, 0x08, 0x0b] {
            assert!(matches!(
                decode(&[marker]),
                Err(DecodeError::UnsupportedMarker { .. })
            ));
        }
        assert!(matches!(
            decode(&[0x0d]),
            Err(DecodeError::UnknownMarker { marker: 0x0d, .. })
        ));
    }

    #[test]
    fn test_date_unsupported_on_encode() {
        let mut writer = Writer::new();
        let result = encode_value(
            &mut writer,
            &Value::Date(Timestamp::UNIX_EPOCH),
            &EncodeOptions::default(),
        );
        assert!(matches!(result, Err(EncodeError::UnsupportedValue { .. })));
    }

    #[test]
    fn test_nested_arrays_depth() {
        // [[[]]]
        let bytes = [0x09, 0x03, 0x01, 0x09, 0x03, 0x01, 0x09, 0x01, 0x01];
        let options = DecodeOptions::default().with_max_depth(2);
        assert!(matches!(
            decode_value(&mut Reader::new(&bytes), &options),
            Err(DecodeError::DepthExceeded { max: 2 })
        ));
        assert!(decode(&bytes).is_ok());
    }

    #[test]
    fn test_encode_depth_limit() {
        let value = Value::Array(vec![Value::Array(vec![Value::Array(vec![])])]);
        let options = EncodeOptions::default().with_max_depth(2);
        let mut writer = Writer::new();
        assert_eq!(
            encode_value(&mut writer, &value, &options),
            Err(EncodeError::DepthExceeded { max: 2 })
        );
        assert!(encode_value(&mut Writer::new(), &value, &EncodeOptions::default()).is_ok());
    }

    #[test]
    fn test_typed_reads() {
        let mut reader = Reader::new(&[0x04, 0x81, 0x00, 0x03, 0x0c, 0x03, 0xaa]);
        assert_eq!(read_integer(&mut reader).unwrap(), 128);
        assert!(read_boolean(&mut reader).unwrap());
        assert_eq!(
            read_byte_array(&mut reader, &DecodeOptions::default()).unwrap(),
            [0xaa]
        );

        let err = read_number(&mut Reader::new(&[0x04, 0x01])).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TypeMismatch {
                format: Format::Amf3,
                expected: "double",
                found: 0x04
            }
        );
    }

    #[test]
    fn test_read_object() {
        let bytes = [0x0a, 0x0b, 0x01, 0x03, b'k', 0x06, 0x03, b'v', 0x01];
        let obj = read_object(&mut Reader::new(&bytes), &DecodeOptions::default()).unwrap();
        assert_eq!(obj.get("k"), Some(&Value::String("v".into())));
        assert!(matches!(
            read_string(&mut Reader::new(&[0x01]), &DecodeOptions::default()),
            Err(DecodeError::TypeMismatch { .. })
        ));
    }
}
