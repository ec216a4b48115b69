//! Format-dispatching entry points.
//!
//! These pick the AMF0 or AMF3 codec from a [`Format`] so callers that
//! negotiate the format at runtime don't have to branch themselves.

use crate::codec::options::{DecodeOptions, EncodeOptions};
use crate::codec::primitives::{ByteSink, ByteSource, Reader, Writer};
use crate::codec::{amf0, amf3};
use crate::error::{DecodeError, EncodeError};
use crate::model::{Format, Record, Value};

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes a value with default options.
pub fn encode_value<W: ByteSink + ?Sized>(
    sink: &mut W,
    value: &Value,
    format: Format,
) -> Result<(), EncodeError> {
    encode_value_with_options(sink, value, format, &EncodeOptions::default())
}

/// Encodes a value with the given options.
///
/// On failure, bytes already written to `sink` stay there.
pub fn encode_value_with_options<W: ByteSink + ?Sized>(
    sink: &mut W,
    value: &Value,
    format: Format,
    options: &EncodeOptions,
) -> Result<(), EncodeError> {
    match format {
        Format::Amf0 => amf0::encode_value(sink, value, options),
        Format::Amf3 => amf3::encode_value(sink, value, options),
    }
}

/// Encodes a value into a fresh buffer, returned only on success.
pub fn encode_to_vec(value: &Value, format: Format) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::new();
    encode_value(&mut writer, value, format)?;
    Ok(writer.into_bytes())
}

/// Encodes a record as an object with default options.
pub fn encode_record<W: ByteSink + ?Sized>(
    sink: &mut W,
    record: &dyn Record,
    format: Format,
) -> Result<(), EncodeError> {
    encode_record_with_options(sink, record, format, &EncodeOptions::default())
}

pub fn encode_record_with_options<W: ByteSink + ?Sized>(
    sink: &mut W,
    record: &dyn Record,
    format: Format,
    options: &EncodeOptions,
) -> Result<(), EncodeError> {
    match format {
        Format::Amf0 => amf0::encode_record(sink, record, options),
        Format::Amf3 => amf3::encode_record(sink, record, options),
    }
}

/// Encodes a record into a fresh buffer.
pub fn encode_record_to_vec(record: &dyn Record, format: Format) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::new();
    encode_record(&mut writer, record, format)?;
    Ok(writer.into_bytes())
}

// =============================================================================
// DECODING
// =============================================================================

/// Decodes one value with default options.
pub fn decode_value<S: ByteSource + ?Sized>(
    source: &mut S,
    format: Format,
) -> Result<Value, DecodeError> {
    decode_value_with_options(source, format, &DecodeOptions::default())
}

pub fn decode_value_with_options<S: ByteSource + ?Sized>(
    source: &mut S,
    format: Format,
    options: &DecodeOptions,
) -> Result<Value, DecodeError> {
    match format {
        Format::Amf0 => amf0::decode_value(source, options),
        Format::Amf3 => amf3::decode_value(source, options),
    }
}

/// Decodes the first value in `input`. Trailing bytes are ignored.
pub fn decode_from_slice(input: &[u8], format: Format) -> Result<Value, DecodeError> {
    decode_value(&mut Reader::new(input), format)
}
