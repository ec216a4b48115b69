//! AMF: Action Message Format encoding and decoding.
//!
//! This crate provides a codec for AMF0 and AMF3, the binary object
//! serialization formats carried by RTMP command and data messages.
//!
//! # Overview
//!
//! - **Generic values**: [`Value`] covers every type both formats can carry
//!   that this crate supports; objects are [`Object`]s with unique,
//!   sorted keys, so output is deterministic.
//! - **Typed records**: implement [`Record`] with a table of
//!   [`FieldDescriptor`]s to encode a struct as an object with renamed,
//!   skipped, omit-if-empty and flattened fields.
//! - **Streams**: [`Encoder`] and [`Decoder`] read or write successive
//!   values over any [`ByteSink`]/[`ByteSource`], including `std::io`
//!   adapters.
//!
//! # Quick Start
//!
//! ```rust
//! use amf::{decode_from_slice, encode_to_vec, Format, Object, Value};
//!
//! let obj: Object = [("app", Value::from("live")), ("flashVer", Value::from("FMLE/3.0"))]
//!     .into_iter()
//!     .collect();
//! let value = Value::Object(obj);
//!
//! let bytes = encode_to_vec(&value, Format::Amf0).unwrap();
//! assert_eq!(bytes[0], 0x03);
//! assert_eq!(decode_from_slice(&bytes, Format::Amf0).unwrap(), value);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Markers, values and record descriptors
//! - [`codec`]: AMF0/AMF3 encoders and decoders, options, byte sinks/sources
//! - [`error`]: Error types
//! - [`limits`]: Wire-format constants and decoding defaults
//! - [`util`]: Timestamps for AMF0 dates
//!
//! # Supported subset
//!
//! References (AMF0 `0x07`, AMF3 string/object/traits references), typed
//! and externalizable objects, XML, movie clips and record sets are
//! rejected on decode and never produced on encode. AMF3 dates are not
//! supported; AMF0 dates are.
//!
//! # Security
//!
//! The decoder is designed to handle untrusted input:
//! - Nesting depth is bounded ([`DecodeOptions::max_depth`])
//! - Declared lengths are bounded ([`DecodeOptions::max_len`]) and never
//!   trusted for up-front allocation
//! - Duplicate keys and malformed sentinels are hard errors

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;
pub mod util;

// Re-export commonly used types at crate root
pub use codec::{
    decode_from_slice, decode_value, encode_record, encode_record_to_vec, encode_to_vec,
    encode_value, Amf0ArrayStyle, ByteSink, ByteSource, DecodeOptions, Decoder, EncodeOptions,
    Encoder, IoSink, IoSource, Reader, Writer,
};
pub use error::{DecodeError, EncodeError, ErrorKind};
pub use model::{Amf0Marker, Amf3Marker, Field, FieldDescriptor, Format, Object, Record, Value};
pub use util::Timestamp;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
