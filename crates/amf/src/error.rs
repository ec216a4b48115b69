//! Error types for AMF encoding and decoding.

use thiserror::Error;

use crate::model::Format;

/// Coarse classification shared by [`DecodeError`] and [`EncodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The marker read does not match the type the caller asked for.
    TypeMismatch,
    /// A marker or encoding this crate intentionally never implements.
    UnsupportedMarker,
    /// Short read, bad sentinel, duplicate key or similar corruption.
    MalformedStream,
    /// A name does not fit the 65535-byte short string form.
    NameTooLong,
    /// A value outside what the wire format can carry.
    ValueOutOfRange,
    /// The nesting guard tripped.
    DepthExceeded,
    /// The underlying sink or source failed.
    Io,
}

impl ErrorKind {
    /// Returns a stable lowercase label (e.g. "malformed_stream").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::UnsupportedMarker => "unsupported_marker",
            ErrorKind::MalformedStream => "malformed_stream",
            ErrorKind::NameTooLong => "name_too_long",
            ErrorKind::ValueOutOfRange => "value_out_of_range",
            ErrorKind::DepthExceeded => "depth_exceeded",
            ErrorKind::Io => "io",
        }
    }
}

/// Error during decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    // === TypeMismatch ===
    #[error("type mismatch: expected {expected}, found {format} marker 0x{found:02x}")]
    TypeMismatch {
        format: Format,
        expected: &'static str,
        found: u8,
    },

    // === UnsupportedMarker ===
    #[error("unsupported {format} marker 0x{marker:02x} ({name})")]
    UnsupportedMarker {
        format: Format,
        marker: u8,
        name: &'static str,
    },

    #[error("unknown {format} marker 0x{marker:02x}")]
    UnknownMarker { format: Format, marker: u8 },

    #[error("AMF3 reference unsupported in {context}")]
    ReferenceUnsupported { context: &'static str },

    #[error("unsupported AMF3 object traits 0x{traits:02x} (only dynamic anonymous objects)")]
    UnsupportedTraits { traits: u8 },

    #[error("AMF3 associative array parts are unsupported")]
    AssociativeArrayUnsupported,

    // === MalformedStream ===
    #[error("unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("expected object end marker 0x09, found 0x{found:02x}")]
    MissingObjectEnd { found: u8 },

    #[error("object end marker in value position")]
    UnexpectedObjectEnd,

    #[error("duplicate object key {key:?}")]
    DuplicateKey { key: String },

    #[error("invalid UTF-8 in {context}")]
    InvalidUtf8 { context: &'static str },

    #[error("invalid date: {millis} ms since epoch")]
    InvalidDate { millis: f64 },

    // === ValueOutOfRange ===
    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    // === DepthExceeded ===
    #[error("nesting depth exceeds maximum {max}")]
    DepthExceeded { max: usize },

    // === Io ===
    #[error("read failed: {0}")]
    Io(String),
}

impl DecodeError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            DecodeError::UnsupportedMarker { .. }
            | DecodeError::UnknownMarker { .. }
            | DecodeError::ReferenceUnsupported { .. }
            | DecodeError::UnsupportedTraits { .. }
            | DecodeError::AssociativeArrayUnsupported => ErrorKind::UnsupportedMarker,
            DecodeError::LengthExceedsLimit { .. } => ErrorKind::ValueOutOfRange,
            DecodeError::DepthExceeded { .. } => ErrorKind::DepthExceeded,
            DecodeError::Io(_) => ErrorKind::Io,
            _ => ErrorKind::MalformedStream,
        }
    }
}

/// Error during encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("name length {len} exceeds the AMF0 short string maximum {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("U29 value {value} out of range (max 0x1FFFFFFF)")]
    U29OutOfRange { value: u64 },

    #[error("non-finite number {value} cannot be encoded")]
    NonFiniteNumber { value: f64 },

    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("{what} cannot be encoded as {format}")]
    UnsupportedValue { format: Format, what: &'static str },

    #[error("object member names must not be empty")]
    EmptyName,

    #[error("field {field:?} is marked flatten but does not hold a record")]
    InvalidFlatten { field: &'static str },

    #[error("nesting depth exceeds maximum {max}")]
    DepthExceeded { max: usize },

    #[error("write failed: {0}")]
    Io(String),
}

impl EncodeError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EncodeError::NameTooLong { .. } => ErrorKind::NameTooLong,
            EncodeError::U29OutOfRange { .. }
            | EncodeError::NonFiniteNumber { .. }
            | EncodeError::LengthExceedsLimit { .. } => ErrorKind::ValueOutOfRange,
            EncodeError::UnsupportedValue { .. } => ErrorKind::UnsupportedMarker,
            EncodeError::EmptyName | EncodeError::InvalidFlatten { .. } => {
                ErrorKind::MalformedStream
            }
            EncodeError::DepthExceeded { .. } => ErrorKind::DepthExceeded,
            EncodeError::Io(_) => ErrorKind::Io,
        }
    }
}
