//! Encoder and decoder configuration.

use crate::limits::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_LEN};

/// How `Value::Array` is framed in AMF0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Amf0ArrayStyle {
    /// ECMA array (`0x08`): count, then index-named members and the
    /// object end sentinel. Decodes back as an object.
    #[default]
    Ecma,
    /// Strict array (`0x0a`): count, then positional values. Decodes back
    /// as an array.
    Strict,
}

/// Options for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Maximum container nesting depth.
    pub max_depth: usize,

    /// Framing for arrays in AMF0.
    pub amf0_array_style: Amf0ArrayStyle,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            amf0_array_style: Amf0ArrayStyle::Ecma,
        }
    }
}

impl EncodeOptions {
    /// Creates default encoding options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_amf0_array_style(mut self, style: Amf0ArrayStyle) -> Self {
        self.amf0_array_style = style;
        self
    }
}

/// Options for decoding untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum container nesting depth.
    pub max_depth: usize,

    /// Maximum length of any single string, byte array or strict array.
    pub max_len: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

impl DecodeOptions {
    /// Creates default decoding options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }
}
