//! Encoder and decoder bound to a sink or source.
//!
//! Useful when a stream carries several values back to back, such as an
//! RTMP command message (name, transaction id, command object, ...).

use tracing::trace;

use crate::codec::options::{DecodeOptions, EncodeOptions};
use crate::codec::primitives::{ByteSink, ByteSource};
use crate::codec::{amf0, amf3, value};
use crate::error::{DecodeError, EncodeError};
use crate::model::{Format, Object, Record, Value};

/// Writes successive values in one format.
#[derive(Debug)]
pub struct Encoder<W> {
    sink: W,
    format: Format,
    options: EncodeOptions,
}

impl<W: ByteSink> Encoder<W> {
    pub fn new(sink: W, format: Format) -> Self {
        Self::with_options(sink, format, EncodeOptions::default())
    }

    pub fn with_options(sink: W, format: Format, options: EncodeOptions) -> Self {
        Self {
            sink,
            format,
            options,
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Encodes one value.
    pub fn encode(&mut self, value: &Value) -> Result<(), EncodeError> {
        trace!(format = %self.format, kind = value.type_name(), "encoding value");
        value::encode_value_with_options(&mut self.sink, value, self.format, &self.options)
    }

    /// Encodes a record as an object.
    pub fn encode_record(&mut self, record: &dyn Record) -> Result<(), EncodeError> {
        value::encode_record_with_options(&mut self.sink, record, self.format, &self.options)
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// Reads successive values in one format.
#[derive(Debug)]
pub struct Decoder<S> {
    source: S,
    format: Format,
    options: DecodeOptions,
}

impl<S: ByteSource> Decoder<S> {
    pub fn new(source: S, format: Format) -> Self {
        Self::with_options(source, format, DecodeOptions::default())
    }

    pub fn with_options(source: S, format: Format, options: DecodeOptions) -> Self {
        Self {
            source,
            format,
            options,
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Decodes the next value.
    pub fn decode(&mut self) -> Result<Value, DecodeError> {
        value::decode_value_with_options(&mut self.source, self.format, &self.options)
    }

    /// Reads the next value, which must be a string.
    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        match self.format {
            Format::Amf0 => amf0::read_string(&mut self.source, &self.options),
            Format::Amf3 => amf3::read_string(&mut self.source, &self.options),
        }
    }

    /// Reads the next value, which must be a number (an AMF3 double).
    pub fn read_number(&mut self) -> Result<f64, DecodeError> {
        match self.format {
            Format::Amf0 => amf0::read_number(&mut self.source),
            Format::Amf3 => amf3::read_number(&mut self.source),
        }
    }

    pub fn read_boolean(&mut self) -> Result<bool, DecodeError> {
        match self.format {
            Format::Amf0 => amf0::read_boolean(&mut self.source),
            Format::Amf3 => amf3::read_boolean(&mut self.source),
        }
    }

    pub fn read_object(&mut self) -> Result<Object, DecodeError> {
        match self.format {
            Format::Amf0 => amf0::read_object(&mut self.source, &self.options),
            Format::Amf3 => amf3::read_object(&mut self.source, &self.options),
        }
    }

    /// Gives access to the source, e.g. for format-specific reads such as
    /// [`amf3::read_integer`].
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn get_ref(&self) -> &S {
        &self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}
