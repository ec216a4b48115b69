//! Binary encoding/decoding for AMF0 and AMF3.

pub mod amf0;
pub mod amf3;
pub mod options;
pub mod primitives;
pub mod record;
pub mod stream;
pub mod value;

pub use options::{Amf0ArrayStyle, DecodeOptions, EncodeOptions};
pub use primitives::{ByteSink, ByteSource, IoSink, IoSource, Reader, Writer};
pub use stream::{Decoder, Encoder};
pub use value::{
    decode_from_slice, decode_value, decode_value_with_options, encode_record,
    encode_record_to_vec, encode_record_with_options, encode_to_vec, encode_value,
    encode_value_with_options,
};
