//! Data model types for AMF.
//!
//! - Markers (wire type tags for both formats)
//! - Values (the generic in-memory form)
//! - Record descriptors (typed structs mapped onto objects)

pub mod marker;
pub mod record;
pub mod value;

pub use marker::{Amf0Marker, Amf3Marker};
pub use record::{Field, FieldDescriptor, Record};
pub use value::{Format, Object, Value};
