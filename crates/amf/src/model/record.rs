//! Field descriptors for typed records.
//!
//! A record type describes its fields once, in a table of
//! [`FieldDescriptor`]s, and hands out field values by index. The encoder
//! walks the table to produce the object's name/value pairs.
//!
//! ```rust
//! use amf::{Field, FieldDescriptor, Record};
//! use lazy_static::lazy_static;
//!
//! struct Stream {
//!     name: String,
//!     duration: f64,
//!     secret: String,
//! }
//!
//! lazy_static! {
//!     static ref STREAM_FIELDS: Vec<FieldDescriptor> = vec![
//!         FieldDescriptor::tagged("name", "streamName"),
//!         FieldDescriptor::tagged("duration", ",omitempty"),
//!         FieldDescriptor::tagged("secret", "-"),
//!     ];
//! }
//!
//! impl Record for Stream {
//!     fn descriptors(&self) -> &'static [FieldDescriptor] {
//!         &STREAM_FIELDS
//!     }
//!
//!     fn field(&self, index: usize) -> Field<'_> {
//!         match index {
//!             0 => Field::Value(self.name.as_str().into()),
//!             1 => Field::Value(self.duration.into()),
//!             _ => Field::Value(self.secret.as_str().into()),
//!         }
//!     }
//! }
//! ```

use crate::model::Value;

const OMIT_EMPTY: &str = "omitempty";

/// How one declared field maps onto the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    field: &'static str,
    name: &'static str,
    omit_empty: bool,
    skip: bool,
    flatten: bool,
}

impl FieldDescriptor {
    /// A field written under its declared name.
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            name: field,
            omit_empty: false,
            skip: false,
            flatten: false,
        }
    }

    /// A field carrying a directive of the form `name[,omitempty]` or `-`.
    ///
    /// An empty name part falls back to the declared field name. Options
    /// other than `omitempty` are ignored.
    pub fn tagged(field: &'static str, tag: &'static str) -> Self {
        let mut desc = Self::new(field);
        if tag == "-" {
            desc.skip = true;
            return desc;
        }
        let mut parts = tag.split(',');
        if let Some(name) = parts.next() {
            if !name.is_empty() {
                desc.name = name;
            }
        }
        desc.omit_empty = parts.any(|opt| opt == OMIT_EMPTY);
        desc
    }

    /// An embedded record whose fields are written inline.
    pub fn flattened(field: &'static str) -> Self {
        Self {
            flatten: true,
            ..Self::new(field)
        }
    }

    /// Declared field name.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Name written on the wire.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn omit_empty(&self) -> bool {
        self.omit_empty
    }

    pub fn skip(&self) -> bool {
        self.skip
    }

    pub fn flatten(&self) -> bool {
        self.flatten
    }
}

/// The runtime value of one record field.
pub enum Field<'a> {
    Value(Value),
    Record(&'a dyn Record),
}

impl Field<'_> {
    /// True if an `omitempty` field holding this should be left out.
    pub fn is_empty(&self) -> bool {
        match self {
            Field::Value(v) => v.is_empty(),
            Field::Record(_) => false,
        }
    }
}

impl From<Value> for Field<'_> {
    fn from(v: Value) -> Self {
        Field::Value(v)
    }
}

impl<'a, R: Record> From<&'a R> for Field<'a> {
    fn from(r: &'a R) -> Self {
        Field::Record(r)
    }
}

/// A typed record that encodes as an anonymous object.
pub trait Record {
    /// The field table, built once per type.
    fn descriptors(&self) -> &'static [FieldDescriptor];

    /// The value of the field at `index` in [`descriptors`](Self::descriptors).
    fn field(&self, index: usize) -> Field<'_>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_uses_field_name() {
        let d = FieldDescriptor::new("Width");
        assert_eq!(d.name(), "Width");
        assert!(!d.omit_empty() && !d.skip() && !d.flatten());
    }

    #[test]
    fn test_tag_rename() {
        let d = FieldDescriptor::tagged("Width", "width");
        assert_eq!(d.field(), "Width");
        assert_eq!(d.name(), "width");
        assert!(!d.omit_empty());
    }

    #[test]
    fn test_tag_omitempty() {
        let d = FieldDescriptor::tagged("Width", "w,omitempty");
        assert_eq!(d.name(), "w");
        assert!(d.omit_empty());

        let d = FieldDescriptor::tagged("Width", ",omitempty");
        assert_eq!(d.name(), "Width");
        assert!(d.omit_empty());
    }

    #[test]
    fn test_tag_skip() {
        let d = FieldDescriptor::tagged("Width", "-");
        assert!(d.skip());
    }

    #[test]
    fn test_unknown_option_ignored() {
        let d = FieldDescriptor::tagged("Count", "count,string");
        assert_eq!(d.name(), "count");
        assert!(!d.omit_empty());
    }
}
