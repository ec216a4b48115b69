//! The generic AMF value model.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use crate::util::Timestamp;

/// Wire format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Format {
    Amf0 = 0,
    Amf3 = 3,
}

impl Format {
    /// Creates a Format from its AMF version number.
    pub fn from_u8(v: u8) -> Option<Format> {
        match v {
            0 => Some(Format::Amf0),
            3 => Some(Format::Amf3),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Amf0 => f.write_str("AMF0"),
            Format::Amf3 => f.write_str("AMF3"),
        }
    }
}

/// Any value that can be encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Undefined,
    Boolean(bool),
    /// IEEE 754 double. Must be finite to encode.
    Number(f64),
    /// Unsigned 29-bit integer. AMF3 carries it natively; AMF0 encodes it
    /// as a number.
    Integer(u32),
    String(String),
    Date(Timestamp),
    /// Raw bytes (AMF3 only).
    ByteArray(Vec<u8>),
    Array(Vec<Value>),
    Object(Object),
}

impl Value {
    /// Returns true for the zero value of the variant's type: `false`,
    /// `0`, empty text, empty containers, `null` and `undefined`.
    ///
    /// Dates are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null | Value::Undefined => true,
            Value::Boolean(b) => !b,
            Value::Number(n) => *n == 0.0,
            Value::Integer(n) => *n == 0,
            Value::String(s) => s.is_empty(),
            Value::Date(_) => false,
            Value::ByteArray(b) => b.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(o) => o.is_empty(),
        }
    }

    /// Returns the variant name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::Integer(_) => "integer",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::ByteArray(_) => "byte array",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Timestamp> for Value {
    fn from(v: Timestamp) -> Self {
        Value::Date(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Value::Object(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Name/value members of an anonymous object.
///
/// Names are unique and kept in ascending order of their UTF-8 bytes, which
/// is also the order they are written on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    entries: BTreeMap<String, Value>,
}

impl Object {
    /// Creates an empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a member, replacing and returning any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), value.into())
    }

    /// Inserts a member only if the name is not present yet.
    ///
    /// On a duplicate the object is left unchanged and the value is handed
    /// back.
    pub fn insert_unique(&mut self, name: String, value: Value) -> Result<(), (String, Value)> {
        match self.entries.entry(name) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
            btree_map::Entry::Occupied(slot) => Err((slot.key().clone(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates members in wire order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Object {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut obj = Object::new();
        for (k, v) in iter {
            obj.insert(k, v);
        }
        obj
    }
}
