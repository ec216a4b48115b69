//! Marker bytes for AMF0 and AMF3.

/// AMF0 type markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Amf0Marker {
    Number = 0x00,
    Boolean = 0x01,
    String = 0x02,
    Object = 0x03,
    MovieClip = 0x04,
    Null = 0x05,
    Undefined = 0x06,
    Reference = 0x07,
    EcmaArray = 0x08,
    ObjectEnd = 0x09,
    StrictArray = 0x0a,
    Date = 0x0b,
    LongString = 0x0c,
    Unsupported = 0x0d,
    RecordSet = 0x0e,
    XmlDocument = 0x0f,
    TypedObject = 0x10,
    /// Switches the rest of the value to AMF3.
    AvmPlus = 0x11,
}

impl Amf0Marker {
    /// Creates a marker from its wire byte.
    pub fn from_u8(v: u8) -> Option<Amf0Marker> {
        match v {
            0x00 => Some(Amf0Marker::Number),
            0x01 => Some(Amf0Marker::Boolean),
            0x02 => Some(Amf0Marker::String),
            0x03 => Some(Amf0Marker::Object),
            0x04 => Some(Amf0Marker::MovieClip),
            0x05 => Some(Amf0Marker::Null),
            0x06 => Some(Amf0Marker::Undefined),
            0x07 => Some(Amf0Marker::Reference),
            0x08 => Some(Amf0Marker::EcmaArray),
            0x09 => Some(Amf0Marker::ObjectEnd),
            0x0a => Some(Amf0Marker::StrictArray),
            0x0b => Some(Amf0Marker::Date),
            0x0c => Some(Amf0Marker::LongString),
            0x0d => Some(Amf0Marker::Unsupported),
            0x0e => Some(Amf0Marker::RecordSet),
            0x0f => Some(Amf0Marker::XmlDocument),
            0x10 => Some(Amf0Marker::TypedObject),
            0x11 => Some(Amf0Marker::AvmPlus),
            _ => None,
        }
    }

    /// Returns the wire byte.
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Amf0Marker::Number => "number",
            Amf0Marker::Boolean => "boolean",
            Amf0Marker::String => "string",
            Amf0Marker::Object => "object",
            Amf0Marker::MovieClip => "movie clip",
            Amf0Marker::Null => "null",
            Amf0Marker::Undefined => "undefined",
            Amf0Marker::Reference => "reference",
            Amf0Marker::EcmaArray => "ECMA array",
            Amf0Marker::ObjectEnd => "object end",
            Amf0Marker::StrictArray => "strict array",
            Amf0Marker::Date => "date",
            Amf0Marker::LongString => "long string",
            Amf0Marker::Unsupported => "unsupported",
            Amf0Marker::RecordSet => "recordset",
            Amf0Marker::XmlDocument => "XML document",
            Amf0Marker::TypedObject => "typed object",
            Amf0Marker::AvmPlus => "AVM+ object",
        }
    }
}

/// AMF3 type markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Amf3Marker {
    Undefined = 0x00,
    Null = 0x01,
    False = 0x02,
    True = 0x03,
    Integer = 0x04,
    Double = 0x05,
    String = 0x06,
    XmlDoc = 0x07,
    Date = 0x08,
    Array = 0x09,
    Object = 0x0a,
    Xml = 0x0b,
    ByteArray = 0x0c,
}

impl Amf3Marker {
    /// Creates a marker from its wire byte.
    pub fn from_u8(v: u8) -> Option<Amf3Marker> {
        match v {
            0x00 => Some(Amf3Marker::Undefined),
            0x01 => Some(Amf3Marker::Null),
            0x02 => Some(Amf3Marker::False),
            0x03 => Some(Amf3Marker::True),
            0x04 => Some(Amf3Marker::Integer),
            0x05 => Some(Amf3Marker::Double),
            0x06 => Some(Amf3Marker::String),
            0x07 => Some(Amf3Marker::XmlDoc),
            0x08 => Some(Amf3Marker::Date),
            0x09 => Some(Amf3Marker::Array),
            0x0a => Some(Amf3Marker::Object),
            0x0b => Some(Amf3Marker::Xml),
            0x0c => Some(Amf3Marker::ByteArray),
            _ => None,
        }
    }

    /// Returns the wire byte.
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Amf3Marker::Undefined => "undefined",
            Amf3Marker::Null => "null",
            Amf3Marker::False => "false",
            Amf3Marker::True => "true",
            Amf3Marker::Integer => "integer",
            Amf3Marker::Double => "double",
            Amf3Marker::String => "string",
            Amf3Marker::XmlDoc => "XML document",
            Amf3Marker::Date => "date",
            Amf3Marker::Array => "array",
            Amf3Marker::Object => "object",
            Amf3Marker::Xml => "XML",
            Amf3Marker::ByteArray => "byte array",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amf0_marker_bytes() {
        for b in 0x00..=0x11u8 {
            let marker = Amf0Marker::from_u8(b).unwrap();
            assert_eq!(marker.as_u8(), b);
        }
        assert_eq!(Amf0Marker::from_u8(0x12), None);
        assert_eq!(Amf0Marker::LongString.as_u8(), 0x0c);
    }

    #[test]
    fn test_amf3_marker_bytes() {
        for b in 0x00..=0x0cu8 {
            let marker = Amf3Marker::from_u8(b).unwrap();
            assert_eq!(marker.as_u8(), b);
        }
        assert_eq!(Amf3Marker::from_u8(0x0d), None);
        assert_eq!(Amf3Marker::ByteArray.name(), "byte array");
    }
}
