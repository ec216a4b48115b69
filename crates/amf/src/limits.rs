//! Wire constants and default resource limits.

/// Longest UTF-8 payload carried by the AMF0 short string form.
pub const MAX_SHORT_STRING_LEN: usize = 0xFFFF;

/// Longest UTF-8 payload carried by the AMF0 long string form.
pub const MAX_LONG_STRING_LEN: usize = u32::MAX as usize;

/// Largest value representable as a U29.
pub const U29_MAX: u32 = 0x1FFF_FFFF;

/// Largest length an AMF3 `U29 << 1 | 1` header can carry.
pub const MAX_AMF3_LEN: usize = (U29_MAX >> 1) as usize;

/// Default container nesting limit for encode and decode.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default cap on any single decoded string, byte array or array count.
pub const DEFAULT_MAX_LEN: usize = 1 << 28;

/// Upper bound on up-front allocation for counted arrays.
pub const MAX_PREALLOC: usize = 1024;

/// AMF0 object terminator: an empty name followed by the object-end marker.
pub const AMF0_OBJECT_END: [u8; 3] = [0x00, 0x00, 0x09];

/// AMF3 traits byte for a dynamic object with no sealed members.
pub const AMF3_DYNAMIC_TRAITS: u8 = 0x0b;

/// AMF3 encoding of the empty string (`U29(0 << 1 | 1)`).
pub const AMF3_EMPTY_STRING: u8 = 0x01;
