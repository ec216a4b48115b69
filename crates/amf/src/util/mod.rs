//! Utility modules for AMF.

pub mod datetime;

pub use datetime::Timestamp;
