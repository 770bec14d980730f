use thiserror::Error;

/// Every way an encode or decode call can be rejected.
///
/// All variants are fatal for the buffer being processed: callers must drop
/// the whole message rather than keep what was decoded before the failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A read would pass the end of the buffer.
    #[error("Expected to read {requested} bytes at offset {offset}, but buffer length is {length}")]
    BufferUnderrun {
        offset: usize,
        requested: usize,
        length: usize,
    },

    /// A value does not fit the fixed width of its field.
    #[error("Value too large for {field}: {size} bytes exceeds {max}")]
    ValueTooLarge {
        field: &'static str,
        size: usize,
        max: usize,
    },

    /// A collection, array or payload exceeds its declared maximum.
    #[error("Too many {what}: {count} exceeds maximum {max}")]
    CapExceeded {
        what: &'static str,
        count: usize,
        max: usize,
    },

    /// A keyed collection met the same key twice while decoding.
    #[error("Duplicate key found in {collection}: {key}")]
    DuplicateKey {
        collection: &'static str,
        key: String,
    },

    /// An encode was asked to serialize a key with no associated value.
    #[error("Value not found for key {key} in {collection}")]
    MissingValue {
        collection: &'static str,
        key: String,
    },

    /// A string field does not hold valid UTF-8.
    #[error("Failed to decode UTF-8 string of {length} bytes at offset {offset}")]
    InvalidUtf8 { offset: usize, length: usize },

    #[error("Invalid checksum for buffer: expected {expected}, computed {computed}")]
    ChecksumMismatch { expected: u32, computed: u32 },
}

pub type Result<T> = std::result::Result<T, CodecError>;
