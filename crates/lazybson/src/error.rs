//! Decoder error type.

use thiserror::Error;

use crate::tag::Tag;
use lazybson_buffers::BufferError;

/// Error type for BSON decoding operations.
///
/// All errors unwind the current parse or accessor call; a view constructed
/// successfully never degrades mid-use. Errors raised while decoding a nested
/// document carry the outer field names as a dotted path via [`BsonError::InField`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BsonError {
    #[error("buffer underflow at position {position}: required {required} bytes, {available} available")]
    BufferUnderflow {
        position: usize,
        required: usize,
        available: usize,
    },
    #[error("invalid BSON element type: 0x{0:02x}")]
    InvalidBsonType(u8),
    #[error("invalid boolean byte: 0x{0:02x}")]
    InvalidBoolean(u8),
    #[error("unterminated cstring starting at offset {0}")]
    MalformedCString(usize),
    #[error("invalid length prefix: {0}")]
    MalformedString(i32),
    #[error("frame mismatch at offset {boundary}: declared {declared} bytes, actual {actual}")]
    FrameMismatch {
        declared: i64,
        actual: usize,
        boundary: usize,
    },
    #[error("field `{field}`: requested {requested:?}, actual type {actual:?}")]
    TypeMismatch {
        field: String,
        requested: Tag,
        actual: Tag,
    },
    #[error("field not found: `{0}`")]
    FieldNotFound(String),
    #[error("heterogeneous array: element {index} has type {got:?}, expected {expected:?}")]
    HeterogeneousArray {
        index: usize,
        expected: Tag,
        got: Tag,
    },
    #[error("unsupported operation `{op}` for type {tag:?}")]
    UnsupportedOperation { op: &'static str, tag: Tag },
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("nesting depth limit exceeded ({0})")]
    DepthLimitExceeded(usize),
    #[error("in field `{field}`: {source}")]
    InField {
        field: String,
        source: Box<BsonError>,
    },
}

impl BsonError {
    /// Wraps the error with the enclosing field name, extending the dotted
    /// path when the error already carries one.
    pub(crate) fn in_field(self, name: &str) -> BsonError {
        match self {
            BsonError::InField { field, source } => BsonError::InField {
                field: format!("{name}.{field}"),
                source,
            },
            other => BsonError::InField {
                field: name.to_string(),
                source: Box::new(other),
            },
        }
    }
}

impl From<BufferError> for BsonError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer {
                position,
                required,
                available,
            } => BsonError::BufferUnderflow {
                position,
                required,
                available,
            },
            BufferError::NoNullTerminator { start } => BsonError::MalformedCString(start),
            BufferError::InvalidUtf8 => BsonError::InvalidUtf8,
        }
    }
}
