//! BSON element type tags.

use crate::dispatch;
use crate::error::BsonError;

/// The 1-byte type tag preceding every BSON element.
///
/// Array uses document framing with decimal-ASCII string keys. `Undefined`,
/// `DbPointer`, `Symbol` and `JavaScriptWithScope` are deprecated in the wire
/// format but still decoded.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Double = 0x01,
    String = 0x02,
    Document = 0x03,
    Array = 0x04,
    Binary = 0x05,
    Undefined = 0x06,
    ObjectId = 0x07,
    Boolean = 0x08,
    DateTime = 0x09,
    Null = 0x0a,
    Regex = 0x0b,
    DbPointer = 0x0c,
    JavaScript = 0x0d,
    Symbol = 0x0e,
    JavaScriptWithScope = 0x0f,
    Int32 = 0x10,
    Timestamp = 0x11,
    Int64 = 0x12,
    Decimal128 = 0x13,
    MaxKey = 0x7f,
    MinKey = 0xff,
}

/// Every tag in wire-format order. The dispatch table is built from this
/// list.
pub const ALL_TAGS: [Tag; 21] = [
    Tag::Double,
    Tag::String,
    Tag::Document,
    Tag::Array,
    Tag::Binary,
    Tag::Undefined,
    Tag::ObjectId,
    Tag::Boolean,
    Tag::DateTime,
    Tag::Null,
    Tag::Regex,
    Tag::DbPointer,
    Tag::JavaScript,
    Tag::Symbol,
    Tag::JavaScriptWithScope,
    Tag::Int32,
    Tag::Timestamp,
    Tag::Int64,
    Tag::Decimal128,
    Tag::MaxKey,
    Tag::MinKey,
];

impl Tag {
    /// Resolves a wire byte to a tag via the dispatch table.
    #[inline]
    pub fn from_u8(byte: u8) -> Result<Tag, BsonError> {
        dispatch::tag_of(byte).ok_or(BsonError::InvalidBsonType(byte))
    }

    /// Returns the wire byte for this tag.
    #[inline]
    pub fn byte(self) -> u8 {
        self as u8
    }
}
