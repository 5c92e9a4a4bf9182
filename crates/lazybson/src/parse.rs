//! Per-type value parsers.
//!
//! Each parser advances the reader past exactly one value and constructs the
//! decoded [`BsonValue`]. Dispatch is a dense match on the tag; JavaScript
//! code and Symbol share the string parser, Undefined shares the null
//! parser.

use lazybson_buffers::Reader;

use crate::array::ArrayView;
use crate::document::Document;
use crate::error::BsonError;
use crate::tag::Tag;
use crate::value::{
    Binary, BsonValue, CodeWithScope, DbPointer, Decimal128, ObjectId, Regex, Timestamp,
};

/// Reads a length-prefixed BSON string: `i32` length L (content plus
/// terminator, so L >= 1), L-1 UTF-8 bytes, then the `0x00`.
pub(crate) fn read_string<'a>(reader: &mut Reader<'a>) -> Result<&'a str, BsonError> {
    let l = reader.i32_le()?;
    if l < 1 {
        return Err(BsonError::MalformedString(l));
    }
    let s = reader.utf8((l - 1) as usize)?;
    if reader.u8()? != 0 {
        return Err(BsonError::MalformedString(l));
    }
    Ok(s)
}

fn read_object_id(reader: &mut Reader<'_>) -> Result<ObjectId, BsonError> {
    let bytes = reader.buf(12)?;
    let mut id = [0u8; 12];
    id.copy_from_slice(bytes);
    Ok(ObjectId(id))
}

/// Parses one value of the given type at the reader's cursor.
pub(crate) fn parse_value<'a>(
    tag: Tag,
    reader: &mut Reader<'a>,
) -> Result<BsonValue<'a>, BsonError> {
    match tag {
        Tag::Double => Ok(BsonValue::Double(reader.f64_le()?)),
        Tag::String => Ok(BsonValue::Str(read_string(reader)?)),
        Tag::Document => {
            let doc = Document::parse_at(reader.buffer(), reader.position())?;
            reader.skip(doc.byte_len())?;
            Ok(BsonValue::Document(doc))
        }
        Tag::Array => {
            let arr = ArrayView::parse_at(reader.buffer(), reader.position())?;
            reader.skip(arr.byte_len())?;
            Ok(BsonValue::Array(arr))
        }
        Tag::Binary => {
            let l = reader.i32_le()?;
            if l < 0 {
                return Err(BsonError::MalformedString(l));
            }
            let subtype = reader.u8()?;
            let data = reader.buf(l as usize)?;
            Ok(BsonValue::Binary(Binary { subtype, data }))
        }
        Tag::Undefined | Tag::Null => Ok(BsonValue::Null),
        Tag::ObjectId => Ok(BsonValue::ObjectId(read_object_id(reader)?)),
        Tag::Boolean => match reader.u8()? {
            0x00 => Ok(BsonValue::Boolean(false)),
            0x01 => Ok(BsonValue::Boolean(true)),
            byte => Err(BsonError::InvalidBoolean(byte)),
        },
        Tag::DateTime => Ok(BsonValue::DateTime(reader.i64_le()?)),
        Tag::Regex => {
            let pattern = reader.cstr()?;
            let options = reader.cstr()?;
            Ok(BsonValue::Regex(Regex { pattern, options }))
        }
        Tag::DbPointer => {
            let name = read_string(reader)?;
            let id = read_object_id(reader)?;
            Ok(BsonValue::DbPointer(DbPointer { name, id }))
        }
        Tag::JavaScript => Ok(BsonValue::JavaScript(read_string(reader)?)),
        Tag::Symbol => Ok(BsonValue::Symbol(read_string(reader)?)),
        Tag::JavaScriptWithScope => {
            let start = reader.position();
            let total = reader.i32_le()?;
            let code = read_string(reader)?;
            let scope = Document::parse_at(reader.buffer(), reader.position())?;
            reader.skip(scope.byte_len())?;
            let consumed = reader.position() - start;
            if consumed != total as usize {
                return Err(BsonError::FrameMismatch {
                    declared: total as i64,
                    actual: consumed,
                    boundary: start,
                });
            }
            Ok(BsonValue::JavaScriptWithScope(CodeWithScope { code, scope }))
        }
        Tag::Int32 => Ok(BsonValue::Int32(reader.i32_le()?)),
        Tag::Timestamp => {
            let increment = reader.u32_le()?;
            let seconds = reader.u32_le()?;
            Ok(BsonValue::Timestamp(Timestamp { seconds, increment }))
        }
        Tag::Int64 => Ok(BsonValue::Int64(reader.i64_le()?)),
        Tag::Decimal128 => {
            let bytes = reader.buf(16)?;
            let mut raw = [0u8; 16];
            raw.copy_from_slice(bytes);
            Ok(BsonValue::Decimal128(Decimal128(raw)))
        }
        Tag::MinKey => Ok(BsonValue::MinKey),
        Tag::MaxKey => Ok(BsonValue::MaxKey),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_rejects_missing_terminator() {
        let mut buf = vec![];
        buf.extend_from_slice(&3i32.to_le_bytes());
        buf.extend_from_slice(b"hiX");
        let mut reader = Reader::new(&buf);
        assert_eq!(read_string(&mut reader), Err(BsonError::MalformedString(3)));
    }

    #[test]
    fn string_rejects_nonpositive_length() {
        let buf = (-1i32).to_le_bytes();
        let mut reader = Reader::new(&buf);
        assert_eq!(read_string(&mut reader), Err(BsonError::MalformedString(-1)));
    }

    #[test]
    fn boolean_rejects_other_bytes() {
        let buf = [0x02u8];
        let mut reader = Reader::new(&buf);
        assert_eq!(
            parse_value(Tag::Boolean, &mut reader),
            Err(BsonError::InvalidBoolean(0x02))
        );
    }

    #[test]
    fn undefined_decodes_to_null() {
        let buf: [u8; 0] = [];
        let mut reader = Reader::new(&buf);
        assert_eq!(parse_value(Tag::Undefined, &mut reader), Ok(BsonValue::Null));
    }

    #[test]
    fn timestamp_splits_wire_halves() {
        let wire: i64 = ((0xAABB_CCDDu32 as i64) << 32) | 0x1122_3344;
        let buf = wire.to_le_bytes();
        let mut reader = Reader::new(&buf);
        match parse_value(Tag::Timestamp, &mut reader).unwrap() {
            BsonValue::Timestamp(ts) => {
                assert_eq!(ts.seconds, 0xAABB_CCDD);
                assert_eq!(ts.increment, 0x1122_3344);
            }
            other => panic!("expected timestamp, got {other:?}"),
        }
    }

    #[test]
    fn code_with_scope_total_length_must_match() {
        // total says 100, actual content is shorter
        let mut buf = vec![];
        buf.extend_from_slice(&100i32.to_le_bytes());
        buf.extend_from_slice(&2i32.to_le_bytes());
        buf.extend_from_slice(b"x\x00");
        buf.extend_from_slice(&5i32.to_le_bytes());
        buf.push(0);
        let mut reader = Reader::new(&buf);
        assert!(matches!(
            parse_value(Tag::JavaScriptWithScope, &mut reader),
            Err(BsonError::FrameMismatch { .. })
        ));
    }

    #[test]
    fn binary_borrows_payload() {
        let mut buf = vec![];
        buf.extend_from_slice(&3i32.to_le_bytes());
        buf.push(0x80);
        buf.extend_from_slice(&[9, 8, 7]);
        let mut reader = Reader::new(&buf);
        match parse_value(Tag::Binary, &mut reader).unwrap() {
            BsonValue::Binary(bin) => {
                assert_eq!(bin.subtype, 0x80);
                assert_eq!(bin.data, &[9, 8, 7]);
                assert_eq!(bin.data.as_ptr(), buf[5..].as_ptr());
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }
}
