//! Value sizing and skipping.
//!
//! [`value_size`] computes the exact byte length of one value from its first
//! bytes without moving any cursor; [`skip_value`] is its cursor-motion twin.
//! Both consult the same dispatch rule, so their answers are identical by
//! construction.

use lazybson_buffers::Reader;

use crate::dispatch::{rule_of, SizeRule};
use crate::error::BsonError;
use crate::tag::Tag;

/// Smallest legal document: 4-byte length + terminating `0x00`.
pub(crate) const MIN_DOCUMENT_LEN: usize = 5;

#[inline]
fn i32_at(buf: &[u8], offset: usize) -> Result<i32, BsonError> {
    if offset + 4 > buf.len() {
        return Err(BsonError::BufferUnderflow {
            position: offset,
            required: 4,
            available: buf.len().saturating_sub(offset),
        });
    }
    Ok(i32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ]))
}

#[inline]
fn ensure(buf: &[u8], offset: usize, size: u64) -> Result<u32, BsonError> {
    if offset as u64 + size > buf.len() as u64 {
        return Err(BsonError::BufferUnderflow {
            position: offset,
            required: size as usize,
            available: buf.len().saturating_sub(offset),
        });
    }
    Ok(size as u32)
}

fn cstring_end(buf: &[u8], start: usize) -> Result<usize, BsonError> {
    let mut i = start;
    while i < buf.len() {
        if buf[i] == 0 {
            return Ok(i + 1);
        }
        i += 1;
    }
    Err(BsonError::MalformedCString(start))
}

/// Computes the exact byte length of the value at `offset` without parsing
/// it. Every embedded length is validated against the remaining buffer.
pub fn value_size(tag: Tag, buf: &[u8], offset: usize) -> Result<u32, BsonError> {
    match rule_of(tag) {
        SizeRule::Fixed(n) => ensure(buf, offset, n as u64),
        SizeRule::StringLike => {
            let l = i32_at(buf, offset)?;
            if l < 1 {
                return Err(BsonError::MalformedString(l));
            }
            ensure(buf, offset, 4 + l as u64)
        }
        SizeRule::Binary => {
            let l = i32_at(buf, offset)?;
            if l < 0 {
                return Err(BsonError::MalformedString(l));
            }
            ensure(buf, offset, 5 + l as u64)
        }
        SizeRule::Framed => {
            let l = i32_at(buf, offset)?;
            if (l as i64) < MIN_DOCUMENT_LEN as i64 {
                return Err(BsonError::FrameMismatch {
                    declared: l as i64,
                    actual: MIN_DOCUMENT_LEN,
                    boundary: offset,
                });
            }
            ensure(buf, offset, l as u64)
        }
        SizeRule::TwoCStrings => {
            let pattern_end = cstring_end(buf, offset)?;
            let options_end = cstring_end(buf, pattern_end)?;
            Ok((options_end - offset) as u32)
        }
        SizeRule::DbPointer => {
            let l = i32_at(buf, offset)?;
            if l < 1 {
                return Err(BsonError::MalformedString(l));
            }
            ensure(buf, offset, 4 + l as u64 + 12)
        }
    }
}

/// Advances the reader past exactly one value without constructing it.
pub fn skip_value(tag: Tag, reader: &mut Reader<'_>) -> Result<(), BsonError> {
    let size = value_size(tag, &reader.data[..reader.end], reader.x)?;
    reader.skip(size as usize)?;
    Ok(())
}
