//! Field index: one-pass scan, hash-sorted entries, binary-search lookup.

use lazybson_buffers::Reader;

use crate::error::BsonError;
use crate::size::{value_size, MIN_DOCUMENT_LEN};
use crate::tag::Tag;

/// Stable 32-bit FNV-1a over the raw name bytes. The same function is used
/// at index build and at field lookup.
#[inline]
pub(crate) fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for &b in bytes {
        hash ^= b as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// One indexed top-level element.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldEntry {
    pub name_offset: u32,
    pub name_len: u32,
    pub name_hash: u32,
    pub value_offset: u32,
    pub value_size: u32,
    pub tag: Tag,
}

impl FieldEntry {
    pub(crate) fn name_span(&self) -> std::ops::Range<usize> {
        self.name_offset as usize..(self.name_offset + self.name_len) as usize
    }

    pub(crate) fn value_span(&self) -> std::ops::Range<usize> {
        self.value_offset as usize..(self.value_offset + self.value_size) as usize
    }
}

/// Validates the document frame at `offset`: minimum length, fit within the
/// buffer, trailing `0x00`. Returns the declared length.
pub(crate) fn frame_len(buf: &[u8], offset: usize) -> Result<usize, BsonError> {
    if offset + 4 > buf.len() {
        return Err(BsonError::BufferUnderflow {
            position: offset,
            required: 4,
            available: buf.len().saturating_sub(offset),
        });
    }
    let declared = i32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ]);
    if (declared as i64) < MIN_DOCUMENT_LEN as i64 {
        return Err(BsonError::FrameMismatch {
            declared: declared as i64,
            actual: MIN_DOCUMENT_LEN,
            boundary: offset,
        });
    }
    let declared = declared as usize;
    if offset + declared > buf.len() {
        return Err(BsonError::BufferUnderflow {
            position: offset,
            required: declared,
            available: buf.len() - offset,
        });
    }
    if buf[offset + declared - 1] != 0 {
        return Err(BsonError::FrameMismatch {
            declared: declared as i64,
            actual: declared,
            boundary: offset + declared - 1,
        });
    }
    Ok(declared)
}

/// Walks every element of the document at `offset`, calling `visit` with
/// `(tag, name_offset, name_len, value_offset, value_size)`. Values are
/// sized, never parsed. Returns the declared document length.
pub(crate) fn scan_elements<F>(buf: &[u8], offset: usize, mut visit: F) -> Result<usize, BsonError>
where
    F: FnMut(Tag, usize, usize, usize, u32) -> Result<(), BsonError>,
{
    let declared = frame_len(buf, offset)?;
    let end = offset + declared;
    let mut reader = Reader::from_slice(buf, offset + 4, end);
    loop {
        let byte = reader.u8()?;
        if byte == 0 {
            // The terminator must be the frame's last byte.
            if reader.x != end {
                return Err(BsonError::FrameMismatch {
                    declared: declared as i64,
                    actual: reader.x - offset,
                    boundary: reader.x,
                });
            }
            break;
        }
        let tag = Tag::from_u8(byte)?;
        let (name_offset, name_len) = reader.skip_cstr()?;
        let value_offset = reader.x;
        let size = value_size(tag, buf, value_offset)?;
        let value_end = value_offset + size as usize;
        if value_end > end - 1 {
            return Err(BsonError::FrameMismatch {
                declared: declared as i64,
                actual: value_end - offset,
                boundary: value_offset,
            });
        }
        visit(tag, name_offset, name_len, value_offset, size)?;
        reader.skip(size as usize)?;
    }
    Ok(declared)
}

/// Builds the field index for the document at `offset`: one scan, then a
/// stable sort by name hash so equal hashes keep declaration order.
pub(crate) fn build_index(
    buf: &[u8],
    offset: usize,
) -> Result<(usize, Vec<FieldEntry>), BsonError> {
    let mut entries: Vec<FieldEntry> = Vec::new();
    let declared = scan_elements(buf, offset, |tag, name_offset, name_len, value_offset, size| {
        let name = &buf[name_offset..name_offset + name_len];
        if std::str::from_utf8(name).is_err() {
            return Err(BsonError::InvalidUtf8);
        }
        entries.push(FieldEntry {
            name_offset: name_offset as u32,
            name_len: name_len as u32,
            name_hash: fnv1a(name),
            value_offset: value_offset as u32,
            value_size: size,
            tag,
        });
        Ok(())
    })?;
    entries.sort_by_key(|e| e.name_hash);
    Ok((declared, entries))
}

/// Binary search by hash, then a linear probe over the contiguous run of
/// equal hashes with byte-wise name comparison.
pub(crate) fn lookup(entries: &[FieldEntry], buf: &[u8], name: &str) -> Option<usize> {
    let hash = fnv1a(name.as_bytes());
    let mut i = entries.partition_point(|e| e.name_hash < hash);
    while i < entries.len() && entries[i].name_hash == hash {
        if &buf[entries[i].name_span()] == name.as_bytes() {
            return Some(i);
        }
        i += 1;
    }
    None
}
