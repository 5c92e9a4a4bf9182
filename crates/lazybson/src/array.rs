//! Array view and the homogeneous-array fast path.

use once_cell::unsync::OnceCell;

use lazybson_buffers::Reader;

use crate::error::BsonError;
use crate::index::scan_elements;
use crate::parse::parse_value;
use crate::tag::Tag;
use crate::value::BsonValue;

/// Per-field hint declaring an array's uniform element type. `Auto` detects
/// from the first element and falls back to the generic path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementType {
    #[default]
    Auto,
    Int32,
    Int64,
    Double,
    Bool,
}

/// Result of a typed array decode: a contiguous primitive buffer on the
/// fast path, generic values otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray<'a> {
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Double(Vec<f64>),
    Bool(Vec<bool>),
    Mixed(Vec<BsonValue<'a>>),
}

#[derive(Debug, Clone, Copy)]
struct ArrayEntry {
    tag: Tag,
    value_offset: u32,
    value_size: u32,
}

impl ArrayEntry {
    fn value_span(&self) -> std::ops::Range<usize> {
        self.value_offset as usize..(self.value_offset + self.value_size) as usize
    }
}

/// A zero-copy view over one BSON array.
///
/// Arrays use document framing with decimal-ASCII keys `"0"`, `"1"`, …; the
/// keys are scanned past and discarded, only element positions are kept.
/// Same laziness and caching discipline as [`crate::Document`].
#[derive(Debug, Clone)]
pub struct ArrayView<'a> {
    buf: &'a [u8],
    offset: usize,
    len: usize,
    entries: Vec<ArrayEntry>,
    cache: Vec<OnceCell<BsonValue<'a>>>,
}

impl<'a> PartialEq for ArrayView<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.to_bson() == other.to_bson()
    }
}

impl<'a> ArrayView<'a> {
    pub(crate) fn parse_at(buf: &'a [u8], offset: usize) -> Result<Self, BsonError> {
        let mut entries: Vec<ArrayEntry> = Vec::new();
        let len = scan_elements(buf, offset, |tag, _, _, value_offset, size| {
            entries.push(ArrayEntry {
                tag,
                value_offset: value_offset as u32,
                value_size: size,
            });
            Ok(())
        })?;
        let cache = entries.iter().map(|_| OnceCell::new()).collect();
        Ok(Self {
            buf,
            offset,
            len,
            entries,
            cache,
        })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn byte_len(&self) -> usize {
        self.len
    }

    /// The exact original byte range of this array.
    pub fn to_bson(&self) -> &'a [u8] {
        &self.buf[self.offset..self.offset + self.len]
    }

    /// The wire tag of element `i`, `None` when out of range.
    pub fn tag_of(&self, i: usize) -> Option<Tag> {
        self.entries.get(i).map(|e| e.tag)
    }

    /// The decoded value of element `i`, parsed on first access and cached.
    pub fn value(&self, i: usize) -> Result<&BsonValue<'a>, BsonError> {
        let entry = self
            .entries
            .get(i)
            .ok_or_else(|| BsonError::FieldNotFound(i.to_string()))?;
        self.cache[i].get_or_try_init(|| {
            let span = entry.value_span();
            let mut reader = Reader::from_slice(self.buf, span.start, span.end);
            parse_value(entry.tag, &mut reader).map_err(|e| e.in_field(&i.to_string()))
        })
    }

    /// Iterates the decoded values in order.
    pub fn iter(&self) -> impl Iterator<Item = Result<&BsonValue<'a>, BsonError>> + '_ {
        (0..self.entries.len()).map(move |i| self.value(i))
    }

    /// All decoded values in order.
    pub fn values(&self) -> Result<Vec<&BsonValue<'a>>, BsonError> {
        self.iter().collect()
    }

    fn check_tag(&self, i: usize, expected: Tag) -> Result<(), BsonError> {
        let got = self.entries[i].tag;
        if got != expected {
            return Err(BsonError::HeterogeneousArray {
                index: i,
                expected,
                got,
            });
        }
        Ok(())
    }

    /// Bulk-decodes an all-int32 array straight from the buffer, no
    /// per-element dispatch or boxing.
    pub fn to_i32_vec(&self) -> Result<Vec<i32>, BsonError> {
        let mut out = Vec::with_capacity(self.entries.len());
        for i in 0..self.entries.len() {
            self.check_tag(i, Tag::Int32)?;
            let o = self.entries[i].value_offset as usize;
            out.push(i32::from_le_bytes([
                self.buf[o],
                self.buf[o + 1],
                self.buf[o + 2],
                self.buf[o + 3],
            ]));
        }
        Ok(out)
    }

    /// Bulk-decodes an all-int64 array straight from the buffer.
    pub fn to_i64_vec(&self) -> Result<Vec<i64>, BsonError> {
        let mut out = Vec::with_capacity(self.entries.len());
        for i in 0..self.entries.len() {
            self.check_tag(i, Tag::Int64)?;
            let o = self.entries[i].value_offset as usize;
            out.push(i64::from_le_bytes([
                self.buf[o],
                self.buf[o + 1],
                self.buf[o + 2],
                self.buf[o + 3],
                self.buf[o + 4],
                self.buf[o + 5],
                self.buf[o + 6],
                self.buf[o + 7],
            ]));
        }
        Ok(out)
    }

    /// Bulk-decodes an all-double array straight from the buffer.
    pub fn to_f64_vec(&self) -> Result<Vec<f64>, BsonError> {
        let mut out = Vec::with_capacity(self.entries.len());
        for i in 0..self.entries.len() {
            self.check_tag(i, Tag::Double)?;
            let o = self.entries[i].value_offset as usize;
            out.push(f64::from_le_bytes([
                self.buf[o],
                self.buf[o + 1],
                self.buf[o + 2],
                self.buf[o + 3],
                self.buf[o + 4],
                self.buf[o + 5],
                self.buf[o + 6],
                self.buf[o + 7],
            ]));
        }
        Ok(out)
    }

    /// Bulk-decodes an all-boolean array straight from the buffer.
    pub fn to_bool_vec(&self) -> Result<Vec<bool>, BsonError> {
        let mut out = Vec::with_capacity(self.entries.len());
        for i in 0..self.entries.len() {
            self.check_tag(i, Tag::Boolean)?;
            let o = self.entries[i].value_offset as usize;
            match self.buf[o] {
                0x00 => out.push(false),
                0x01 => out.push(true),
                byte => return Err(BsonError::InvalidBoolean(byte)),
            }
        }
        Ok(out)
    }

    /// Decodes with an element-type hint. A named hint takes the fast path
    /// and fails `HeterogeneousArray` when the array does not conform;
    /// `Auto` inspects the element tags and falls back to generic values.
    pub fn decode_typed(&self, hint: ElementType) -> Result<TypedArray<'a>, BsonError> {
        match hint {
            ElementType::Int32 => self.to_i32_vec().map(TypedArray::Int32),
            ElementType::Int64 => self.to_i64_vec().map(TypedArray::Int64),
            ElementType::Double => self.to_f64_vec().map(TypedArray::Double),
            ElementType::Bool => self.to_bool_vec().map(TypedArray::Bool),
            ElementType::Auto => {
                let detected = self.detect_uniform_tag();
                match detected {
                    Some(Tag::Int32) => self.to_i32_vec().map(TypedArray::Int32),
                    Some(Tag::Int64) => self.to_i64_vec().map(TypedArray::Int64),
                    Some(Tag::Double) => self.to_f64_vec().map(TypedArray::Double),
                    Some(Tag::Boolean) => self.to_bool_vec().map(TypedArray::Bool),
                    _ => {
                        let values = self.values()?;
                        Ok(TypedArray::Mixed(values.into_iter().cloned().collect()))
                    }
                }
            }
        }
    }

    fn detect_uniform_tag(&self) -> Option<Tag> {
        let first = self.entries.first()?.tag;
        if self.entries.iter().all(|e| e.tag == first) {
            Some(first)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;
    use crate::testutil::RawDoc;

    fn int64_array() -> Vec<u8> {
        RawDoc::new()
            .array(
                "timestamps",
                RawDoc::new()
                    .int64("0", 1_609_459_200_000)
                    .int64("1", 1_609_545_600_000)
                    .int64("2", 1_609_632_000_000),
            )
            .bytes()
    }

    #[test]
    fn generic_and_fast_paths_agree() {
        let bytes = int64_array();
        let doc = parse(&bytes).unwrap();
        let arr = doc.get_array("timestamps").unwrap();
        let fast = arr.to_i64_vec().unwrap();
        assert_eq!(
            fast,
            vec![1_609_459_200_000, 1_609_545_600_000, 1_609_632_000_000]
        );
        let generic: Vec<i64> = arr
            .values()
            .unwrap()
            .into_iter()
            .map(|v| match v {
                BsonValue::Int64(n) => *n,
                other => panic!("expected int64, got {other:?}"),
            })
            .collect();
        assert_eq!(generic, fast);
    }

    #[test]
    fn heterogeneous_array_reports_index_and_tags() {
        let bytes = RawDoc::new()
            .array(
                "xs",
                RawDoc::new().int64("0", 1).string("1", "oops").int64("2", 3),
            )
            .bytes();
        let doc = parse(&bytes).unwrap();
        let arr = doc.get_array("xs").unwrap();
        assert_eq!(
            arr.to_i64_vec(),
            Err(BsonError::HeterogeneousArray {
                index: 1,
                expected: Tag::Int64,
                got: Tag::String,
            })
        );
    }

    #[test]
    fn auto_hint_detects_uniform_type() {
        let bytes = int64_array();
        let doc = parse(&bytes).unwrap();
        let arr = doc.get_array("timestamps").unwrap();
        match arr.decode_typed(ElementType::Auto).unwrap() {
            TypedArray::Int64(v) => assert_eq!(v.len(), 3),
            other => panic!("expected Int64, got {other:?}"),
        }
    }

    #[test]
    fn auto_hint_falls_back_to_mixed() {
        let bytes = RawDoc::new()
            .array("xs", RawDoc::new().int32("0", 1).string("1", "two"))
            .bytes();
        let doc = parse(&bytes).unwrap();
        let arr = doc.get_array("xs").unwrap();
        match arr.decode_typed(ElementType::Auto).unwrap() {
            TypedArray::Mixed(values) => {
                assert_eq!(values.len(), 2);
                assert_eq!(values[0], BsonValue::Int32(1));
                assert_eq!(values[1], BsonValue::Str("two"));
            }
            other => panic!("expected Mixed, got {other:?}"),
        }
    }

    #[test]
    fn empty_array() {
        let bytes = RawDoc::new().array("xs", RawDoc::new()).bytes();
        let doc = parse(&bytes).unwrap();
        let arr = doc.get_array("xs").unwrap();
        assert!(arr.is_empty());
        assert_eq!(arr.to_i64_vec(), Ok(vec![]));
    }

    #[test]
    fn bool_fast_path_validates_bytes() {
        let bytes = RawDoc::new()
            .array("flags", RawDoc::new().bool("0", true).bool_raw("1", 0x05))
            .bytes();
        let doc = parse(&bytes).unwrap();
        let arr = doc.get_array("flags").unwrap();
        assert_eq!(arr.to_bool_vec(), Err(BsonError::InvalidBoolean(0x05)));
    }

    #[test]
    fn array_to_bson_roundtrips() {
        let inner = RawDoc::new().int32("0", 7).int32("1", 8);
        let inner_bytes = inner.bytes();
        let bytes = RawDoc::new().array("xs", inner).bytes();
        let doc = parse(&bytes).unwrap();
        let arr = doc.get_array("xs").unwrap();
        assert_eq!(arr.to_bson(), &inner_bytes[..]);
    }

    #[test]
    fn value_out_of_range() {
        let bytes = RawDoc::new().array("xs", RawDoc::new().int32("0", 1)).bytes();
        let doc = parse(&bytes).unwrap();
        let arr = doc.get_array("xs").unwrap();
        assert!(arr.value(0).is_ok());
        assert_eq!(arr.value(5), Err(BsonError::FieldNotFound("5".into())));
    }
}
