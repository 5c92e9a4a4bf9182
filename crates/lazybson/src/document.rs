//! Indexed, lazily-evaluated document view.

use std::collections::HashSet;

use once_cell::unsync::OnceCell;

use lazybson_buffers::Reader;

use crate::array::{ArrayView, ElementType, TypedArray};
use crate::error::BsonError;
use crate::index::{build_index, lookup, FieldEntry};
use crate::json;
use crate::parse::parse_value;
use crate::tag::Tag;
use crate::value::{Binary, BsonValue, Decimal128, ObjectId, Timestamp};

/// A zero-copy read handle over one BSON document.
///
/// Construction scans the document once, recording each field's name span,
/// type tag and value span in an index sorted by name hash. Typed accessors
/// binary-search the index and parse the value at its recorded offset on
/// first access, caching the result; nested documents and arrays come back
/// as child views over the same buffer.
///
/// A `Document` is immutable but its lazy cache is not synchronized: it is
/// `!Sync`, and concurrent typed access to a single view requires external
/// synchronization. Separate views over the same buffer can be used from any
/// number of threads.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    buf: &'a [u8],
    offset: usize,
    len: usize,
    index: Vec<FieldEntry>,
    cache: Vec<OnceCell<BsonValue<'a>>>,
}

impl<'a> PartialEq for Document<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.to_bson() == other.to_bson()
    }
}

/// Builds an indexed view over `bytes`. Zero-copy, O(n) over the document
/// bytes; values are not parsed.
pub fn parse(bytes: &[u8]) -> Result<Document<'_>, BsonError> {
    Document::parse_at(bytes, 0)
}

impl<'a> Document<'a> {
    /// Builds an indexed view over the document starting at `offset`.
    pub(crate) fn parse_at(buf: &'a [u8], offset: usize) -> Result<Self, BsonError> {
        let (len, index) = build_index(buf, offset)?;
        let cache = index.iter().map(|_| OnceCell::new()).collect();
        Ok(Self {
            buf,
            offset,
            len,
            index,
            cache,
        })
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Byte length of the document frame.
    pub(crate) fn byte_len(&self) -> usize {
        self.len
    }

    /// The exact original byte range of this document. Round-trip law:
    /// `parse(b).to_bson() == b[..len]`.
    pub fn to_bson(&self) -> &'a [u8] {
        &self.buf[self.offset..self.offset + self.len]
    }

    /// Debug-only JSON rendering. Types without a textual form emit
    /// `$`-prefixed placeholders; see the crate documentation.
    pub fn to_json(&self) -> Result<String, BsonError> {
        json::document_to_json(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        lookup(&self.index, self.buf, name).is_some()
    }

    /// The wire tag of the named field, `None` when absent. Undefined fields
    /// report `Tag::Undefined` even though they decode to null.
    pub fn type_of(&self, name: &str) -> Option<Tag> {
        lookup(&self.index, self.buf, name).map(|i| self.index[i].tag)
    }

    /// True when the field is present and null (or the deprecated
    /// undefined).
    pub fn is_null(&self, name: &str) -> bool {
        matches!(self.type_of(name), Some(Tag::Null) | Some(Tag::Undefined))
    }

    /// The set of top-level field names.
    pub fn field_names(&self) -> HashSet<&'a str> {
        self.index.iter().map(|e| self.name_of_entry(e)).collect()
    }

    fn name_of_entry(&self, entry: &FieldEntry) -> &'a str {
        // Name bytes were UTF-8 validated during the index build.
        std::str::from_utf8(&self.buf[entry.name_span()]).unwrap_or("")
    }

    fn name_at(&self, i: usize) -> &'a str {
        self.name_of_entry(&self.index[i])
    }

    /// Parses (or returns the cached) value for index slot `i`.
    fn value_at(&self, i: usize) -> Result<&BsonValue<'a>, BsonError> {
        let entry = &self.index[i];
        self.cache[i].get_or_try_init(|| {
            let span = entry.value_span();
            let mut reader = Reader::from_slice(self.buf, span.start, span.end);
            parse_value(entry.tag, &mut reader).map_err(|e| e.in_field(self.name_at(i)))
        })
    }

    fn index_of(&self, name: &str) -> Result<usize, BsonError> {
        lookup(&self.index, self.buf, name)
            .ok_or_else(|| BsonError::FieldNotFound(name.to_string()))
    }

    fn expect_tag(&self, name: &str, i: usize, requested: Tag) -> Result<(), BsonError> {
        let actual = self.index[i].tag;
        if actual != requested {
            return Err(BsonError::TypeMismatch {
                field: name.to_string(),
                requested,
                actual,
            });
        }
        Ok(())
    }

    /// Generic access: the decoded value of the named field.
    pub fn get(&self, name: &str) -> Result<&BsonValue<'a>, BsonError> {
        let i = self.index_of(name)?;
        self.value_at(i)
    }

    /// Generic access that distinguishes absence from decode failure.
    pub fn try_get(&self, name: &str) -> Result<Option<&BsonValue<'a>>, BsonError> {
        match lookup(&self.index, self.buf, name) {
            Some(i) => self.value_at(i).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_f64(&self, name: &str) -> Result<f64, BsonError> {
        let i = self.index_of(name)?;
        self.expect_tag(name, i, Tag::Double)?;
        match self.value_at(i)? {
            BsonValue::Double(v) => Ok(*v),
            other => Err(self.unexpected(name, Tag::Double, other)),
        }
    }

    pub fn get_i32(&self, name: &str) -> Result<i32, BsonError> {
        let i = self.index_of(name)?;
        self.expect_tag(name, i, Tag::Int32)?;
        match self.value_at(i)? {
            BsonValue::Int32(v) => Ok(*v),
            other => Err(self.unexpected(name, Tag::Int32, other)),
        }
    }

    pub fn get_i64(&self, name: &str) -> Result<i64, BsonError> {
        let i = self.index_of(name)?;
        self.expect_tag(name, i, Tag::Int64)?;
        match self.value_at(i)? {
            BsonValue::Int64(v) => Ok(*v),
            other => Err(self.unexpected(name, Tag::Int64, other)),
        }
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, BsonError> {
        let i = self.index_of(name)?;
        self.expect_tag(name, i, Tag::Boolean)?;
        match self.value_at(i)? {
            BsonValue::Boolean(v) => Ok(*v),
            other => Err(self.unexpected(name, Tag::Boolean, other)),
        }
    }

    /// Borrowed string access; the returned slice points into the buffer.
    pub fn get_str(&self, name: &str) -> Result<&'a str, BsonError> {
        let i = self.index_of(name)?;
        self.expect_tag(name, i, Tag::String)?;
        match self.value_at(i)? {
            BsonValue::Str(v) => Ok(v),
            other => Err(self.unexpected(name, Tag::String, other)),
        }
    }

    /// UTC datetime as milliseconds since epoch.
    pub fn get_datetime(&self, name: &str) -> Result<i64, BsonError> {
        let i = self.index_of(name)?;
        self.expect_tag(name, i, Tag::DateTime)?;
        match self.value_at(i)? {
            BsonValue::DateTime(v) => Ok(*v),
            other => Err(self.unexpected(name, Tag::DateTime, other)),
        }
    }

    pub fn get_object_id(&self, name: &str) -> Result<ObjectId, BsonError> {
        let i = self.index_of(name)?;
        self.expect_tag(name, i, Tag::ObjectId)?;
        match self.value_at(i)? {
            BsonValue::ObjectId(v) => Ok(*v),
            other => Err(self.unexpected(name, Tag::ObjectId, other)),
        }
    }

    /// ObjectId rendered as a 24-hex-digit lowercase string.
    pub fn get_object_id_hex(&self, name: &str) -> Result<String, BsonError> {
        self.get_object_id(name).map(|id| id.to_hex())
    }

    pub fn get_timestamp(&self, name: &str) -> Result<Timestamp, BsonError> {
        let i = self.index_of(name)?;
        self.expect_tag(name, i, Tag::Timestamp)?;
        match self.value_at(i)? {
            BsonValue::Timestamp(v) => Ok(*v),
            other => Err(self.unexpected(name, Tag::Timestamp, other)),
        }
    }

    pub fn get_binary(&self, name: &str) -> Result<Binary<'a>, BsonError> {
        let i = self.index_of(name)?;
        self.expect_tag(name, i, Tag::Binary)?;
        match self.value_at(i)? {
            BsonValue::Binary(v) => Ok(*v),
            other => Err(self.unexpected(name, Tag::Binary, other)),
        }
    }

    pub fn get_decimal128(&self, name: &str) -> Result<Decimal128, BsonError> {
        let i = self.index_of(name)?;
        self.expect_tag(name, i, Tag::Decimal128)?;
        match self.value_at(i)? {
            BsonValue::Decimal128(v) => Ok(*v),
            other => Err(self.unexpected(name, Tag::Decimal128, other)),
        }
    }

    /// Child document view over the same buffer. The child's index is built
    /// on first access, not at parent construction; repeated calls return
    /// the same cached view.
    pub fn get_document(&self, name: &str) -> Result<&Document<'a>, BsonError> {
        let i = self.index_of(name)?;
        self.expect_tag(name, i, Tag::Document)?;
        match self.value_at(i)? {
            BsonValue::Document(v) => Ok(v),
            other => {
                let tag = other.tag();
                Err(BsonError::TypeMismatch {
                    field: name.to_string(),
                    requested: Tag::Document,
                    actual: tag,
                })
            }
        }
    }

    /// Child array view over the same buffer; same laziness as
    /// [`Document::get_document`].
    pub fn get_array(&self, name: &str) -> Result<&ArrayView<'a>, BsonError> {
        let i = self.index_of(name)?;
        self.expect_tag(name, i, Tag::Array)?;
        match self.value_at(i)? {
            BsonValue::Array(v) => Ok(v),
            other => {
                let tag = other.tag();
                Err(BsonError::TypeMismatch {
                    field: name.to_string(),
                    requested: Tag::Array,
                    actual: tag,
                })
            }
        }
    }

    /// Array decoded through the homogeneous fast path when `hint` names an
    /// element type; byte-exact equivalent to the generic path.
    pub fn get_typed_array(
        &self,
        name: &str,
        hint: ElementType,
    ) -> Result<TypedArray<'a>, BsonError> {
        self.get_array(name)?
            .decode_typed(hint)
            .map_err(|e| e.in_field(name))
    }

    fn unexpected(&self, name: &str, requested: Tag, value: &BsonValue<'a>) -> BsonError {
        BsonError::TypeMismatch {
            field: name.to_string(),
            requested,
            actual: value.tag(),
        }
    }

    // ------------------------------------------------------------------
    // expected-or-default variants: return the supplied default on both
    // absence and type mismatch.
    // ------------------------------------------------------------------

    pub fn get_f64_or(&self, name: &str, default: f64) -> f64 {
        self.get_f64(name).unwrap_or(default)
    }

    pub fn get_i32_or(&self, name: &str, default: i32) -> i32 {
        self.get_i32(name).unwrap_or(default)
    }

    pub fn get_i64_or(&self, name: &str, default: i64) -> i64 {
        self.get_i64(name).unwrap_or(default)
    }

    pub fn get_bool_or(&self, name: &str, default: bool) -> bool {
        self.get_bool(name).unwrap_or(default)
    }

    pub fn get_str_or(&self, name: &str, default: &'a str) -> &'a str {
        self.get_str(name).unwrap_or(default)
    }

    pub fn get_datetime_or(&self, name: &str, default: i64) -> i64 {
        self.get_datetime(name).unwrap_or(default)
    }

    /// Iterates `(name, tag)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&'a str, Tag)> + '_ {
        let mut by_offset: Vec<&FieldEntry> = self.index.iter().collect();
        by_offset.sort_by_key(|e| e.value_offset);
        by_offset
            .into_iter()
            .map(|e| (self.name_of_entry(e), e.tag))
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// Like [`Document::fields`] but yields the decoded values too;
    /// `to_json` and the eager-equivalence tests walk documents this way.
    pub fn entries(&self) -> Result<Vec<(&'a str, &BsonValue<'a>)>, BsonError> {
        let mut order: Vec<usize> = (0..self.index.len()).collect();
        order.sort_by_key(|&i| self.index[i].value_offset);
        let mut out = Vec::with_capacity(order.len());
        for i in order {
            out.push((self.name_at(i), self.value_at(i)?));
        }
        Ok(out)
    }
}
