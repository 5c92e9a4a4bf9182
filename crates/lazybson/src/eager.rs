//! Eager decoding: owned values, the sequential decoder, and document
//! factories.
//!
//! The eager decoder materializes every field in one pass. It is the
//! "straightforward sequential decoder" the indexed view is tested against,
//! and the representation of choice when decoded values must outlive the
//! input buffer. Nested documents recurse with a hard depth bound; the lazy
//! view path never recurses during indexing.

use lazybson_buffers::Reader;

use crate::document::{parse, Document};
use crate::error::BsonError;
use crate::index::frame_len;
use crate::parse::read_string;
use crate::tag::Tag;
use crate::value::{Decimal128, ObjectId, Timestamp};

/// Recursion bound for eager decoding of nested documents.
pub const MAX_DEPTH: usize = 256;

/// A fully-materialized BSON value with no ties to the input buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedValue {
    Double(f64),
    Str(String),
    Document(Vec<(String, OwnedValue)>),
    Array(Vec<OwnedValue>),
    Binary { subtype: u8, data: Vec<u8> },
    ObjectId(ObjectId),
    Boolean(bool),
    DateTime(i64),
    Null,
    Regex { pattern: String, options: String },
    DbPointer { name: String, id: ObjectId },
    JavaScript(String),
    Symbol(String),
    JavaScriptWithScope {
        code: String,
        scope: Vec<(String, OwnedValue)>,
    },
    Int32(i32),
    Timestamp(Timestamp),
    Int64(i64),
    Decimal128(Decimal128),
    MinKey,
    MaxKey,
}

impl OwnedValue {
    pub fn tag(&self) -> Tag {
        match self {
            OwnedValue::Double(_) => Tag::Double,
            OwnedValue::Str(_) => Tag::String,
            OwnedValue::Document(_) => Tag::Document,
            OwnedValue::Array(_) => Tag::Array,
            OwnedValue::Binary { .. } => Tag::Binary,
            OwnedValue::ObjectId(_) => Tag::ObjectId,
            OwnedValue::Boolean(_) => Tag::Boolean,
            OwnedValue::DateTime(_) => Tag::DateTime,
            OwnedValue::Null => Tag::Null,
            OwnedValue::Regex { .. } => Tag::Regex,
            OwnedValue::DbPointer { .. } => Tag::DbPointer,
            OwnedValue::JavaScript(_) => Tag::JavaScript,
            OwnedValue::Symbol(_) => Tag::Symbol,
            OwnedValue::JavaScriptWithScope { .. } => Tag::JavaScriptWithScope,
            OwnedValue::Int32(_) => Tag::Int32,
            OwnedValue::Timestamp(_) => Tag::Timestamp,
            OwnedValue::Int64(_) => Tag::Int64,
            OwnedValue::Decimal128(_) => Tag::Decimal128,
            OwnedValue::MinKey => Tag::MinKey,
            OwnedValue::MaxKey => Tag::MaxKey,
        }
    }
}

/// Eagerly decodes a whole document into owned field pairs in declaration
/// order.
pub fn decode_fields(bytes: &[u8]) -> Result<Vec<(String, OwnedValue)>, BsonError> {
    let mut reader = Reader::new(bytes);
    read_document(&mut reader, 0)
}

/// Eagerly decodes a whole document and wraps it with the typed accessor
/// surface.
pub fn decode_owned(bytes: &[u8]) -> Result<EagerDocument, BsonError> {
    decode_fields(bytes).map(|fields| EagerDocument { fields })
}

fn read_document(
    reader: &mut Reader<'_>,
    depth: usize,
) -> Result<Vec<(String, OwnedValue)>, BsonError> {
    if depth > MAX_DEPTH {
        return Err(BsonError::DepthLimitExceeded(MAX_DEPTH));
    }
    let declared = frame_len(&reader.data[..reader.end], reader.x)?;
    let end = reader.x + declared;
    reader.skip(4)?;
    let mut fields: Vec<(String, OwnedValue)> = Vec::new();
    loop {
        let byte = reader.u8()?;
        if byte == 0 {
            if reader.x != end {
                return Err(BsonError::FrameMismatch {
                    declared: declared as i64,
                    actual: reader.x - (end - declared),
                    boundary: reader.x,
                });
            }
            break;
        }
        let tag = Tag::from_u8(byte)?;
        let name = reader.cstr()?.to_string();
        let value = read_value(reader, tag, depth).map_err(|e| e.in_field(&name))?;
        fields.push((name, value));
    }
    Ok(fields)
}

fn read_array(reader: &mut Reader<'_>, depth: usize) -> Result<Vec<OwnedValue>, BsonError> {
    if depth > MAX_DEPTH {
        return Err(BsonError::DepthLimitExceeded(MAX_DEPTH));
    }
    let declared = frame_len(&reader.data[..reader.end], reader.x)?;
    let end = reader.x + declared;
    reader.skip(4)?;
    let mut items: Vec<OwnedValue> = Vec::new();
    loop {
        let byte = reader.u8()?;
        if byte == 0 {
            if reader.x != end {
                return Err(BsonError::FrameMismatch {
                    declared: declared as i64,
                    actual: reader.x - (end - declared),
                    boundary: reader.x,
                });
            }
            break;
        }
        let tag = Tag::from_u8(byte)?;
        // Index keys are known to be "0", "1", … and are discarded.
        reader.skip_cstr()?;
        items.push(read_value(reader, tag, depth)?);
    }
    Ok(items)
}

fn read_object_id(reader: &mut Reader<'_>) -> Result<ObjectId, BsonError> {
    let bytes = reader.buf(12)?;
    let mut id = [0u8; 12];
    id.copy_from_slice(bytes);
    Ok(ObjectId(id))
}

fn read_value(reader: &mut Reader<'_>, tag: Tag, depth: usize) -> Result<OwnedValue, BsonError> {
    match tag {
        Tag::Double => Ok(OwnedValue::Double(reader.f64_le()?)),
        Tag::String => Ok(OwnedValue::Str(read_string(reader)?.to_string())),
        Tag::Document => Ok(OwnedValue::Document(read_document(reader, depth + 1)?)),
        Tag::Array => Ok(OwnedValue::Array(read_array(reader, depth + 1)?)),
        Tag::Binary => {
            let l = reader.i32_le()?;
            if l < 0 {
                return Err(BsonError::MalformedString(l));
            }
            let subtype = reader.u8()?;
            let data = reader.buf_owned(l as usize)?;
            Ok(OwnedValue::Binary { subtype, data })
        }
        Tag::Undefined | Tag::Null => Ok(OwnedValue::Null),
        Tag::ObjectId => Ok(OwnedValue::ObjectId(read_object_id(reader)?)),
        Tag::Boolean => match reader.u8()? {
            0x00 => Ok(OwnedValue::Boolean(false)),
            0x01 => Ok(OwnedValue::Boolean(true)),
            byte => Err(BsonError::InvalidBoolean(byte)),
        },
        Tag::DateTime => Ok(OwnedValue::DateTime(reader.i64_le()?)),
        Tag::Regex => {
            let pattern = reader.cstr()?.to_string();
            let options = reader.cstr()?.to_string();
            Ok(OwnedValue::Regex { pattern, options })
        }
        Tag::DbPointer => {
            let name = read_string(reader)?.to_string();
            let id = read_object_id(reader)?;
            Ok(OwnedValue::DbPointer { name, id })
        }
        Tag::JavaScript => Ok(OwnedValue::JavaScript(read_string(reader)?.to_string())),
        Tag::Symbol => Ok(OwnedValue::Symbol(read_string(reader)?.to_string())),
        Tag::JavaScriptWithScope => {
            let start = reader.position();
            let total = reader.i32_le()?;
            let code = read_string(reader)?.to_string();
            let scope = read_document(reader, depth + 1)?;
            let consumed = reader.position() - start;
            if consumed != total as usize {
                return Err(BsonError::FrameMismatch {
                    declared: total as i64,
                    actual: consumed,
                    boundary: start,
                });
            }
            Ok(OwnedValue::JavaScriptWithScope { code, scope })
        }
        Tag::Int32 => Ok(OwnedValue::Int32(reader.i32_le()?)),
        Tag::Timestamp => {
            let increment = reader.u32_le()?;
            let seconds = reader.u32_le()?;
            Ok(OwnedValue::Timestamp(Timestamp { seconds, increment }))
        }
        Tag::Int64 => Ok(OwnedValue::Int64(reader.i64_le()?)),
        Tag::Decimal128 => {
            let bytes = reader.buf(16)?;
            let mut raw = [0u8; 16];
            raw.copy_from_slice(bytes);
            Ok(OwnedValue::Decimal128(Decimal128(raw)))
        }
        Tag::MinKey => Ok(OwnedValue::MinKey),
        Tag::MaxKey => Ok(OwnedValue::MaxKey),
    }
}

/// Owned field pairs wrapped with the same typed accessor surface as the
/// indexed view. Field lookup is a linear scan in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct EagerDocument {
    fields: Vec<(String, OwnedValue)>,
}

impl EagerDocument {
    pub fn fields(&self) -> &[(String, OwnedValue)] {
        &self.fields
    }

    /// Debug-only JSON rendering; same placeholder policy as the view path.
    pub fn to_json(&self) -> String {
        crate::json::eager_to_json(self)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&OwnedValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    fn typed(&self, name: &str, requested: Tag) -> Result<&OwnedValue, BsonError> {
        let value = self
            .get(name)
            .ok_or_else(|| BsonError::FieldNotFound(name.to_string()))?;
        if value.tag() != requested {
            return Err(BsonError::TypeMismatch {
                field: name.to_string(),
                requested,
                actual: value.tag(),
            });
        }
        Ok(value)
    }

    pub fn get_f64(&self, name: &str) -> Result<f64, BsonError> {
        match self.typed(name, Tag::Double)? {
            OwnedValue::Double(v) => Ok(*v),
            _ => unreachable_mismatch(name, Tag::Double),
        }
    }

    pub fn get_i32(&self, name: &str) -> Result<i32, BsonError> {
        match self.typed(name, Tag::Int32)? {
            OwnedValue::Int32(v) => Ok(*v),
            _ => unreachable_mismatch(name, Tag::Int32),
        }
    }

    pub fn get_i64(&self, name: &str) -> Result<i64, BsonError> {
        match self.typed(name, Tag::Int64)? {
            OwnedValue::Int64(v) => Ok(*v),
            _ => unreachable_mismatch(name, Tag::Int64),
        }
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, BsonError> {
        match self.typed(name, Tag::Boolean)? {
            OwnedValue::Boolean(v) => Ok(*v),
            _ => unreachable_mismatch(name, Tag::Boolean),
        }
    }

    pub fn get_str(&self, name: &str) -> Result<&str, BsonError> {
        match self.typed(name, Tag::String)? {
            OwnedValue::Str(v) => Ok(v),
            _ => unreachable_mismatch(name, Tag::String),
        }
    }

    pub fn get_datetime(&self, name: &str) -> Result<i64, BsonError> {
        match self.typed(name, Tag::DateTime)? {
            OwnedValue::DateTime(v) => Ok(*v),
            _ => unreachable_mismatch(name, Tag::DateTime),
        }
    }

    pub fn get_document(&self, name: &str) -> Result<&[(String, OwnedValue)], BsonError> {
        match self.typed(name, Tag::Document)? {
            OwnedValue::Document(fields) => Ok(fields),
            _ => unreachable_mismatch(name, Tag::Document),
        }
    }

    pub fn get_array(&self, name: &str) -> Result<&[OwnedValue], BsonError> {
        match self.typed(name, Tag::Array)? {
            OwnedValue::Array(items) => Ok(items),
            _ => unreachable_mismatch(name, Tag::Array),
        }
    }
}

fn unreachable_mismatch<T>(name: &str, requested: Tag) -> Result<T, BsonError> {
    Err(BsonError::TypeMismatch {
        field: name.to_string(),
        requested,
        actual: requested,
    })
}

/// Selects the in-memory document representation. Semantic outputs are
/// identical across factories; only performance and memory differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFactory {
    /// Zero-copy indexed view with lazy per-field decoding.
    #[default]
    IndexedLazy,
    /// Eagerly decoded owned field pairs.
    EagerMap,
    /// Eagerly decoded pairs wrapped with typed accessors.
    EagerTypedMap,
}

/// The representation produced by a [`DocumentFactory`].
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<'a> {
    View(Document<'a>),
    Map(Vec<(String, OwnedValue)>),
    TypedMap(EagerDocument),
}

impl<'a> Decoded<'a> {
    /// Number of top-level fields, regardless of representation.
    pub fn len(&self) -> usize {
        match self {
            Decoded::View(doc) => doc.len(),
            Decoded::Map(fields) => fields.len(),
            Decoded::TypedMap(doc) => doc.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            Decoded::View(doc) => doc.contains(name),
            Decoded::Map(fields) => fields.iter().any(|(n, _)| n == name),
            Decoded::TypedMap(doc) => doc.contains(name),
        }
    }
}

impl DocumentFactory {
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Decoded<'a>, BsonError> {
        match self {
            DocumentFactory::IndexedLazy => parse(bytes).map(Decoded::View),
            DocumentFactory::EagerMap => decode_fields(bytes).map(Decoded::Map),
            DocumentFactory::EagerTypedMap => decode_owned(bytes).map(Decoded::TypedMap),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::RawDoc;

    fn nested_to_depth(depth: usize) -> Vec<u8> {
        let mut doc = RawDoc::new().int32("leaf", 1);
        for _ in 0..depth {
            doc = RawDoc::new().doc("d", doc);
        }
        doc.bytes()
    }

    #[test]
    fn decode_owned_basic() {
        let bytes = RawDoc::new()
            .string("name", "Alice")
            .int32("age", 30)
            .bytes();
        let doc = decode_owned(&bytes).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get_str("name"), Ok("Alice"));
        assert_eq!(doc.get_i32("age"), Ok(30));
    }

    #[test]
    fn decode_preserves_declaration_order() {
        let bytes = RawDoc::new()
            .int32("z", 1)
            .int32("a", 2)
            .int32("m", 3)
            .bytes();
        let fields = decode_fields(&bytes).unwrap();
        let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["z", "a", "m"]);
    }

    #[test]
    fn nested_document_and_array() {
        let bytes = RawDoc::new()
            .doc("user", RawDoc::new().string("name", "Bob"))
            .array("xs", RawDoc::new().int32("0", 1).int32("1", 2))
            .bytes();
        let doc = decode_owned(&bytes).unwrap();
        let user = doc.get_document("user").unwrap();
        assert_eq!(user[0].0, "name");
        assert_eq!(user[0].1, OwnedValue::Str("Bob".into()));
        let xs = doc.get_array("xs").unwrap();
        assert_eq!(xs, &[OwnedValue::Int32(1), OwnedValue::Int32(2)]);
    }

    #[test]
    fn depth_fifty_decodes() {
        let bytes = nested_to_depth(50);
        let mut doc = decode_owned(&bytes).unwrap();
        for _ in 0..50 {
            let inner = doc.get_document("d").unwrap().to_vec();
            doc = EagerDocument { fields: inner };
        }
        assert_eq!(doc.get_i32("leaf"), Ok(1));
    }

    #[test]
    fn depth_limit_enforced() {
        let bytes = nested_to_depth(MAX_DEPTH + 8);
        assert_eq!(
            decode_owned(&bytes),
            Err(BsonError::DepthLimitExceeded(MAX_DEPTH))
        );
    }

    #[test]
    fn factories_agree_on_shape() {
        let bytes = RawDoc::new()
            .string("name", "Alice")
            .int32("age", 30)
            .bytes();
        for factory in [
            DocumentFactory::IndexedLazy,
            DocumentFactory::EagerMap,
            DocumentFactory::EagerTypedMap,
        ] {
            let decoded = factory.decode(&bytes).unwrap();
            assert_eq!(decoded.len(), 2, "{factory:?}");
            assert!(decoded.contains("name"), "{factory:?}");
            assert!(!decoded.contains("missing"), "{factory:?}");
        }
    }

    #[test]
    fn truncated_input_fails_cleanly() {
        let bytes = RawDoc::new().string("s", "hello").bytes();
        let truncated = &bytes[..bytes.len() - 1];
        assert!(matches!(
            decode_owned(truncated),
            Err(BsonError::BufferUnderflow { .. }) | Err(BsonError::FrameMismatch { .. })
        ));
    }
}
