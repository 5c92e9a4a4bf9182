//! Zero-copy, index-based, lazy-evaluating BSON decoder.
//!
//! [`parse`] builds an indexed view over an immutable byte buffer in one
//! pass: each top-level field's name span, type tag and value span are
//! recorded in a hash-sorted index, but no value is decoded until a typed
//! getter asks for it. Decoded values are cached per slot; nested documents
//! and arrays come back as child views over the same buffer, indexed on
//! first access.
//!
//! [`PartialParser`] extracts a chosen set of fields in a single streaming
//! pass, skipping everything else and stopping early once all targets are
//! found. With a declared or auto-learned field order it answers most
//! membership tests with one pointer comparison.
//!
//! The eager decoder ([`decode_owned`]) and the [`DocumentFactory`]
//! selection cover the cases where owned values or a plain map are the
//! better representation; all factories produce semantically identical
//! output.
//!
//! # Example
//!
//! ```
//! use lazybson::parse;
//!
//! // {"a": 1}
//! let bytes = [
//!     0x0c, 0x00, 0x00, 0x00, 0x10, b'a', 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
//! ];
//! let doc = parse(&bytes)?;
//! assert_eq!(doc.get_i32("a")?, 1);
//! assert_eq!(doc.to_bson(), &bytes[..]);
//! # Ok::<(), lazybson::BsonError>(())
//! ```
//!
//! # Thread safety
//!
//! Buffers are immutable and any number of views may be built over one
//! buffer concurrently. A single view's lazy cache is unsynchronized
//! (`!Sync`); share the buffer, not the view. The interning pool and the
//! schema registry are process-wide and thread-safe.

mod array;
mod dispatch;
mod document;
mod eager;
mod error;
mod index;
mod intern;
mod json;
mod matcher;
mod parse;
mod partial;
mod schema;
mod size;
mod tag;
#[cfg(test)]
mod testutil;
mod value;

pub use array::{ArrayView, ElementType, TypedArray};
pub use dispatch::{BranchOrder, TypeDispatch, DEFAULT_BRANCH_ORDER};
pub use document::{parse, Document};
pub use eager::{
    decode_fields, decode_owned, Decoded, DocumentFactory, EagerDocument, OwnedValue, MAX_DEPTH,
};
pub use error::BsonError;
pub use intern::intern;
pub use matcher::{FieldMatcher, OrderedFieldMatcher};
pub use partial::{PartialParser, PartialParserOptions};
pub use schema::{clear_schemas, get_schema_field_order, register_schema};
pub use size::{skip_value, value_size};
pub use tag::Tag;
pub use value::{
    Binary, BsonValue, CodeWithScope, DbPointer, Decimal128, ObjectId, Regex, Timestamp,
};
