//! Type dispatch table: tag byte to parser/sizer descriptor.

use crate::tag::{Tag, ALL_TAGS};

/// How the byte length of a value is determined from its first bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SizeRule {
    /// Constant width, including the zero-byte tags.
    Fixed(u32),
    /// `i32` length prefix counting content plus terminator; total is 4 + L.
    StringLike,
    /// `i32` length prefix + subtype byte + L payload bytes.
    Binary,
    /// Embedded `i32` total length that includes itself (document, array,
    /// js-with-scope).
    Framed,
    /// Two consecutive C-strings (regex pattern and options).
    TwoCStrings,
    /// String plus a trailing 12-byte ObjectId.
    DbPointer,
}

pub(crate) const fn size_rule(tag: Tag) -> SizeRule {
    match tag {
        Tag::Double => SizeRule::Fixed(8),
        Tag::String => SizeRule::StringLike,
        Tag::Document => SizeRule::Framed,
        Tag::Array => SizeRule::Framed,
        Tag::Binary => SizeRule::Binary,
        Tag::Undefined => SizeRule::Fixed(0),
        Tag::ObjectId => SizeRule::Fixed(12),
        Tag::Boolean => SizeRule::Fixed(1),
        Tag::DateTime => SizeRule::Fixed(8),
        Tag::Null => SizeRule::Fixed(0),
        Tag::Regex => SizeRule::TwoCStrings,
        Tag::DbPointer => SizeRule::DbPointer,
        Tag::JavaScript => SizeRule::StringLike,
        Tag::Symbol => SizeRule::StringLike,
        Tag::JavaScriptWithScope => SizeRule::Framed,
        Tag::Int32 => SizeRule::Fixed(4),
        Tag::Timestamp => SizeRule::Fixed(8),
        Tag::Int64 => SizeRule::Fixed(8),
        Tag::Decimal128 => SizeRule::Fixed(16),
        Tag::MaxKey => SizeRule::Fixed(0),
        Tag::MinKey => SizeRule::Fixed(0),
    }
}

/// Declarative expected-frequency ordering for type-tag dispatch.
///
/// Consumed when a dispatch registry is built. A registry backed by a dense
/// 256-entry table probes by tag byte directly, so the order cannot change
/// observable behavior; dispatchers generated as comparison chains would test
/// the listed tags first.
#[derive(Debug, Clone, Copy)]
pub struct BranchOrder {
    pub tags: &'static [Tag],
}

/// Tag frequencies as seen in typical MongoDB payloads: strings and numbers
/// dominate, then nested structure.
pub const DEFAULT_BRANCH_ORDER: BranchOrder = BranchOrder {
    tags: &[
        Tag::String,
        Tag::Int32,
        Tag::Int64,
        Tag::Double,
        Tag::Document,
        Tag::Array,
        Tag::ObjectId,
        Tag::Boolean,
        Tag::DateTime,
        Tag::Null,
    ],
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Entry {
    pub tag: Tag,
    pub rule: SizeRule,
}

/// Dense dispatch registry indexed by the wire tag byte. Most of the 256
/// entries are absent.
pub struct TypeDispatch {
    table: [Option<Entry>; 256],
}

impl TypeDispatch {
    pub const fn new() -> Self {
        Self::with_branch_order(DEFAULT_BRANCH_ORDER)
    }

    /// Builds the registry, consulting the branch-order hint first and then
    /// filling in the remaining tags in wire order.
    pub const fn with_branch_order(order: BranchOrder) -> Self {
        let mut table: [Option<Entry>; 256] = [None; 256];
        let mut i = 0;
        while i < order.tags.len() {
            let tag = order.tags[i];
            table[tag as u8 as usize] = Some(Entry {
                tag,
                rule: size_rule(tag),
            });
            i += 1;
        }
        let mut i = 0;
        while i < ALL_TAGS.len() {
            let tag = ALL_TAGS[i];
            if table[tag as u8 as usize].is_none() {
                table[tag as u8 as usize] = Some(Entry {
                    tag,
                    rule: size_rule(tag),
                });
            }
            i += 1;
        }
        Self { table }
    }

    #[inline]
    pub(crate) const fn entry(&self, byte: u8) -> Option<Entry> {
        self.table[byte as usize]
    }
}

impl Default for TypeDispatch {
    fn default() -> Self {
        Self::new()
    }
}

static DISPATCH: TypeDispatch = TypeDispatch::new();

/// Resolves a wire byte through the process dispatch table.
#[inline]
pub(crate) fn tag_of(byte: u8) -> Option<Tag> {
    match DISPATCH.entry(byte) {
        Some(entry) => Some(entry.tag),
        None => None,
    }
}

#[inline]
pub(crate) fn rule_of(tag: Tag) -> SizeRule {
    size_rule(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_every_tag() {
        let dispatch = TypeDispatch::new();
        for tag in ALL_TAGS {
            let entry = dispatch.entry(tag.byte()).expect("tag present");
            assert_eq!(entry.tag, tag);
            assert_eq!(entry.rule, size_rule(tag));
        }
    }

    #[test]
    fn terminator_byte_is_not_a_tag() {
        assert!(TypeDispatch::new().entry(0x00).is_none());
    }

    #[test]
    fn branch_order_does_not_change_lookups() {
        let default = TypeDispatch::new();
        let reversed = TypeDispatch::with_branch_order(BranchOrder {
            tags: &[Tag::MinKey, Tag::Decimal128, Tag::Regex],
        });
        for byte in 0u16..=255 {
            let byte = byte as u8;
            let a = default.entry(byte).map(|e| (e.tag, e.rule));
            let b = reversed.entry(byte).map(|e| (e.tag, e.rule));
            assert_eq!(a, b, "entry for byte 0x{byte:02x}");
        }
    }

    #[test]
    fn fixed_widths_match_wire_format() {
        assert_eq!(size_rule(Tag::Double), SizeRule::Fixed(8));
        assert_eq!(size_rule(Tag::ObjectId), SizeRule::Fixed(12));
        assert_eq!(size_rule(Tag::Decimal128), SizeRule::Fixed(16));
        assert_eq!(size_rule(Tag::Null), SizeRule::Fixed(0));
        assert_eq!(size_rule(Tag::MinKey), SizeRule::Fixed(0));
        assert_eq!(size_rule(Tag::MaxKey), SizeRule::Fixed(0));
    }
}
