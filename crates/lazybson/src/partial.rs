//! Partial parser: single-pass extraction of selected fields.
//!
//! Streams through a document once, consulting the field matcher per field.
//! Misses are skipped without construction; hits are parsed, with nested
//! documents and arrays returned as child views to preserve zero-copy.
//! Early-exit terminates the scan once every target has been found.

use std::sync::Arc;

use indexmap::IndexMap;

use lazybson_buffers::Reader;

use crate::error::BsonError;
use crate::index::frame_len;
use crate::intern::intern;
use crate::matcher::{FieldMatcher, OrderedFieldMatcher};
use crate::parse::parse_value;
use crate::schema;
use crate::size::skip_value;
use crate::tag::Tag;
use crate::value::BsonValue;

/// Partial-parser behavior switches.
#[derive(Debug, Clone)]
pub struct PartialParserOptions {
    /// Stop scanning once every target field has been found. Suppressed
    /// while auto-learning so the full field sequence is observed.
    pub early_exit: bool,
    /// Ties this parser to a learned or declared field order in the
    /// process-wide registry.
    pub schema_id: Option<String>,
    /// Explicit expected order for the ordered matcher; takes precedence
    /// over the registry.
    pub field_order: Option<Vec<String>>,
    /// Record the observed field order on the first full parse and register
    /// it under `schema_id`.
    pub auto_learn: bool,
}

impl Default for PartialParserOptions {
    fn default() -> Self {
        Self {
            early_exit: true,
            schema_id: None,
            field_order: None,
            auto_learn: false,
        }
    }
}

#[derive(Debug)]
enum MatcherState {
    Unordered(FieldMatcher),
    Ordered(OrderedFieldMatcher),
}

/// Extracts only the target fields from each parsed document.
#[derive(Debug)]
pub struct PartialParser {
    targets: Vec<Arc<str>>,
    options: PartialParserOptions,
    matcher: MatcherState,
    bytes_consumed: usize,
}

impl PartialParser {
    pub fn new(target_fields: &[&str], options: PartialParserOptions) -> Self {
        let targets: Vec<Arc<str>> = target_fields.iter().map(|n| intern(n)).collect();
        let matcher = Self::initial_matcher(&targets, &options);
        Self {
            targets,
            options,
            matcher,
            bytes_consumed: 0,
        }
    }

    /// Convenience constructor with default options.
    pub fn with_targets(target_fields: &[&str]) -> Self {
        Self::new(target_fields, PartialParserOptions::default())
    }

    fn initial_matcher(targets: &[Arc<str>], options: &PartialParserOptions) -> MatcherState {
        if let Some(order) = &options.field_order {
            let expected: Vec<Arc<str>> = order.iter().map(|n| intern(n)).collect();
            return MatcherState::Ordered(OrderedFieldMatcher::from_interned(
                targets.to_vec(),
                expected,
            ));
        }
        if let Some(id) = &options.schema_id {
            if let Some(order) = schema::schema_order(id) {
                return MatcherState::Ordered(OrderedFieldMatcher::from_interned(
                    targets.to_vec(),
                    order.as_ref().clone(),
                ));
            }
        }
        MatcherState::Unordered(FieldMatcher::from_interned(targets.to_vec()))
    }

    /// Bytes of the last input consumed before the scan terminated. With
    /// early-exit this is typically less than the document length.
    pub fn bytes_consumed(&self) -> usize {
        self.bytes_consumed
    }

    /// Ordered-matcher counter; 0 while matching unordered.
    pub fn fast_path_hits(&self) -> u64 {
        match &self.matcher {
            MatcherState::Ordered(m) => m.fast_path_hits(),
            MatcherState::Unordered(_) => 0,
        }
    }

    /// Ordered-matcher counter; 0 while matching unordered.
    pub fn fallback_lookups(&self) -> u64 {
        match &self.matcher {
            MatcherState::Ordered(m) => m.fallback_lookups(),
            MatcherState::Unordered(_) => 0,
        }
    }

    fn target_count(&self) -> usize {
        match &self.matcher {
            MatcherState::Ordered(m) => m.target_count(),
            MatcherState::Unordered(m) => m.len(),
        }
    }

    /// Streams the document once and returns the decoded target fields.
    /// Keys borrow from the input; so do string, binary and nested-view
    /// values.
    pub fn parse<'a>(
        &mut self,
        bytes: &'a [u8],
    ) -> Result<IndexMap<&'a str, BsonValue<'a>>, BsonError> {
        // Another parser may have learned the schema since construction.
        if matches!(self.matcher, MatcherState::Unordered(_)) {
            if let Some(id) = &self.options.schema_id {
                if let Some(order) = schema::schema_order(id) {
                    self.matcher = MatcherState::Ordered(OrderedFieldMatcher::from_interned(
                        self.targets.clone(),
                        order.as_ref().clone(),
                    ));
                }
            }
        }
        let learning = self.options.auto_learn
            && self.options.schema_id.is_some()
            && matches!(self.matcher, MatcherState::Unordered(_));

        if let MatcherState::Ordered(m) = &mut self.matcher {
            m.reset();
        }

        let declared = frame_len(bytes, 0)?;
        let mut reader = Reader::from_slice(bytes, 4, declared);
        let mut result: IndexMap<&'a str, BsonValue<'a>> = IndexMap::new();
        let mut observed: Vec<Arc<str>> = Vec::new();
        let mut found = 0usize;
        let target_count = self.target_count();

        loop {
            let byte = reader.u8()?;
            if byte == 0 {
                if reader.x != declared {
                    return Err(BsonError::FrameMismatch {
                        declared: declared as i64,
                        actual: reader.x,
                        boundary: reader.x,
                    });
                }
                break;
            }
            let tag = Tag::from_u8(byte)?;
            let name = reader.cstr()?;
            let candidate = intern(name);
            if learning {
                observed.push(candidate.clone());
            }
            let matched = match &mut self.matcher {
                MatcherState::Ordered(m) => m.matches(&candidate),
                MatcherState::Unordered(m) => m.matches(&candidate),
            };
            if matched {
                let value = parse_value(tag, &mut reader).map_err(|e| e.in_field(name))?;
                if result.insert(name, value).is_none() {
                    found += 1;
                }
                if self.options.early_exit && !learning && found == target_count {
                    break;
                }
            } else {
                skip_value(tag, &mut reader)?;
            }
        }

        self.bytes_consumed = reader.x;

        if learning {
            if let Some(id) = &self.options.schema_id {
                schema::register_schema_interned(id, observed.clone());
                self.matcher = MatcherState::Ordered(OrderedFieldMatcher::from_interned(
                    self.targets.clone(),
                    observed,
                ));
            }
        }

        Ok(result)
    }
}
