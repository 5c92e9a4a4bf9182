//! Field matchers: set-membership tests over wanted field names.
//!
//! The unordered matcher stores interned names, scanning a small array by
//! identity or probing a hash set for larger target sets. The ordered
//! matcher adds a position cursor over an expected field order: when the
//! document conforms, each candidate is answered by one pointer comparison.

use std::collections::HashSet;
use std::sync::Arc;

use crate::intern::intern;

/// Target sets up to this size use the identity-scan array path.
const SMALL_SET_MAX: usize = 10;

/// Set-membership test over wanted field names, order-insensitive.
#[derive(Debug, Clone)]
pub struct FieldMatcher {
    names: Vec<Arc<str>>,
    set: Option<HashSet<Arc<str>>>,
}

impl FieldMatcher {
    pub fn new(wanted: &[&str]) -> Self {
        let interned: Vec<Arc<str>> = wanted.iter().map(|n| intern(n)).collect();
        Self::from_interned(interned)
    }

    pub(crate) fn from_interned(names: Vec<Arc<str>>) -> Self {
        let mut deduped: Vec<Arc<str>> = Vec::with_capacity(names.len());
        for name in names {
            if !deduped.iter().any(|n| Arc::ptr_eq(n, &name)) {
                deduped.push(name);
            }
        }
        let set = if deduped.len() < SMALL_SET_MAX {
            None
        } else {
            Some(deduped.iter().cloned().collect())
        };
        Self {
            names: deduped,
            set,
        }
    }

    /// Number of distinct wanted names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Membership test. The candidate must come from the same interning
    /// pool; the small-set path compares identities only.
    pub fn matches(&self, candidate: &Arc<str>) -> bool {
        match &self.set {
            Some(set) => set.contains(candidate),
            None => self.names.iter().any(|n| Arc::ptr_eq(n, candidate)),
        }
    }
}

/// Position-based matcher for documents expected to follow a declared field
/// order.
///
/// Each candidate is first checked against the expected name at the cursor:
/// a pointer comparison, O(1). Candidates that do not line up fall back to
/// the unordered hash lookup and resynchronize the cursor. Counters record
/// how often each path answered a wanted field so callers can judge whether
/// the declared order still holds.
#[derive(Debug, Clone)]
pub struct OrderedFieldMatcher {
    wanted: FieldMatcher,
    expected: Vec<Arc<str>>,
    wanted_at: Vec<bool>,
    cursor: usize,
    fast_path_hits: u64,
    fallback_lookups: u64,
}

impl OrderedFieldMatcher {
    pub fn new(wanted: &[&str], expected_order: &[&str]) -> Self {
        let wanted: Vec<Arc<str>> = wanted.iter().map(|n| intern(n)).collect();
        let expected: Vec<Arc<str>> = expected_order.iter().map(|n| intern(n)).collect();
        Self::from_interned(wanted, expected)
    }

    pub(crate) fn from_interned(wanted: Vec<Arc<str>>, expected: Vec<Arc<str>>) -> Self {
        let wanted = FieldMatcher::from_interned(wanted);
        let wanted_at = expected.iter().map(|e| wanted.matches(e)).collect();
        Self {
            wanted,
            expected,
            wanted_at,
            cursor: 0,
            fast_path_hits: 0,
            fallback_lookups: 0,
        }
    }

    /// Rewinds the cursor. Must be called at the start of each document
    /// parse; counters accumulate across parses.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn matches(&mut self, candidate: &Arc<str>) -> bool {
        if self.cursor < self.expected.len() && Arc::ptr_eq(&self.expected[self.cursor], candidate)
        {
            let wanted = self.wanted_at[self.cursor];
            self.cursor += 1;
            if wanted {
                self.fast_path_hits += 1;
            }
            return wanted;
        }
        self.fallback_lookups += 1;
        // Resynchronize: if the candidate appears later in the expected
        // order, move the cursor just past it.
        if self.cursor < self.expected.len() {
            if let Some(pos) = self.expected[self.cursor..]
                .iter()
                .position(|e| Arc::ptr_eq(e, candidate))
            {
                self.cursor += pos + 1;
            }
        }
        self.wanted.matches(candidate)
    }

    /// Wanted fields answered by the position check.
    pub fn fast_path_hits(&self) -> u64 {
        self.fast_path_hits
    }

    /// Candidates that missed the position check and consulted the hash
    /// lookup.
    pub fn fallback_lookups(&self) -> u64 {
        self.fallback_lookups
    }

    pub(crate) fn target_count(&self) -> usize {
        self.wanted.len()
    }
}
