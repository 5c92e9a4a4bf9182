//! Process-wide schema registry.
//!
//! Maps an opaque schema identifier to an expected field order, solely to
//! parameterize the ordered matcher. Thread-safe; last write wins. Distinct
//! from the per-view field index.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::intern::intern;

static REGISTRY: Lazy<RwLock<HashMap<String, Arc<Vec<Arc<str>>>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Registers (or overwrites) the expected field order for `id`.
pub fn register_schema(id: &str, field_order: &[&str]) {
    let order: Vec<Arc<str>> = field_order.iter().map(|n| intern(n)).collect();
    REGISTRY.write().insert(id.to_string(), Arc::new(order));
}

/// Registration path for the auto-learner: names are already interned.
pub(crate) fn register_schema_interned(id: &str, order: Vec<Arc<str>>) {
    REGISTRY.write().insert(id.to_string(), Arc::new(order));
}

/// Interned order for matcher construction.
pub(crate) fn schema_order(id: &str) -> Option<Arc<Vec<Arc<str>>>> {
    REGISTRY.read().get(id).cloned()
}

/// The registered field order for `id`, if any.
pub fn get_schema_field_order(id: &str) -> Option<Vec<String>> {
    REGISTRY
        .read()
        .get(id)
        .map(|order| order.iter().map(|n| n.to_string()).collect())
}

/// Drops every learned and registered order.
pub fn clear_schemas() {
    REGISTRY.write().clear();
}
