//! Process-wide field-name interning pool.
//!
//! Canonical names are held through weak references so transient field
//! names do not accumulate. Identity comparison (`Arc::ptr_eq`) between two
//! interned strings is valid because every matcher and every candidate goes
//! through this pool.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

static POOL: Lazy<Mutex<HashMap<String, Weak<str>>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Dead weak entries are swept when the pool grows past this size.
const SWEEP_THRESHOLD: usize = 4096;

/// Canonicalizes a field name. Two calls with equal input return pointers to
/// the same allocation for as long as any strong reference is alive.
pub fn intern(name: &str) -> Arc<str> {
    let mut pool = POOL.lock();
    if let Some(weak) = pool.get(name) {
        if let Some(arc) = weak.upgrade() {
            return arc;
        }
    }
    if pool.len() >= SWEEP_THRESHOLD {
        pool.retain(|_, weak| weak.strong_count() > 0);
    }
    let arc: Arc<str> = Arc::from(name);
    pool.insert(name.to_string(), Arc::downgrade(&arc));
    arc
}
