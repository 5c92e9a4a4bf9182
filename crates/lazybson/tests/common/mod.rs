//! Shared test support: a document builder writing well-formed BSON.
//!
//! The crate deliberately ships no encoder; tests assemble their input
//! bytes here instead.

#![allow(dead_code)]

use lazybson_buffers::Writer;

/// Chainable builder for one BSON document.
pub struct Doc {
    w: Writer,
}

impl Default for Doc {
    fn default() -> Self {
        Self::new()
    }
}

impl Doc {
    pub fn new() -> Self {
        Self {
            w: Writer::with_alloc_size(256),
        }
    }

    fn element(mut self, tag: u8, name: &str) -> Self {
        self.w.u8(tag);
        self.w.cstr(name);
        self
    }

    fn string_value(mut self, s: &str) -> Self {
        self.w.i32_le((s.len() as i32) + 1);
        self.w.utf8(s);
        self.w.u8(0);
        self
    }

    pub fn double(self, name: &str, v: f64) -> Self {
        let mut d = self.element(0x01, name);
        d.w.f64_le(v);
        d
    }

    pub fn string(self, name: &str, v: &str) -> Self {
        self.element(0x02, name).string_value(v)
    }

    pub fn doc(self, name: &str, inner: Doc) -> Self {
        let mut d = self.element(0x03, name);
        d.w.buf(&inner.build());
        d
    }

    pub fn array(self, name: &str, inner: Doc) -> Self {
        let mut d = self.element(0x04, name);
        d.w.buf(&inner.build());
        d
    }

    pub fn binary(self, name: &str, subtype: u8, data: &[u8]) -> Self {
        let mut d = self.element(0x05, name);
        d.w.i32_le(data.len() as i32);
        d.w.u8(subtype);
        d.w.buf(data);
        d
    }

    pub fn undefined(self, name: &str) -> Self {
        self.element(0x06, name)
    }

    pub fn object_id(self, name: &str, id: [u8; 12]) -> Self {
        let mut d = self.element(0x07, name);
        d.w.buf(&id);
        d
    }

    pub fn bool(self, name: &str, v: bool) -> Self {
        let mut d = self.element(0x08, name);
        d.w.u8(v as u8);
        d
    }

    pub fn datetime(self, name: &str, ms: i64) -> Self {
        let mut d = self.element(0x09, name);
        d.w.i64_le(ms);
        d
    }

    pub fn null(self, name: &str) -> Self {
        self.element(0x0a, name)
    }

    pub fn regex(self, name: &str, pattern: &str, options: &str) -> Self {
        let mut d = self.element(0x0b, name);
        d.w.cstr(pattern);
        d.w.cstr(options);
        d
    }

    pub fn db_pointer(self, name: &str, target: &str, id: [u8; 12]) -> Self {
        let mut d = self.element(0x0c, name).string_value(target);
        d.w.buf(&id);
        d
    }

    pub fn javascript(self, name: &str, code: &str) -> Self {
        self.element(0x0d, name).string_value(code)
    }

    pub fn symbol(self, name: &str, v: &str) -> Self {
        self.element(0x0e, name).string_value(v)
    }

    pub fn code_with_scope(self, name: &str, code: &str, scope: Doc) -> Self {
        let mut d = self.element(0x0f, name);
        let scope_bytes = scope.build();
        let total = 4 + 4 + code.len() + 1 + scope_bytes.len();
        d.w.i32_le(total as i32);
        d = d.string_value(code);
        d.w.buf(&scope_bytes);
        d
    }

    pub fn int32(self, name: &str, v: i32) -> Self {
        let mut d = self.element(0x10, name);
        d.w.i32_le(v);
        d
    }

    pub fn timestamp(self, name: &str, seconds: u32, increment: u32) -> Self {
        let mut d = self.element(0x11, name);
        d.w.u32_le(increment);
        d.w.u32_le(seconds);
        d
    }

    pub fn int64(self, name: &str, v: i64) -> Self {
        let mut d = self.element(0x12, name);
        d.w.i64_le(v);
        d
    }

    pub fn decimal128(self, name: &str, raw: [u8; 16]) -> Self {
        let mut d = self.element(0x13, name);
        d.w.buf(&raw);
        d
    }

    pub fn min_key(self, name: &str) -> Self {
        self.element(0xff, name)
    }

    pub fn max_key(self, name: &str) -> Self {
        self.element(0x7f, name)
    }

    /// Frames the body: length prefix, elements, terminator.
    pub fn build(mut self) -> Vec<u8> {
        let body = self.w.flush();
        let mut out = Writer::with_alloc_size(body.len() + 8);
        out.i32_le((body.len() + 5) as i32);
        out.buf(&body);
        out.u8(0);
        out.flush()
    }
}

/// An int64 array document body with keys "0".."n-1".
pub fn int64_array(values: &[i64]) -> Doc {
    let mut arr = Doc::new();
    for (i, v) in values.iter().enumerate() {
        arr = arr.int64(&i.to_string(), *v);
    }
    arr
}

/// A flat document with `n` int32 fields named `field0..fieldN`.
pub fn wide_doc(n: usize) -> Doc {
    let mut doc = Doc::new();
    for i in 0..n {
        doc = doc.int32(&format!("field{i}"), i as i32);
    }
    doc
}

/// Documents nested `depth` levels deep, an int32 leaf at the bottom.
pub fn deep_doc(depth: usize) -> Doc {
    let mut doc = Doc::new().int32("leaf", 42);
    for _ in 0..depth {
        doc = Doc::new().doc("next", doc);
    }
    doc
}
