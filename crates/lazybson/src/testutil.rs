//! Test-only raw document builder.
//!
//! Unit tests need well-formed BSON bytes to feed the decoder; this builder
//! writes them directly. Encoding is otherwise out of this crate's scope.

/// Builds one BSON document body element by element, then frames it.
pub(crate) struct RawDoc {
    body: Vec<u8>,
}

#[allow(dead_code)]
impl RawDoc {
    pub fn new() -> Self {
        Self { body: Vec::new() }
    }

    fn element(mut self, tag: u8, name: &str) -> Self {
        self.body.push(tag);
        self.body.extend_from_slice(name.as_bytes());
        self.body.push(0);
        self
    }

    fn string_value(mut self, s: &str) -> Self {
        self.body
            .extend_from_slice(&((s.len() as i32) + 1).to_le_bytes());
        self.body.extend_from_slice(s.as_bytes());
        self.body.push(0);
        self
    }

    pub fn double(self, name: &str, v: f64) -> Self {
        let mut d = self.element(0x01, name);
        d.body.extend_from_slice(&v.to_le_bytes());
        d
    }

    pub fn string(self, name: &str, v: &str) -> Self {
        self.element(0x02, name).string_value(v)
    }

    pub fn doc(self, name: &str, inner: RawDoc) -> Self {
        let mut d = self.element(0x03, name);
        d.body.extend_from_slice(&inner.bytes());
        d
    }

    pub fn array(self, name: &str, inner: RawDoc) -> Self {
        let mut d = self.element(0x04, name);
        d.body.extend_from_slice(&inner.bytes());
        d
    }

    pub fn binary(self, name: &str, subtype: u8, data: &[u8]) -> Self {
        let mut d = self.element(0x05, name);
        d.body.extend_from_slice(&(data.len() as i32).to_le_bytes());
        d.body.push(subtype);
        d.body.extend_from_slice(data);
        d
    }

    pub fn undefined(self, name: &str) -> Self {
        self.element(0x06, name)
    }

    pub fn object_id(self, name: &str, id: [u8; 12]) -> Self {
        let mut d = self.element(0x07, name);
        d.body.extend_from_slice(&id);
        d
    }

    pub fn bool(self, name: &str, v: bool) -> Self {
        let mut d = self.element(0x08, name);
        d.body.push(v as u8);
        d
    }

    /// Writes a boolean element with an arbitrary value byte.
    pub fn bool_raw(self, name: &str, byte: u8) -> Self {
        let mut d = self.element(0x08, name);
        d.body.push(byte);
        d
    }

    pub fn datetime(self, name: &str, ms: i64) -> Self {
        let mut d = self.element(0x09, name);
        d.body.extend_from_slice(&ms.to_le_bytes());
        d
    }

    pub fn null(self, name: &str) -> Self {
        self.element(0x0a, name)
    }

    pub fn regex(self, name: &str, pattern: &str, options: &str) -> Self {
        let mut d = self.element(0x0b, name);
        d.body.extend_from_slice(pattern.as_bytes());
        d.body.push(0);
        d.body.extend_from_slice(options.as_bytes());
        d.body.push(0);
        d
    }

    pub fn db_pointer(self, name: &str, target: &str, id: [u8; 12]) -> Self {
        let mut d = self.element(0x0c, name).string_value(target);
        d.body.extend_from_slice(&id);
        d
    }

    pub fn javascript(self, name: &str, code: &str) -> Self {
        self.element(0x0d, name).string_value(code)
    }

    pub fn symbol(self, name: &str, v: &str) -> Self {
        self.element(0x0e, name).string_value(v)
    }

    pub fn code_with_scope(self, name: &str, code: &str, scope: RawDoc) -> Self {
        let mut d = self.element(0x0f, name);
        let scope_bytes = scope.bytes();
        let total = 4 + 4 + code.len() + 1 + scope_bytes.len();
        d.body.extend_from_slice(&(total as i32).to_le_bytes());
        d = d.string_value(code);
        d.body.extend_from_slice(&scope_bytes);
        d
    }

    pub fn int32(self, name: &str, v: i32) -> Self {
        let mut d = self.element(0x10, name);
        d.body.extend_from_slice(&v.to_le_bytes());
        d
    }

    pub fn timestamp(self, name: &str, seconds: u32, increment: u32) -> Self {
        let mut d = self.element(0x11, name);
        d.body.extend_from_slice(&increment.to_le_bytes());
        d.body.extend_from_slice(&seconds.to_le_bytes());
        d
    }

    pub fn int64(self, name: &str, v: i64) -> Self {
        let mut d = self.element(0x12, name);
        d.body.extend_from_slice(&v.to_le_bytes());
        d
    }

    pub fn decimal128(self, name: &str, raw: [u8; 16]) -> Self {
        let mut d = self.element(0x13, name);
        d.body.extend_from_slice(&raw);
        d
    }

    pub fn min_key(self, name: &str) -> Self {
        self.element(0xff, name)
    }

    pub fn max_key(self, name: &str) -> Self {
        self.element(0x7f, name)
    }

    /// Frames the accumulated body: length prefix, elements, terminator.
    pub fn bytes(&self) -> Vec<u8> {
        let size = (self.body.len() + 5) as i32;
        let mut out = Vec::with_capacity(self.body.len() + 5);
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&self.body);
        out.push(0);
        out
    }
}
