//! Binary buffer reader with cursor tracking.

use std::str;

use crate::BufferError;

/// A bounds-checked binary reader over a borrowed byte slice.
///
/// The reader maintains a cursor position and provides little-endian reads
/// of the primitive types plus C-string scans. Every read that would cross
/// `end` fails with [`BufferError::EndOfBuffer`] and leaves the cursor where
/// it was.
///
/// # Example
///
/// ```
/// use lazybson_buffers::Reader;
///
/// let data = [0x2a, 0x00, 0x00, 0x00];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.i32_le(), Ok(42));
/// ```
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub data: &'a [u8],
    /// Current cursor position.
    pub x: usize,
    /// End position (exclusive).
    pub end: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader for the given byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        let end = data.len();
        Self { data, x: 0, end }
    }

    /// Creates a reader over a sub-range of a slice.
    pub fn from_slice(data: &'a [u8], x: usize, end: usize) -> Self {
        Self { data, x, end }
    }

    /// Returns the underlying byte slice.
    pub fn buffer(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the current cursor position.
    pub fn position(&self) -> usize {
        self.x
    }

    /// Moves the cursor to an absolute position.
    pub fn set_position(&mut self, x: usize) {
        self.x = x;
    }

    /// Returns the number of remaining bytes.
    pub fn remaining(&self) -> usize {
        self.end.saturating_sub(self.x)
    }

    #[inline]
    fn check(&self, n: usize) -> Result<(), BufferError> {
        if self.x + n > self.end {
            Err(BufferError::EndOfBuffer {
                position: self.x,
                required: n,
                available: self.remaining(),
            })
        } else {
            Ok(())
        }
    }

    /// Peeks at the current byte without advancing the cursor.
    pub fn peek(&self) -> Result<u8, BufferError> {
        self.check(1)?;
        Ok(self.data[self.x])
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        self.check(1)?;
        let val = self.data[self.x];
        self.x += 1;
        Ok(val)
    }

    /// Reads a signed 32-bit integer (little-endian).
    #[inline]
    pub fn i32_le(&mut self) -> Result<i32, BufferError> {
        self.check(4)?;
        let val = i32::from_le_bytes([
            self.data[self.x],
            self.data[self.x + 1],
            self.data[self.x + 2],
            self.data[self.x + 3],
        ]);
        self.x += 4;
        Ok(val)
    }

    /// Reads an unsigned 32-bit integer (little-endian).
    #[inline]
    pub fn u32_le(&mut self) -> Result<u32, BufferError> {
        self.check(4)?;
        let val = u32::from_le_bytes([
            self.data[self.x],
            self.data[self.x + 1],
            self.data[self.x + 2],
            self.data[self.x + 3],
        ]);
        self.x += 4;
        Ok(val)
    }

    /// Reads a signed 64-bit integer (little-endian).
    #[inline]
    pub fn i64_le(&mut self) -> Result<i64, BufferError> {
        self.check(8)?;
        let val = i64::from_le_bytes([
            self.data[self.x],
            self.data[self.x + 1],
            self.data[self.x + 2],
            self.data[self.x + 3],
            self.data[self.x + 4],
            self.data[self.x + 5],
            self.data[self.x + 6],
            self.data[self.x + 7],
        ]);
        self.x += 8;
        Ok(val)
    }

    /// Reads an unsigned 64-bit integer (little-endian).
    #[inline]
    pub fn u64_le(&mut self) -> Result<u64, BufferError> {
        self.i64_le().map(|v| v as u64)
    }

    /// Reads a 64-bit floating point number (little-endian IEEE-754 bit
    /// pattern).
    #[inline]
    pub fn f64_le(&mut self) -> Result<f64, BufferError> {
        self.check(8)?;
        let val = f64::from_le_bytes([
            self.data[self.x],
            self.data[self.x + 1],
            self.data[self.x + 2],
            self.data[self.x + 3],
            self.data[self.x + 4],
            self.data[self.x + 5],
            self.data[self.x + 6],
            self.data[self.x + 7],
        ]);
        self.x += 8;
        Ok(val)
    }

    /// Returns a borrowed subslice of `size` bytes and advances the cursor.
    /// Never copies.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.check(size)?;
        let x = self.x;
        let end = x + size;
        self.x = end;
        Ok(&self.data[x..end])
    }

    /// Returns an owned copy of `size` bytes and advances the cursor. For
    /// callers whose result must outlive the buffer.
    pub fn buf_owned(&mut self, size: usize) -> Result<Vec<u8>, BufferError> {
        self.buf(size).map(|b| b.to_vec())
    }

    /// Advances the cursor by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<(), BufferError> {
        self.check(n)?;
        self.x += n;
        Ok(())
    }

    /// Reads a UTF-8 string of `size` bytes.
    pub fn utf8(&mut self, size: usize) -> Result<&'a str, BufferError> {
        let bytes = self.buf(size)?;
        str::from_utf8(bytes).map_err(|_| BufferError::InvalidUtf8)
    }

    /// Reads a C-string: UTF-8 bytes up to the next `0x00`, consuming the
    /// terminator. The returned slice excludes the terminator.
    pub fn cstr(&mut self) -> Result<&'a str, BufferError> {
        let (offset, len) = self.skip_cstr()?;
        str::from_utf8(&self.data[offset..offset + len]).map_err(|_| BufferError::InvalidUtf8)
    }

    /// Scans past a C-string without materializing it. Returns the offset and
    /// byte length of the string content (terminator excluded, but consumed).
    pub fn skip_cstr(&mut self) -> Result<(usize, usize), BufferError> {
        let start = self.x;
        let mut i = start;
        while i < self.end {
            if self.data[i] == 0 {
                self.x = i + 1;
                return Ok((start, i - start));
            }
            i += 1;
        }
        Err(BufferError::NoNullTerminator { start })
    }
}
