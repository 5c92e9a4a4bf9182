//! Binary buffer utilities: a cursor-tracked reader and an auto-growing writer.

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::Writer;

/// Error type for bounds-checked buffer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// A read would cross the end of the buffer.
    EndOfBuffer {
        /// Cursor position at the time of the read.
        position: usize,
        /// Number of bytes the read needed.
        required: usize,
        /// Number of bytes that were actually left.
        available: usize,
    },
    /// A C-string scan reached the end of the buffer without finding `0x00`.
    NoNullTerminator {
        /// Offset where the scan started.
        start: usize,
    },
    /// Bytes were not valid UTF-8.
    InvalidUtf8,
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::EndOfBuffer {
                position,
                required,
                available,
            } => write!(
                f,
                "end of buffer at position {position}: required {required} bytes, {available} available"
            ),
            BufferError::NoNullTerminator { start } => {
                write!(f, "no null terminator found after offset {start}")
            }
            BufferError::InvalidUtf8 => write!(f, "invalid UTF-8"),
        }
    }
}

impl std::error::Error for BufferError {}
