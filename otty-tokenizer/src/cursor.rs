//! Read position over a borrowed byte buffer.
//!
//! The [`Cursor`] is the shared context handed to the sequence decoders. It
//! never owns the bytes: the surrounding stream buffer does, and the borrow
//! keeps the cursor from outliving it.

use crate::encoding::Encoding;

/// Position-tracking view over an immutable byte buffer.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    encoding: Encoding,
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8], encoding: Encoding) -> Self {
        Self {
            bytes,
            encoding,
            position: 0,
        }
    }

    /// Encoding used to decode strings read through this cursor.
    #[inline]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes from the current position to the end of the buffer.
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.position..]
    }

    #[inline]
    pub fn remaining_len(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// Whether every byte of the buffer has been consumed.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.position == self.bytes.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    /// Byte `offset` positions ahead of the cursor, if present.
    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.position.checked_add(offset)?).copied()
    }

    /// Move forward by `count` bytes, stopping at the end of the buffer.
    ///
    /// Returns the number of bytes actually skipped.
    pub fn advance(&mut self, count: usize) -> usize {
        let step = count.min(self.remaining_len());
        self.position += step;
        step
    }

    /// Move back by `count` bytes, stopping at the start of the buffer.
    ///
    /// Returns the number of bytes actually rewound.
    pub fn rewind(&mut self, count: usize) -> usize {
        let step = count.min(self.position);
        self.position -= step;
        step
    }
}
