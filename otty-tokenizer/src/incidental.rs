use std::slice;
use std::vec;

use crate::token::Token;

/// Ordered, append-only sink for secondary tokens found while a decoder scans
/// toward the end of its primary sequence.
///
/// Tokens keep the byte order in which they were discovered.
#[derive(Debug, Default)]
pub struct Incidentals {
    tokens: Vec<Token>,
}

impl Incidentals {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Take every collected token, leaving the sink empty for the next call.
    pub fn drain(&mut self) -> vec::Drain<'_, Token> {
        self.tokens.drain(..)
    }
}

impl<'a> IntoIterator for &'a Incidentals {
    type Item = &'a Token;
    type IntoIter = slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Incidentals {
    type Item = Token;
    type IntoIter = vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}
