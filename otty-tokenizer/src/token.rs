//! Decoder output values.

use serde::Serialize;
use std::fmt;

use crate::control::ControlCode;
use crate::dcs::DcsToken;
use crate::osc::XtermToken;

/// Kind of a decoded token, one variant per control string family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Dcs(DcsToken),
    Xterm(XtermToken),
    /// Control byte surfaced while scanning a longer sequence.
    Control(ControlCode),
}

impl From<DcsToken> for TokenKind {
    fn from(value: DcsToken) -> Self {
        Self::Dcs(value)
    }
}

impl From<XtermToken> for TokenKind {
    fn from(value: XtermToken) -> Self {
        Self::Xterm(value)
    }
}

impl From<ControlCode> for TokenKind {
    fn from(value: ControlCode) -> Self {
        Self::Control(value)
    }
}

/// Fully decoded control sequence together with the number of input bytes it
/// represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    kind: TokenKind,
    consumed: usize,
}

impl Token {
    pub(crate) fn new(kind: impl Into<TokenKind>, consumed: usize) -> Self {
        Self {
            kind: kind.into(),
            consumed,
        }
    }

    #[inline]
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Exact number of input bytes covered by this token.
    #[inline]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn into_kind(self) -> TokenKind {
        self.kind
    }

    /// Whether the sequence was complete but not understood.
    pub fn is_unrecognized(&self) -> bool {
        match &self.kind {
            TokenKind::Dcs(token) => token.is_unrecognized(),
            TokenKind::Xterm(token) => token.is_unrecognized(),
            TokenKind::Control(_) => false,
        }
    }
}

/// Outcome of a single decode call.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A whole sequence was matched.
    Complete(Token),
    /// The terminator has not arrived yet. Nothing was consumed and the caller
    /// should retry once more bytes are appended to the same buffer.
    Incomplete,
}

impl Decoded {
    /// Number of bytes consumed, zero when incomplete.
    pub fn consumed(&self) -> usize {
        match self {
            Self::Complete(token) => token.consumed(),
            Self::Incomplete => 0,
        }
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Incomplete)
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            Self::Complete(token) => Some(token),
            Self::Incomplete => None,
        }
    }

    pub fn into_token(self) -> Option<Token> {
        match self {
            Self::Complete(token) => Some(token),
            Self::Incomplete => None,
        }
    }
}

/// Reason attached to a complete sequence that could not be understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Rejection {
    /// Well-formed, but the function or command code is not supported.
    UnknownFunction,
    /// The introducer or parameters violate the sequence grammar.
    Malformed,
    /// `CAN` or `SUB` aborted the sequence.
    Cancelled,
    /// A file transfer chunk arrived with no transfer in progress.
    NoOpenTransfer,
    /// The file transfer grew past the configured limit.
    TransferLimitExceeded,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::UnknownFunction => "unknown function",
            Self::Malformed => "malformed sequence",
            Self::Cancelled => "cancelled",
            Self::NoOpenTransfer => "no open transfer",
            Self::TransferLimitExceeded => "transfer limit exceeded",
        };
        f.write_str(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_consumes_nothing() {
        let decoded = Decoded::Incomplete;
        assert_eq!(decoded.consumed(), 0);
        assert!(decoded.is_incomplete());
        assert!(decoded.token().is_none());
    }

    #[test]
    fn complete_reports_token_length() {
        let decoded =
            Decoded::Complete(Token::new(ControlCode::Bell, 1));
        assert_eq!(decoded.consumed(), 1);
        assert!(!decoded.is_incomplete());

        let token = decoded.into_token().expect("complete token");
        assert_eq!(token.kind(), &TokenKind::Control(ControlCode::Bell));
        assert!(!token.is_unrecognized());
    }

    #[test]
    fn serializes_kind_and_length() {
        let token = Token::new(ControlCode::Enquiry, 1);
        let json = serde_json::to_value(&token).expect("serializable");
        assert_eq!(
            json,
            serde_json::json!({ "kind": { "Control": "Enquiry" }, "consumed": 1 })
        );
    }
}
