use serde::Serialize;
use std::fmt;

pub(crate) const BEL: u8 = 0x07;
pub(crate) const ESC: u8 = 0x1B;

/// C0 control codes that may be observed inside a control string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ControlCode {
    /// (NUL, Caret = ^@) Null, used as time fill.
    Null,
    /// (ENQ, Caret = ^E) Enquiry, requests the answerback message.
    Enquiry,
    /// (BEL, Caret = ^G, C = \a) Bell, triggers the bell, buzzer, or beeper on the terminal.
    Bell,
    /// (BS, Caret = ^H, C = \b) Backspace.
    Backspace,
    /// (HT, Caret = ^I, C = \t) Horizontal Tabulation.
    HorizontalTab,
    /// (LF, Caret = ^J, C = \n) Linefeed.
    LineFeed,
    /// (VT, Caret = ^K, C = \v) Vertical Tabulation.
    VerticalTab,
    /// (FF, Caret = ^L, C = \f) Form Feed.
    FormFeed,
    /// (CR, Caret = ^M, C = \r) Carriage Return.
    CarriageReturn,
    /// (CAN, Caret = ^X) Cancel, aborts the control sequence in progress.
    Cancel,
    /// (SUB, Caret = ^Z) Substitute, aborts the control sequence in progress.
    Substitute,
    /// (ESC, Caret = ^[) Escape, introduces a new sequence.
    Escape,

    /// Any other C0 byte.
    Other(u8),
}

impl ControlCode {
    /// Whether the code aborts a control string outright.
    pub fn cancels_sequence(self) -> bool {
        matches!(self, Self::Cancel | Self::Substitute)
    }

    /// Whether the code must be surfaced as an incidental when it shows up
    /// inside a control string instead of being dropped.
    pub(crate) fn is_significant(self) -> bool {
        matches!(self, Self::Enquiry)
    }
}

impl From<u8> for ControlCode {
    fn from(byte: u8) -> Self {
        use ControlCode::*;
        match byte {
            0x00 => Null,
            0x05 => Enquiry,
            BEL => Bell,
            0x08 => Backspace,
            0x09 => HorizontalTab,
            0x0A => LineFeed,
            0x0B => VerticalTab,
            0x0C => FormFeed,
            0x0D => CarriageReturn,
            0x18 => Cancel,
            0x1A => Substitute,
            ESC => Escape,
            other => Other(other),
        }
    }
}

impl fmt::Display for ControlCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ControlCode::*;
        let code = match self {
            Null => "NUL",
            Enquiry => "ENQ",
            Bell => "BEL",
            Backspace => "BS",
            HorizontalTab => "HT",
            LineFeed => "LF",
            VerticalTab => "VT",
            FormFeed => "FF",
            CarriageReturn => "CR",
            Cancel => "CAN",
            Substitute => "SUB",
            Escape => "ESC",
            Other(_) => "C0",
        };

        match self {
            Other(b) => write!(f, "{code}: 0x{:02X}", b),
            _ => write!(f, "{code}"),
        }
    }
}

/// Whether `byte` belongs to the C0 control range.
#[inline]
pub(crate) fn is_c0(byte: u8) -> bool {
    byte < 0x20
}
