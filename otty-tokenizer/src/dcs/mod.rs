mod hex;
mod termcap;

use log::debug;
use memchr::memchr;
use serde::Serialize;
use thiserror::Error;

use crate::control::ESC;
use crate::encoding::Encoding;
use crate::token::{Decoded, Rejection, Token};
pub use termcap::{
    CapabilityEntry, CapabilityQuery, CapabilityReport, CapabilityRequest,
    CapabilityRequestName, capability_name_to_enum, enum_to_capability_name,
};

/// Length of the `ESC P` introducer.
const INTRODUCER_LEN: usize = 2;

/// Length of the `ESC \` string terminator.
const ST_LEN: usize = 2;

/// Parameters of the DCS that switches the session into tmux control mode.
const TMUX_CONTROL_PARAMS: &[u8] = b"1000";

/// Decoded Device Control String.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DcsToken {
    /// `DCS + q` termcap/terminfo capability query.
    CapabilityQuery(CapabilityQuery),
    /// `DCS + r` capability query reply.
    CapabilityReport(CapabilityReport),
    /// `DCS $ q` (DECRQSS) request for the named setting.
    StatusStringRequest(String),
    /// `DCS 1000 p`, start of a tmux control mode session.
    TmuxControlMode,
    Unrecognized(UnrecognizedDcs),
}

impl DcsToken {
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Self::Unrecognized(_))
    }
}

/// Complete DCS that no decoder understood, kept so the caller can skip it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnrecognizedDcs {
    pub params: String,
    pub intermediates: String,
    /// Final byte of the header, `None` when the header was malformed.
    pub final_byte: Option<char>,
    pub reason: Rejection,
}

#[derive(Debug, Error, PartialEq, Eq)]
enum HeaderError {
    #[error("header is truncated")]
    Truncated,

    #[error("unexpected byte 0x{byte:02X} in header")]
    UnexpectedByte { byte: u8, offset: usize },
}

/// `Pp... Ii... F` part of a DCS following the introducer.
#[derive(Debug, PartialEq, Eq)]
struct DcsHeader<'a> {
    params: &'a [u8],
    intermediates: &'a [u8],
    final_byte: u8,
}

impl<'a> DcsHeader<'a> {
    fn parse(body: &'a [u8]) -> Result<Self, HeaderError> {
        let params_len = body
            .iter()
            .position(|b| !(0x30..=0x3F).contains(b))
            .ok_or(HeaderError::Truncated)?;
        let intermediates_len = body[params_len..]
            .iter()
            .position(|b| !(0x20..=0x2F).contains(b))
            .ok_or(HeaderError::Truncated)?;

        let final_offset = params_len + intermediates_len;
        let final_byte = body[final_offset];
        if !(0x40..=0x7E).contains(&final_byte) {
            return Err(HeaderError::UnexpectedByte {
                byte: final_byte,
                offset: final_offset,
            });
        }

        Ok(Self {
            params: &body[..params_len],
            intermediates: &body[params_len..final_offset],
            final_byte,
        })
    }

    fn len(&self) -> usize {
        self.params.len() + self.intermediates.len() + 1
    }

    fn unrecognized(&self, encoding: Encoding, reason: Rejection) -> DcsToken {
        DcsToken::Unrecognized(UnrecognizedDcs {
            params: encoding.decode(self.params),
            intermediates: encoding.decode(self.intermediates),
            final_byte: Some(self.final_byte as char),
            reason,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DcsFunction {
    CapabilityQuery,
    CapabilityReport,
    StatusStringRequest,
    TmuxControlMode,
    Unknown,
}

impl From<&DcsHeader<'_>> for DcsFunction {
    fn from(header: &DcsHeader<'_>) -> Self {
        match (header.intermediates, header.final_byte) {
            (b"+", b'q') => Self::CapabilityQuery,
            (b"+", b'r') => Self::CapabilityReport,
            (b"$", b'q') => Self::StatusStringRequest,
            (b"", b'p') if header.params == TMUX_CONTROL_PARAMS => {
                Self::TmuxControlMode
            },
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum StringEnd {
    /// `ESC \` found; `data_end` is the offset of its `ESC`.
    Terminated { data_end: usize },
    Missing,
}

/// Locate the `ESC \` ending the string that starts at `from`.
///
/// Any other `ESC` is part of the data.
fn find_string_end(bytes: &[u8], from: usize) -> StringEnd {
    let mut at = from;
    while let Some(idx) = bytes.get(at..).and_then(|data| memchr(ESC, data)) {
        let esc = at + idx;
        if bytes.get(esc + 1) == Some(&b'\\') {
            return StringEnd::Terminated { data_end: esc };
        }
        at = esc + 1;
    }

    StringEnd::Missing
}

/// Decode the Device Control String at the start of `bytes`.
///
/// `bytes` must start with `ESC P` and may carry further, unrelated
/// sequences after the DCS. The returned token covers exactly the DCS and its
/// terminator. Without a terminator nothing is consumed.
pub fn decode_device_control_string(
    bytes: &[u8],
    encoding: Encoding,
) -> Decoded {
    let Some(body) = bytes.get(INTRODUCER_LEN..) else {
        return Decoded::Incomplete;
    };

    let header = match DcsHeader::parse(body) {
        Ok(header) => header,
        Err(HeaderError::Truncated) => return Decoded::Incomplete,
        Err(e @ HeaderError::UnexpectedByte { offset, .. }) => {
            debug!("[DCS] {e}, ignoring up to the string terminator");
            return skip_malformed(bytes, INTRODUCER_LEN + offset);
        },
    };

    let function = DcsFunction::from(&header);
    let data_start = INTRODUCER_LEN + header.len();

    if function == DcsFunction::TmuxControlMode {
        return Decoded::Complete(Token::new(
            DcsToken::TmuxControlMode,
            data_start,
        ));
    }

    let StringEnd::Terminated { data_end } = find_string_end(bytes, data_start)
    else {
        return Decoded::Incomplete;
    };

    let data = &bytes[data_start..data_end];
    let token = match function {
        DcsFunction::CapabilityQuery => DcsToken::CapabilityQuery(
            termcap::parse_query(header.params, data, encoding),
        ),
        DcsFunction::CapabilityReport => DcsToken::CapabilityReport(
            termcap::parse_report(header.params, data, encoding),
        ),
        DcsFunction::StatusStringRequest => {
            DcsToken::StatusStringRequest(encoding.decode(data))
        },
        DcsFunction::TmuxControlMode | DcsFunction::Unknown => {
            debug!(
                "[DCS] unsupported function: params {:?}, intermediates {:?}, final {:?}",
                header.params, header.intermediates, header.final_byte as char
            );
            header.unrecognized(encoding, Rejection::UnknownFunction)
        },
    };

    Decoded::Complete(Token::new(token, data_end + ST_LEN))
}

fn skip_malformed(bytes: &[u8], from: usize) -> Decoded {
    let StringEnd::Terminated { data_end } = find_string_end(bytes, from) else {
        return Decoded::Incomplete;
    };

    let token = DcsToken::Unrecognized(UnrecognizedDcs {
        params: String::new(),
        intermediates: String::new(),
        final_byte: None,
        reason: Rejection::Malformed,
    });
    Decoded::Complete(Token::new(token, data_end + ST_LEN))
}
