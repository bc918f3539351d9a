//! Incremental decoders for terminal control strings.
//!
//! The dispatcher of a terminal byte stream checks the introducer with
//! [`is_dcs`] / [`is_xterm`] and hands the buffer to the matching decoder.
//! A decoder either returns a complete [`Token`] with the exact number of
//! bytes it covers, or [`Decoded::Incomplete`] so the caller can retry once
//! more bytes arrive. Sequences that are complete but not understood come
//! back as unrecognized tokens, never as errors.

mod control;
mod cursor;
mod dcs;
mod encoding;
mod incidental;
mod options;
mod osc;
mod prefix;
mod session;
mod token;

pub use control::ControlCode;
pub use cursor::Cursor;
pub use dcs::{
    CapabilityEntry, CapabilityQuery, CapabilityReport, CapabilityRequest,
    CapabilityRequestName, DcsToken, UnrecognizedDcs, capability_name_to_enum,
    decode_device_control_string, enum_to_capability_name,
};
pub use encoding::{Encoding, REPLACEMENT_CHAR};
pub use incidental::Incidentals;
pub use options::DecoderOptions;
pub use osc::{
    ClipboardType, ColorSpec, FileTransfer, Hyperlink, OperatingSystemCommand,
    Rgb, UnrecognizedXterm, XtermCommand, XtermToken, decode_xterm_sequence,
};
pub use prefix::{is_dcs, is_xterm};
pub use session::SessionState;
pub use token::{Decoded, Rejection, Token, TokenKind};
