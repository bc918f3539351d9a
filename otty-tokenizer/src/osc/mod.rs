mod color;
mod command;
mod state;
mod transfer;

use std::borrow::Cow;

use log::debug;
use serde::Serialize;

use crate::control::{BEL, ControlCode, ESC, is_c0};
use crate::cursor::Cursor;
use crate::encoding::Encoding;
use crate::incidental::Incidentals;
use crate::options::DecoderOptions;
use crate::session::SessionState;
use crate::token::{Decoded, Rejection, Token};
pub use color::{ColorSpec, Rgb};
pub use command::{
    ClipboardType, Hyperlink, OperatingSystemCommand, XtermCommand,
};
pub(crate) use state::XtermState;
use state::{InlineStream, ScanProgress};
pub use transfer::FileTransfer;
use transfer::{FILE_PART_PREFIX, INLINE_FILE_PREFIX};

/// Length of the `ESC ]` introducer.
const INTRODUCER_LEN: usize = 2;

/// Length of the `ESC \` string terminator.
const ST_LEN: usize = 2;

/// `ESC ] P n rr gg bb`, Linux console palette update.
const PALETTE_SET_LEN: usize = 10;

/// `ESC ] R`, Linux console palette reset.
const PALETTE_RESET_LEN: usize = 3;

/// Longest command code accepted, enough for any `u32`.
const MAX_CODE_DIGITS: usize = 10;

/// Code of the iTerm2 extensions carrying file transfers.
const ITERM_CODE: u32 = 1337;

/// Decoded operating system command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum XtermToken {
    Command(XtermCommand),
    /// Linux console palette entry update.
    SetPalette { index: u8, color: Rgb },
    ResetPalette,
    /// Step of a multipart file transfer (`1337;MultipartFile=`).
    FileTransfer(FileTransfer),
    /// Arguments of an inline file (`1337;File=args:`), emitted as an
    /// incidental once the `:` arrives.
    InlineFileHeader { args: String },
    /// Chunk of inline file data, emitted as an incidental.
    InlineFileBody(String),
    /// Terminator of a streamed inline file.
    InlineFileEnd,
    Unrecognized(UnrecognizedXterm),
}

impl XtermToken {
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Self::Unrecognized(_))
    }
}

/// Complete OSC that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnrecognizedXterm {
    /// Command code, `None` when missing or malformed.
    pub code: Option<u32>,
    pub payload: String,
    pub reason: Rejection,
}

fn unrecognized(
    code: Option<u32>,
    payload: String,
    reason: Rejection,
) -> XtermToken {
    XtermToken::Unrecognized(UnrecognizedXterm {
        code,
        payload,
        reason,
    })
}

fn parse_code(input: &[u8]) -> Option<u32> {
    if input.is_empty() {
        return None;
    }

    input.iter().try_fold(0u32, |acc, &b| {
        let d = (b as char).to_digit(10)?;
        acc.checked_mul(10)?.checked_add(d)
    })
}

/// `digits ;` part following the introducer.
#[derive(Debug, PartialEq, Eq)]
struct CommandHeader {
    /// `None` when the code is missing or malformed.
    code: Option<u32>,
    payload_start: usize,
}

impl CommandHeader {
    /// Returns `None` while more bytes are needed to delimit the header.
    fn parse(bytes: &[u8]) -> Option<Self> {
        let body = bytes.get(INTRODUCER_LEN..)?;
        let digits = body
            .iter()
            .take(MAX_CODE_DIGITS + 1)
            .take_while(|b| b.is_ascii_digit())
            .count();

        if digits > MAX_CODE_DIGITS {
            return Some(Self {
                code: None,
                payload_start: INTRODUCER_LEN,
            });
        }

        let code_end = INTRODUCER_LEN + digits;
        let code = parse_code(&body[..digits]);
        let header = match bytes.get(code_end).copied()? {
            b';' => Self {
                code,
                payload_start: code_end + 1,
            },
            BEL | ESC => Self {
                code,
                payload_start: code_end,
            },
            _ => Self {
                code: None,
                payload_start: code_end,
            },
        };

        Some(header)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum PayloadEnd {
    /// `BEL` or `ESC \` found; `end` is the offset of the terminator.
    Terminated { end: usize, consumed: usize },
    /// A new escape sequence starts at `end`.
    Interrupted { end: usize },
    /// `CAN` or `SUB` at `end`.
    Cancelled { end: usize },
    /// Everything before `scanned` was examined.
    Missing { scanned: usize },
}

/// Copy of `bytes` with the C0 controls removed.
fn strip_controls(bytes: &[u8]) -> Cow<'_, [u8]> {
    if bytes.iter().any(|&b| is_c0(b)) {
        Cow::Owned(bytes.iter().copied().filter(|&b| !is_c0(b)).collect())
    } else {
        Cow::Borrowed(bytes)
    }
}

/// Walks the payload of one sequence, reporting embedded controls and inline
/// file chunks as incidentals.
struct Scan<'a> {
    bytes: &'a [u8],
    encoding: Encoding,
    payload_start: usize,
    bell_terminates: bool,
    /// Payload is a `1337;File=` inline file.
    inline_file: bool,
    stream: Option<InlineStream>,
}

impl<'a> Scan<'a> {
    fn new(
        bytes: &'a [u8],
        encoding: Encoding,
        header: &CommandHeader,
        stream: Option<InlineStream>,
    ) -> Self {
        let payload = &bytes[header.payload_start..];
        let iterm = header.code == Some(ITERM_CODE);

        Self {
            bytes,
            encoding,
            payload_start: header.payload_start,
            bell_terminates: !(iterm && payload.starts_with(FILE_PART_PREFIX)),
            inline_file: iterm && payload.starts_with(INLINE_FILE_PREFIX),
            stream,
        }
    }

    fn is_stop(&self, byte: u8) -> bool {
        is_c0(byte) || (byte == b':' && self.inline_file && self.stream.is_none())
    }

    fn run(&mut self, from: usize, incidentals: &mut Incidentals) -> PayloadEnd {
        let bytes = self.bytes;
        let mut at = from;

        loop {
            let Some(offset) = bytes[at..].iter().position(|&b| self.is_stop(b))
            else {
                break;
            };

            let idx = at + offset;
            match bytes[idx] {
                b':' => self.open_stream(idx, incidentals),
                BEL if self.bell_terminates => {
                    return PayloadEnd::Terminated {
                        end: idx,
                        consumed: idx + 1,
                    };
                },
                ESC => {
                    return match bytes.get(idx + 1) {
                        Some(b'\\') => PayloadEnd::Terminated {
                            end: idx,
                            consumed: idx + ST_LEN,
                        },
                        Some(_) => PayloadEnd::Interrupted { end: idx },
                        None => PayloadEnd::Missing { scanned: idx },
                    };
                },
                byte => {
                    let code = ControlCode::from(byte);
                    if code.cancels_sequence() {
                        return PayloadEnd::Cancelled { end: idx };
                    }
                    if code == ControlCode::Bell || code.is_significant() {
                        self.push_control(idx, code, incidentals);
                    }
                },
            }
            at = idx + 1;
        }

        PayloadEnd::Missing {
            scanned: self.bytes.len(),
        }
    }

    fn push_control(
        &mut self,
        at: usize,
        code: ControlCode,
        incidentals: &mut Incidentals,
    ) {
        self.flush_body(at, incidentals);
        incidentals.push(Token::new(code, 1));
    }

    fn open_stream(&mut self, colon: usize, incidentals: &mut Incidentals) {
        let args_start = self.payload_start + INLINE_FILE_PREFIX.len();
        let args = self.text(args_start, colon);
        incidentals.push(Token::new(
            XtermToken::InlineFileHeader { args },
            colon + 1 - self.payload_start,
        ));
        self.stream = Some(InlineStream {
            body_sent: colon + 1,
        });
    }

    /// Emit the inline file bytes received since the last flush.
    fn flush_body(&mut self, upto: usize, incidentals: &mut Incidentals) {
        let Some(sent) = self.stream.map(|stream| stream.body_sent) else {
            return;
        };
        if upto <= sent {
            return;
        }

        let chunk = self.text(sent, upto);
        if !chunk.is_empty() {
            incidentals.push(Token::new(
                XtermToken::InlineFileBody(chunk),
                upto - sent,
            ));
        }
        self.stream = Some(InlineStream { body_sent: upto });
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.encoding.decode(&strip_controls(&self.bytes[start..end]))
    }

    fn payload(&self, end: usize) -> String {
        self.text(self.payload_start, end)
    }
}

/// Decode the operating system command under `cursor`.
///
/// The cursor must sit on `ESC ]`. On success it is advanced past the
/// sequence; when the terminator has not arrived yet it stays put and the
/// progress made so far is kept in `session`, so calling again with the same
/// buffer extended by new bytes resumes where scanning stopped. Controls
/// found inside the sequence are appended to `incidentals` exactly once.
///
/// Payload text is decoded with the cursor's [`Cursor::encoding`].
pub fn decode_xterm_sequence(
    cursor: &mut Cursor<'_>,
    incidentals: &mut Incidentals,
    session: &mut SessionState,
) -> Decoded {
    let decoded = decode(
        cursor.remaining(),
        cursor.encoding(),
        incidentals,
        &mut session.xterm,
        &session.options,
    );

    if let Decoded::Complete(token) = &decoded {
        cursor.advance(token.consumed());
    }
    decoded
}

fn decode(
    bytes: &[u8],
    encoding: Encoding,
    incidentals: &mut Incidentals,
    state: &mut XtermState,
    options: &DecoderOptions,
) -> Decoded {
    let progress = state.scan.take();

    match bytes.get(INTRODUCER_LEN) {
        Some(b'P') => return decode_palette_set(bytes),
        Some(b'R') => {
            return Decoded::Complete(Token::new(
                XtermToken::ResetPalette,
                PALETTE_RESET_LEN,
            ));
        },
        _ => {},
    }

    let Some(header) = CommandHeader::parse(bytes) else {
        return Decoded::Incomplete;
    };

    let (from, stream) = match progress {
        Some(progress) if progress.matches(bytes, header.payload_start) => {
            (progress.scanned(), progress.stream)
        },
        Some(_) => {
            debug!("[OSC] discarding progress of a different sequence");
            (header.payload_start, None)
        },
        None => (header.payload_start, None),
    };

    let mut scan = Scan::new(bytes, encoding, &header, stream);
    let (end, consumed) = match scan.run(from, incidentals) {
        PayloadEnd::Terminated { end, consumed } => (end, consumed),
        PayloadEnd::Interrupted { end } => {
            debug!("[OSC] sequence interrupted by a new escape sequence");
            (end, end)
        },
        PayloadEnd::Cancelled { end } => {
            debug!("[OSC] sequence cancelled");
            let token =
                unrecognized(header.code, scan.payload(end), Rejection::Cancelled);
            return Decoded::Complete(Token::new(token, end));
        },
        PayloadEnd::Missing { scanned } => {
            scan.flush_body(scanned, incidentals);
            state.scan = Some(ScanProgress::new(
                bytes,
                header.payload_start,
                scanned,
                scan.stream,
            ));
            return Decoded::Incomplete;
        },
    };

    if scan.stream.is_some() {
        scan.flush_body(end, incidentals);
        return Decoded::Complete(Token::new(XtermToken::InlineFileEnd, consumed));
    }

    let payload = scan.payload(end);
    let token = match header.code {
        None => {
            debug!("[OSC] malformed command code, payload {payload:?}");
            unrecognized(None, payload, Rejection::Malformed)
        },
        Some(ITERM_CODE) => {
            match transfer::apply(&payload, &mut state.transfer, options) {
                Some(Ok(step)) => XtermToken::FileTransfer(step),
                Some(Err(e)) => {
                    debug!("[OSC] file transfer rejected: {e}");
                    unrecognized(Some(ITERM_CODE), payload, Rejection::from(&e))
                },
                None => XtermToken::Command(XtermCommand::new(ITERM_CODE, payload)),
            }
        },
        Some(code)
            if OperatingSystemCommand::from(code)
                == OperatingSystemCommand::Unhandled =>
        {
            debug!("[OSC] unhandled command {code}, payload {payload:?}");
            unrecognized(Some(code), payload, Rejection::UnknownFunction)
        },
        Some(code) => XtermToken::Command(XtermCommand::new(code, payload)),
    };

    Decoded::Complete(Token::new(token, consumed))
}

fn decode_palette_set(bytes: &[u8]) -> Decoded {
    let digits = &bytes[PALETTE_RESET_LEN..bytes.len().min(PALETTE_SET_LEN)];
    if !digits.iter().all(u8::is_ascii_hexdigit) {
        debug!("[OSC] invalid palette update: {digits:?}");
        let token = unrecognized(None, String::new(), Rejection::Malformed);
        return Decoded::Complete(Token::new(token, PALETTE_RESET_LEN));
    }
    if bytes.len() < PALETTE_SET_LEN {
        return Decoded::Incomplete;
    }

    let index = (digits[0] as char).to_digit(16);
    match (index, color::parse_hex_triplet(&digits[1..])) {
        (Some(index), Some(color)) => Decoded::Complete(Token::new(
            XtermToken::SetPalette {
                index: index as u8,
                color,
            },
            PALETTE_SET_LEN,
        )),
        _ => {
            let token = unrecognized(None, String::new(), Rejection::Malformed);
            Decoded::Complete(Token::new(token, PALETTE_RESET_LEN))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    struct Run {
        decoded: Decoded,
        incidentals: Vec<TokenKind>,
        position: usize,
    }

    fn run(bytes: &[u8], session: &mut SessionState) -> Run {
        let mut cursor = Cursor::new(bytes, Encoding::Utf8);
        let mut incidentals = Incidentals::new();
        let decoded =
            decode_xterm_sequence(&mut cursor, &mut incidentals, session);

        Run {
            decoded,
            incidentals: incidentals.into_iter().map(Token::into_kind).collect(),
            position: cursor.position(),
        }
    }

    fn run_once(bytes: &[u8]) -> Run {
        run(bytes, &mut SessionState::new())
    }

    fn xterm(decoded: &Decoded) -> &XtermToken {
        match decoded.token().map(Token::kind) {
            Some(TokenKind::Xterm(token)) => token,
            other => panic!("expected an OSC token, got {other:?}"),
        }
    }

    fn command(code: u32, payload: &str) -> XtermToken {
        XtermToken::Command(XtermCommand::new(code, payload.to_string()))
    }

    #[test]
    fn decodes_color_index_command() {
        let input = b"\x1b]4;1;rgb:ff/00/00\x07";
        let result = run_once(input);

        assert_eq!(result.decoded.consumed(), 19);
        assert_eq!(result.position, 19);
        assert_eq!(xterm(&result.decoded), &command(4, "1;rgb:ff/00/00"));
        assert!(result.incidentals.is_empty());
    }

    #[test]
    fn incomplete_leaves_cursor_in_place() {
        let mut session = SessionState::new();
        let result = run(b"\x1b]4;1", &mut session);

        assert!(result.decoded.is_incomplete());
        assert_eq!(result.decoded.consumed(), 0);
        assert_eq!(result.position, 0);
        assert!(session.has_pending_scan());
    }

    #[test]
    fn split_delivery_yields_identical_token() {
        let input = b"\x1b]8;id=a;https://otty.sh\x1b\\";
        let expected = run_once(input).decoded;

        for split in 0..input.len() {
            let mut session = SessionState::new();
            let first = run(&input[..split], &mut session);
            assert!(first.decoded.is_incomplete(), "split at {split}");

            let second = run(input, &mut session);
            assert_eq!(second.decoded, expected, "split at {split}");
            assert!(!session.has_pending_scan());
        }
    }

    #[test]
    fn bel_and_st_terminate_alike() {
        let bel = run_once(b"\x1b]0;title\x07");
        let st = run_once(b"\x1b]0;title\x1b\\");

        assert_eq!(bel.decoded.consumed(), 10);
        assert_eq!(st.decoded.consumed(), 11);
        assert_eq!(xterm(&bel.decoded), xterm(&st.decoded));
    }

    #[test]
    fn empty_payloads() {
        let result = run_once(b"\x1b]2;\x07");
        assert_eq!(result.decoded.consumed(), 5);
        assert_eq!(xterm(&result.decoded), &command(2, ""));

        let result = run_once(b"\x1b]104\x07");
        assert_eq!(result.decoded.consumed(), 6);
        let XtermToken::Command(cmd) = xterm(&result.decoded) else {
            panic!("expected command");
        };
        assert_eq!(cmd.command, OperatingSystemCommand::ResetIndexedColors);
        assert_eq!(cmd.payload, "");

        assert_eq!(run_once(b"\x1b]104\x1b\\").decoded.consumed(), 7);
    }

    #[test]
    fn unknown_code_keeps_code_and_payload() {
        let result = run_once(b"\x1b]3;x=1\x07");
        assert_eq!(result.decoded.consumed(), 8);
        assert_eq!(
            xterm(&result.decoded),
            &unrecognized(Some(3), "x=1".to_string(), Rejection::UnknownFunction)
        );
        assert!(result.decoded.token().is_some_and(Token::is_unrecognized));
    }

    #[test]
    fn malformed_codes_are_skipped_to_terminator() {
        let input = b"\x1b]4x;1\x07next";
        let result = run_once(input);
        assert_eq!(result.decoded.consumed(), 7);
        assert_eq!(
            xterm(&result.decoded),
            &unrecognized(None, "x;1".to_string(), Rejection::Malformed)
        );

        let result = run_once(b"\x1b];x\x07");
        assert_eq!(
            xterm(&result.decoded),
            &unrecognized(None, "x".to_string(), Rejection::Malformed)
        );

        let result = run_once(b"\x1b]9999999999;x\x07");
        assert_eq!(
            xterm(&result.decoded),
            &unrecognized(None, "x".to_string(), Rejection::Malformed)
        );
    }

    #[test]
    fn overlong_code_is_malformed() {
        let input = b"\x1b]12345678901;x\x07";
        let result = run_once(input);
        assert_eq!(result.decoded.consumed(), input.len());
        assert_eq!(
            xterm(&result.decoded),
            &unrecognized(None, "12345678901;x".to_string(), Rejection::Malformed)
        );
    }

    #[test]
    fn invalid_utf8_becomes_replacement() {
        let result = run_once(b"\x1b]2;a\xffb\x07");
        assert_eq!(xterm(&result.decoded), &command(2, "a\u{FFFD}b"));
    }

    #[test]
    fn latin1_payload() {
        let mut cursor = Cursor::new(b"\x1b]2;caf\xe9\x07", Encoding::Latin1);
        let mut incidentals = Incidentals::new();
        let decoded = decode_xterm_sequence(
            &mut cursor,
            &mut incidentals,
            &mut SessionState::new(),
        );
        assert_eq!(xterm(&decoded), &command(2, "café"));
    }

    #[test]
    fn enquiry_is_reported_and_dropped() {
        let result = run_once(b"\x1b]2;a\x05b\x01c\x07");
        assert_eq!(xterm(&result.decoded), &command(2, "abc"));
        assert_eq!(
            result.incidentals,
            vec![TokenKind::Control(ControlCode::Enquiry)]
        );
    }

    #[test]
    fn interrupted_sequence_is_dispatched() {
        let input = b"\x1b]2;title\x1b[31m";
        let result = run_once(input);
        assert_eq!(result.decoded.consumed(), 9);
        assert_eq!(result.position, 9);
        assert_eq!(xterm(&result.decoded), &command(2, "title"));
    }

    #[test]
    fn cancel_aborts_before_the_cancelling_byte() {
        for cancel in [0x18, 0x1A] {
            let input =
                [b"\x1b]2;ti".as_slice(), &[cancel][..], b"tle\x07"].concat();
            let result = run_once(&input);
            assert_eq!(result.decoded.consumed(), 6);
            assert_eq!(
                xterm(&result.decoded),
                &unrecognized(Some(2), "ti".to_string(), Rejection::Cancelled)
            );
        }
    }

    #[test]
    fn trailing_escape_waits_for_next_byte() {
        let mut session = SessionState::new();
        assert!(run(b"\x1b]2;title\x1b", &mut session).decoded.is_incomplete());

        let result = run(b"\x1b]2;title\x1b\\", &mut session);
        assert_eq!(result.decoded.consumed(), 11);
        assert_eq!(xterm(&result.decoded), &command(2, "title"));
    }

    #[test]
    fn leaves_trailing_bytes() {
        let result = run_once(b"\x1b]0;t\x07rest");
        assert_eq!(result.decoded.consumed(), 6);
        assert_eq!(result.position, 6);
    }

    #[test]
    fn linux_palette_sequences() {
        let result = run_once(b"\x1b]P1ff0000rest");
        assert_eq!(result.decoded.consumed(), 10);
        assert_eq!(
            xterm(&result.decoded),
            &XtermToken::SetPalette {
                index: 1,
                color: Rgb { r: 0xFF, g: 0, b: 0 }
            }
        );

        let result = run_once(b"\x1b]Pa00ff00");
        assert!(matches!(
            xterm(&result.decoded),
            XtermToken::SetPalette { index: 10, .. }
        ));

        assert!(run_once(b"\x1b]P1ff").decoded.is_incomplete());

        let result = run_once(b"\x1b]P1fg");
        assert_eq!(result.decoded.consumed(), 3);
        assert_eq!(
            xterm(&result.decoded),
            &unrecognized(None, String::new(), Rejection::Malformed)
        );

        let result = run_once(b"\x1b]Rtail");
        assert_eq!(result.decoded.consumed(), 3);
        assert_eq!(xterm(&result.decoded), &XtermToken::ResetPalette);
    }

    #[test]
    fn multipart_transfer_across_sequences() {
        let mut session = SessionState::new();

        let result = run(b"\x1b]1337;MultipartFile=name=YQ==\x07", &mut session);
        assert_eq!(
            xterm(&result.decoded),
            &XtermToken::FileTransfer(FileTransfer::Begin {
                args: "name=YQ==".to_string()
            })
        );
        assert!(session.has_open_transfer());

        let input = b"\x1b]1337;FilePart=QU\x07JD\x1b\\";
        let result = run(input, &mut session);
        assert_eq!(result.decoded.consumed(), input.len());
        assert_eq!(
            xterm(&result.decoded),
            &XtermToken::FileTransfer(FileTransfer::Part {
                data: "QUJD".to_string()
            })
        );
        assert_eq!(
            result.incidentals,
            vec![TokenKind::Control(ControlCode::Bell)]
        );

        let result = run(b"\x1b]1337;FileEnd\x07", &mut session);
        assert_eq!(
            xterm(&result.decoded),
            &XtermToken::FileTransfer(FileTransfer::End {
                args: "name=YQ==".to_string(),
                parts: 1,
                bytes: 4,
            })
        );
        assert!(!session.has_open_transfer());
    }

    #[test]
    fn file_part_without_transfer_is_rejected() {
        let result = run_once(b"\x1b]1337;FilePart=AAAA\x1b\\");
        assert_eq!(
            xterm(&result.decoded),
            &unrecognized(
                Some(ITERM_CODE),
                "FilePart=AAAA".to_string(),
                Rejection::NoOpenTransfer
            )
        );
    }

    #[test]
    fn transfer_limit_aborts() {
        let mut session = SessionState::with_options(DecoderOptions {
            max_transfer_bytes: 4,
        });
        let _ = run(b"\x1b]1337;MultipartFile=\x07", &mut session);

        let result = run(b"\x1b]1337;FilePart=AAAAA\x1b\\", &mut session);
        assert!(matches!(
            xterm(&result.decoded),
            XtermToken::Unrecognized(UnrecognizedXterm {
                reason: Rejection::TransferLimitExceeded,
                ..
            })
        ));
        assert!(!session.has_open_transfer());
    }

    #[test]
    fn other_iterm_extensions_are_commands() {
        let result = run_once(b"\x1b]1337;SetMark\x07");
        assert_eq!(xterm(&result.decoded), &command(ITERM_CODE, "SetMark"));
    }

    #[test]
    fn inline_file_in_one_shot() {
        let input = b"\x1b]1337;File=name=YQ==;inline=1:QUJD\x07";
        let result = run_once(input);

        assert_eq!(result.decoded.consumed(), input.len());
        assert_eq!(xterm(&result.decoded), &XtermToken::InlineFileEnd);
        assert_eq!(
            result.incidentals,
            vec![
                TokenKind::Xterm(XtermToken::InlineFileHeader {
                    args: "name=YQ==;inline=1".to_string()
                }),
                TokenKind::Xterm(XtermToken::InlineFileBody("QUJD".to_string())),
            ]
        );
    }

    #[test]
    fn inline_file_streams_while_incomplete() {
        let input = b"\x1b]1337;File=name=YQ==:QUJD\x07";
        let single = run_once(input);
        let mut session = SessionState::new();

        let result = run(b"\x1b]1337;File=name", &mut session);
        assert!(result.decoded.is_incomplete());
        assert!(result.incidentals.is_empty());

        let result = run(&input[..input.len() - 3], &mut session);
        assert!(result.decoded.is_incomplete());
        assert_eq!(
            result.incidentals,
            vec![
                TokenKind::Xterm(XtermToken::InlineFileHeader {
                    args: "name=YQ==".to_string()
                }),
                TokenKind::Xterm(XtermToken::InlineFileBody("QU".to_string())),
            ]
        );

        let result = run(input, &mut session);
        assert_eq!(result.decoded, single.decoded);
        assert_eq!(
            result.incidentals,
            vec![TokenKind::Xterm(XtermToken::InlineFileBody("JD".to_string()))]
        );
    }

    #[test]
    fn resumed_scan_reports_incidentals_once() {
        let mut session = SessionState::new();

        let result = run(b"\x1b]2;a\x05b", &mut session);
        assert!(result.decoded.is_incomplete());
        assert_eq!(
            result.incidentals,
            vec![TokenKind::Control(ControlCode::Enquiry)]
        );

        let result = run(b"\x1b]2;a\x05bc\x07", &mut session);
        assert!(result.incidentals.is_empty());
        assert_eq!(xterm(&result.decoded), &command(2, "abc"));
    }

    #[test]
    fn split_color_index_command() {
        let input = b"\x1b]4;1;rgb:ff/00/00\x07";
        let mut session = SessionState::new();

        let first = run(b"\x1b]4;1;", &mut session);
        assert!(first.decoded.is_incomplete());
        assert_eq!(first.position, 0);

        let second = run(input, &mut session);
        assert_eq!(second.decoded, run_once(input).decoded);
        assert_eq!(second.position, input.len());
        assert_eq!(xterm(&second.decoded), &command(4, "1;rgb:ff/00/00"));
    }

    #[test]
    fn progress_of_a_different_payload_with_same_tail_is_dropped() {
        let tail = "a".repeat(20);
        let mut session = SessionState::new();

        let abandoned = format!("\x1b]2;xxxxx{tail}");
        assert!(run(abandoned.as_bytes(), &mut session).decoded.is_incomplete());

        let next = format!("\x1b]2;x\x05xxx{tail}\x07");
        let result = run(next.as_bytes(), &mut session);
        assert_eq!(
            xterm(&result.decoded),
            &command(2, &format!("xxxx{tail}"))
        );
        assert_eq!(
            result.incidentals,
            vec![TokenKind::Control(ControlCode::Enquiry)]
        );
    }

    #[test]
    fn stale_progress_is_discarded() {
        let mut session = SessionState::new();
        assert!(run(b"\x1b]2;a\x05", &mut session).decoded.is_incomplete());

        let result = run(b"\x1b]2;b\x05c\x07", &mut session);
        assert_eq!(xterm(&result.decoded), &command(2, "bc"));
        assert_eq!(
            result.incidentals,
            vec![TokenKind::Control(ControlCode::Enquiry)]
        );

        assert!(run(b"\x1b]2;abc", &mut session).decoded.is_incomplete());
        let result = run(b"\x1b]0;xyz\x07", &mut session);
        assert_eq!(xterm(&result.decoded), &command(0, "xyz"));
        assert!(!session.has_pending_scan());
    }

    #[test]
    fn header_parsing() {
        assert_eq!(CommandHeader::parse(b"\x1b"), None);
        assert_eq!(CommandHeader::parse(b"\x1b]"), None);
        assert_eq!(CommandHeader::parse(b"\x1b]12"), None);
        assert_eq!(
            CommandHeader::parse(b"\x1b]12;"),
            Some(CommandHeader {
                code: Some(12),
                payload_start: 5
            })
        );
        assert_eq!(
            CommandHeader::parse(b"\x1b]104\x07"),
            Some(CommandHeader {
                code: Some(104),
                payload_start: 5
            })
        );
    }

    #[test]
    fn parse_code_limits() {
        assert_eq!(parse_code(b""), None);
        assert_eq!(parse_code(b"1a"), None);
        assert_eq!(parse_code(b"4294967295"), Some(u32::MAX));
        assert_eq!(parse_code(b"4294967296"), None);
    }

    #[test]
    fn serializes_commands() {
        let json = serde_json::to_value(command(2, "t")).expect("serializable");
        assert_eq!(
            json,
            serde_json::json!({
                "Command": { "code": 2, "command": "SetWindowTitle", "payload": "t" }
            })
        );
    }
}
