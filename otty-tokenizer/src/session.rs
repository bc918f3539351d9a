use crate::options::DecoderOptions;
use crate::osc::XtermState;

/// Per-stream state shared by the decoders across calls.
///
/// Each decoder owns a typed slot. A self-contained sequence leaves the state
/// untouched; multi-sequence protocols and resumable scans keep their markers
/// here between calls. One session belongs to one byte stream.
#[derive(Debug, Default)]
pub struct SessionState {
    pub(crate) options: DecoderOptions,
    pub(crate) xterm: XtermState,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: DecoderOptions) -> Self {
        Self {
            options,
            xterm: XtermState::default(),
        }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Whether a multipart file transfer is waiting for more parts.
    pub fn has_open_transfer(&self) -> bool {
        self.xterm.has_open_transfer()
    }

    /// Whether an OSC sequence was left incomplete by the last call.
    pub fn has_pending_scan(&self) -> bool {
        self.xterm.has_pending_scan()
    }
}
