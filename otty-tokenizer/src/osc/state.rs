use super::transfer::MultipartTransfer;

/// Cross-call state owned by the OSC decoder.
#[derive(Debug, Default)]
pub(crate) struct XtermState {
    /// Progress through a sequence whose terminator has not arrived yet.
    pub(super) scan: Option<ScanProgress>,
    /// Multipart file transfer opened by an earlier sequence.
    pub(super) transfer: Option<MultipartTransfer>,
}

impl XtermState {
    pub(crate) fn has_open_transfer(&self) -> bool {
        self.transfer.is_some()
    }

    pub(crate) fn has_pending_scan(&self) -> bool {
        self.scan.is_some()
    }
}

/// Inline file whose header was already emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct InlineStream {
    /// Offset up to which body bytes were emitted as incidentals.
    pub(super) body_sent: usize,
}

#[derive(Debug)]
pub(super) struct ScanProgress {
    /// Every byte examined so far, introducer included.
    scanned_bytes: Vec<u8>,
    payload_start: usize,
    pub(super) stream: Option<InlineStream>,
}

impl ScanProgress {
    pub(super) fn new(
        bytes: &[u8],
        payload_start: usize,
        scanned: usize,
        stream: Option<InlineStream>,
    ) -> Self {
        Self {
            scanned_bytes: bytes[..scanned].to_vec(),
            payload_start,
            stream,
        }
    }

    /// Offset, from the introducer, where scanning resumes.
    pub(super) fn scanned(&self) -> usize {
        self.scanned_bytes.len()
    }

    /// Whether `bytes` re-delivers the sequence this progress belongs to.
    pub(super) fn matches(&self, bytes: &[u8], payload_start: usize) -> bool {
        self.payload_start == payload_start
            && bytes.starts_with(&self.scanned_bytes)
    }
}
