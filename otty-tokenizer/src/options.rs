/// Default upper bound for a multipart file transfer (16MiB of payload).
const DEFAULT_MAX_TRANSFER_BYTES: usize = 0x100_0000;

/// Configuration knobs that influence how decoders treat long-lived protocols.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Maximum number of encoded payload bytes accepted for one multipart
    /// file transfer before it is aborted.
    pub max_transfer_bytes: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_transfer_bytes: DEFAULT_MAX_TRANSFER_BYTES,
        }
    }
}
