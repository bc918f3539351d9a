//! iTerm2 file transfer extensions of OSC 1337.
//!
//! A multipart transfer spans several sequences:
//! `MultipartFile=args`, any number of `FilePart=data` and a final `FileEnd`.
//! The open transfer lives in the session between those sequences.

use log::warn;
use serde::Serialize;
use thiserror::Error;

use crate::options::DecoderOptions;
use crate::token::Rejection;

/// Key opening a multipart transfer.
const MULTIPART_FILE: &str = "MultipartFile";
/// Key carrying one chunk of a multipart transfer.
const FILE_PART: &str = "FilePart";
/// Key closing a multipart transfer.
const FILE_END: &str = "FileEnd";

/// Payload prefix of a transfer chunk. `BEL` does not terminate these.
pub(super) const FILE_PART_PREFIX: &[u8] = b"FilePart=";
/// Payload prefix of an inline file, streamed once its `:` arrives.
pub(super) const INLINE_FILE_PREFIX: &[u8] = b"File=";

/// Step of a multipart file transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FileTransfer {
    Begin { args: String },
    /// Encoded chunk of file data.
    Part { data: String },
    End {
        args: String,
        parts: usize,
        /// Total encoded bytes received.
        bytes: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MultipartTransfer {
    args: String,
    parts: usize,
    bytes: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(super) enum TransferError {
    #[error("no multipart transfer in progress")]
    NotOpen,

    #[error("multipart transfer exceeds the limit of {limit} bytes")]
    LimitExceeded { limit: usize },
}

impl From<&TransferError> for Rejection {
    fn from(value: &TransferError) -> Self {
        match value {
            TransferError::NotOpen => Rejection::NoOpenTransfer,
            TransferError::LimitExceeded { .. } => {
                Rejection::TransferLimitExceeded
            },
        }
    }
}

/// Apply an OSC 1337 payload to the open transfer.
///
/// Returns `None` when the payload does not belong to the multipart protocol.
pub(super) fn apply(
    payload: &str,
    transfer: &mut Option<MultipartTransfer>,
    options: &DecoderOptions,
) -> Option<Result<FileTransfer, TransferError>> {
    let (key, value) = payload.split_once('=').unwrap_or((payload, ""));

    let step = match key {
        MULTIPART_FILE => {
            let opened = MultipartTransfer {
                args: value.to_owned(),
                parts: 0,
                bytes: 0,
            };
            if let Some(stale) = transfer.replace(opened) {
                warn!(
                    "[OSC] multipart transfer {:?} replaced after {} parts",
                    stale.args, stale.parts
                );
            }
            Ok(FileTransfer::Begin {
                args: value.to_owned(),
            })
        },
        FILE_PART => append_part(value, transfer, options),
        FILE_END if value.is_empty() => transfer
            .take()
            .map(|done| FileTransfer::End {
                args: done.args,
                parts: done.parts,
                bytes: done.bytes,
            })
            .ok_or(TransferError::NotOpen),
        _ => return None,
    };

    Some(step)
}

fn append_part(
    data: &str,
    transfer: &mut Option<MultipartTransfer>,
    options: &DecoderOptions,
) -> Result<FileTransfer, TransferError> {
    let open = transfer.as_mut().ok_or(TransferError::NotOpen)?;

    let total = open.bytes.saturating_add(data.len());
    if total > options.max_transfer_bytes {
        *transfer = None;
        return Err(TransferError::LimitExceeded {
            limit: options.max_transfer_bytes,
        });
    }

    open.bytes = total;
    open.parts += 1;
    Ok(FileTransfer::Part {
        data: data.to_owned(),
    })
}
