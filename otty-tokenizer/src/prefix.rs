//! Entry checks used by the dispatcher to pick a decoder.

use crate::control::ESC;

/// Whether `bytes` could begin a Device Control String (`ESC P`).
#[inline]
pub fn is_dcs(bytes: &[u8]) -> bool {
    matches!(bytes, [ESC, b'P', ..])
}

/// Whether `bytes` could begin an operating system command (`ESC ]`).
#[inline]
pub fn is_xterm(bytes: &[u8]) -> bool {
    matches!(bytes, [ESC, b']', ..])
}
