use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub(super) enum HexError {
    #[error("odd number of hex digits ({0})")]
    OddLength(usize),

    #[error("invalid hex digit 0x{byte:02X} at offset {offset}")]
    InvalidDigit { byte: u8, offset: usize },
}

fn nibble(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Decode pairs of hex digits into raw bytes.
pub(super) fn decode(digits: &[u8]) -> Result<Vec<u8>, HexError> {
    if digits.len() % 2 != 0 {
        return Err(HexError::OddLength(digits.len()));
    }

    digits
        .chunks_exact(2)
        .enumerate()
        .map(|(idx, pair)| {
            let offset = idx * 2;
            let hi = nibble(pair[0]).ok_or(HexError::InvalidDigit {
                byte: pair[0],
                offset,
            })?;
            let lo = nibble(pair[1]).ok_or(HexError::InvalidDigit {
                byte: pair[1],
                offset: offset + 1,
            })?;
            Ok((hi << 4) | lo)
        })
        .collect()
}
