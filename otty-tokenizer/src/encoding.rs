use serde::Serialize;

/// Marker substituted for every character that is not valid in the active
/// encoding.
pub const REPLACEMENT_CHAR: char = char::REPLACEMENT_CHARACTER;

/// Text encoding used to turn control string payloads into Rust strings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Encoding {
    #[default]
    Utf8,
    /// ISO-8859-1, every byte maps to the code point of the same value.
    Latin1,
    /// 7-bit US-ASCII.
    Ascii,
}

impl Encoding {
    /// Decode `bytes`, replacing invalid characters with [`REPLACEMENT_CHAR`].
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            Self::Ascii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { b as char } else { REPLACEMENT_CHAR })
                .collect(),
        }
    }
}
