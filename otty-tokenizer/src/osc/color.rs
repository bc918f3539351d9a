use serde::Serialize;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Hash, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Display for Rgb {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Color argument of a color setting command.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash, Serialize)]
pub enum ColorSpec {
    /// `?`, asks the terminal to report the current value.
    Query,
    Rgb(Rgb),
}

impl ColorSpec {
    pub(crate) fn parse(spec: &str) -> Option<Self> {
        match spec {
            "?" => Some(Self::Query),
            spec => xparse_color(spec.as_bytes()).map(Self::Rgb),
        }
    }
}

fn hex_value(digits: &[u8]) -> Option<u32> {
    let hex = std::str::from_utf8(digits).ok()?;
    if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Parse exactly six hex digits as `rrggbb`.
pub(crate) fn parse_hex_triplet(digits: &[u8]) -> Option<Rgb> {
    if digits.len() != 6 {
        return None;
    }

    let component = |idx: usize| hex_value(&digits[idx..idx + 2]).map(|v| v as u8);
    Some(Rgb {
        r: component(0)?,
        g: component(2)?,
        b: component(4)?,
    })
}

/// Parse colors in XParseColor format.
/// Supports `#rgb`/`#rrggbb` legacy and `rgb:r/g/b` forms used by xterm.
pub(crate) fn xparse_color(color: &[u8]) -> Option<Rgb> {
    if let Some(legacy) = color.strip_prefix(b"#") {
        parse_legacy_color(legacy)
    } else if let Some(rgb) = color.strip_prefix(b"rgb:") {
        parse_rgb_color(rgb)
    } else {
        None
    }
}

/// Parse colors in `#r(rrr)g(ggg)b(bbb)` format.
fn parse_legacy_color(color: &[u8]) -> Option<Rgb> {
    let color_len = color.len() / 3;
    if color_len == 0 || color_len > 4 || color.len() % 3 != 0 {
        return None;
    }

    // Keep the two most significant hex digits of each component.
    fn parse_color(slice: &[u8]) -> Option<u8> {
        let value = hex_value(slice)? << 4;
        let shift = 4 * slice.len().saturating_sub(1);
        Some((value >> shift) as u8)
    }

    let (r_slice, rest) = color.split_at(color_len);
    let (g_slice, b_slice) = rest.split_at(color_len);

    Some(Rgb {
        r: parse_color(r_slice)?,
        g: parse_color(g_slice)?,
        b: parse_color(b_slice)?,
    })
}

/// Parse colors in `rgb:r(rrr)/g(ggg)/b(bbb)` format.
fn parse_rgb_color(input: &[u8]) -> Option<Rgb> {
    let colors: Vec<&[u8]> = input.split(|&b| b == b'/').collect();
    let [r, g, b] = colors.as_slice() else {
        return None;
    };

    fn scale_hex(hex: &[u8]) -> Option<u8> {
        if hex.len() > 4 {
            return None;
        }

        let value = hex_value(hex)?;
        let max = u32::pow(16, hex.len() as u32) - 1;
        Some((255 * value / max) as u8)
    }

    Some(Rgb {
        r: scale_hex(r)?,
        g: scale_hex(g)?,
        b: scale_hex(b)?,
    })
}
