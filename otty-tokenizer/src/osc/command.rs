use cursor_icon::CursorIcon;
use log::debug;
use serde::Serialize;

use super::color::ColorSpec;

/// Operating system command selected by the numeric code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum OperatingSystemCommand {
    SetIconNameAndWindowTitle,
    SetIconName,
    SetWindowTitle,
    SetColorIndex,
    SetSpecialColor,
    CurrentDirectory,
    Hyperlink,
    Notification,
    SetTextForegroundColor,
    SetTextBackgroundColor,
    SetTextCursorColor,
    SetMouseCursorShape,
    SetCursorStyle,
    Clipboard,
    ResetIndexedColors,
    ResetForegroundColor,
    ResetBackgroundColor,
    ResetCursorColor,
    ShellIntegration,
    /// `1337`, iTerm2 proprietary extensions.
    ITermExtension,
    Unhandled,
}

impl From<u32> for OperatingSystemCommand {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::SetIconNameAndWindowTitle,
            1 => Self::SetIconName,
            2 => Self::SetWindowTitle,
            4 => Self::SetColorIndex,
            5 => Self::SetSpecialColor,
            7 => Self::CurrentDirectory,
            8 => Self::Hyperlink,
            9 => Self::Notification,
            10 => Self::SetTextForegroundColor,
            11 => Self::SetTextBackgroundColor,
            12 => Self::SetTextCursorColor,
            22 => Self::SetMouseCursorShape,
            50 => Self::SetCursorStyle,
            52 => Self::Clipboard,
            104 => Self::ResetIndexedColors,
            110 => Self::ResetForegroundColor,
            111 => Self::ResetBackgroundColor,
            112 => Self::ResetCursorColor,
            133 => Self::ShellIntegration,
            1337 => Self::ITermExtension,
            _ => Self::Unhandled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClipboardType {
    Clipboard,
    Primary,
    Secondary,
    Select,
    Unexpected(u8),
}

impl From<u8> for ClipboardType {
    fn from(value: u8) -> Self {
        match value {
            b'c' => Self::Clipboard,
            b'p' => Self::Primary,
            b'q' => Self::Secondary,
            b's' => Self::Select,
            other => Self::Unexpected(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Hyperlink {
    /// Identifier for the given hyperlink.
    pub id: Option<String>,
    /// Resource identifier of the hyperlink.
    pub uri: String,
}

/// Numbered command with its decoded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XtermCommand {
    pub code: u32,
    pub command: OperatingSystemCommand,
    /// Everything after the first `;`, control bytes removed.
    pub payload: String,
}

impl XtermCommand {
    pub(crate) fn new(code: u32, payload: String) -> Self {
        Self {
            code,
            command: OperatingSystemCommand::from(code),
            payload,
        }
    }

    /// `;`-separated sub-parameters of the payload.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.payload.split(';')
    }

    /// `index;spec` pairs of a palette update (`4`), with unparsable specs
    /// skipped.
    pub fn indexed_colors(&self) -> Vec<(u8, ColorSpec)> {
        if self.command != OperatingSystemCommand::SetColorIndex {
            return Vec::new();
        }

        let params: Vec<&str> = self.params().collect();
        params
            .chunks_exact(2)
            .filter_map(|pair| {
                let index = pair[0].parse::<u8>().ok()?;
                match ColorSpec::parse(pair[1]) {
                    Some(spec) => Some((index, spec)),
                    None => {
                        debug!("[OSC] invalid color spec for index {index}: {:?}", pair[1]);
                        None
                    },
                }
            })
            .collect()
    }

    /// Colors of a dynamic color command (`10`, `11`, `12`).
    ///
    /// Each extra parameter addresses the next dynamic color, so `10;?;?`
    /// queries both foreground and background.
    pub fn dynamic_colors(&self) -> Vec<ColorSpec> {
        match self.command {
            OperatingSystemCommand::SetTextForegroundColor
            | OperatingSystemCommand::SetTextBackgroundColor
            | OperatingSystemCommand::SetTextCursorColor => {
                self.params().filter_map(ColorSpec::parse).collect()
            },
            _ => Vec::new(),
        }
    }

    /// Hyperlink opened by `8;params;uri`. `None` for the closing form with an
    /// empty URI.
    pub fn hyperlink(&self) -> Option<Hyperlink> {
        if self.command != OperatingSystemCommand::Hyperlink {
            return None;
        }

        let (params, uri) = self.payload.split_once(';')?;
        if uri.is_empty() {
            return None;
        }

        let id = params
            .split(':')
            .find_map(|param| param.strip_prefix("id="))
            .filter(|id| !id.is_empty())
            .map(str::to_owned);

        Some(Hyperlink {
            id,
            uri: uri.to_owned(),
        })
    }

    /// Selections and data of a clipboard command (`52;selections;data`).
    ///
    /// An empty selection list targets the selection buffer.
    pub fn clipboard(&self) -> Option<(Vec<ClipboardType>, &str)> {
        if self.command != OperatingSystemCommand::Clipboard {
            return None;
        }

        let (selections, data) = self.payload.split_once(';')?;
        let targets = if selections.is_empty() {
            vec![ClipboardType::Select]
        } else {
            selections.bytes().map(ClipboardType::from).collect()
        };

        Some((targets, data))
    }

    /// Pointer shape requested by `22;name`.
    pub fn mouse_cursor(&self) -> Option<CursorIcon> {
        if self.command != OperatingSystemCommand::SetMouseCursorShape {
            return None;
        }

        match self.payload.parse::<CursorIcon>() {
            Ok(icon) => Some(icon),
            Err(_) => {
                debug!("[OSC] unknown mouse cursor shape: {:?}", self.payload);
                None
            },
        }
    }
}
