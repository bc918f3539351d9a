//! Termcap/terminfo capability queries (`XTGETTCAP`) and their replies.

use log::debug;
use serde::Serialize;

use super::hex;
use crate::encoding::Encoding;

/// Capability names a client may ask the terminal about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CapabilityRequestName {
    /// Name that is not part of the registry. Has no textual form.
    Unrecognized,
    /// `TN`, the terminal name.
    TerminalName,
    /// `iTerm2Profile`, the name of the active profile.
    ProfileName,
    /// `name`, the terminfo entry name.
    TerminfoName,
}

impl CapabilityRequestName {
    /// Every name with a canonical textual form.
    pub const RECOGNIZED: [Self; 3] =
        [Self::TerminalName, Self::ProfileName, Self::TerminfoName];

    /// Resolve a textual capability name. Lookup is exact and case-sensitive.
    pub fn from_name(name: &str) -> Self {
        match name {
            "TN" | "term" => Self::TerminalName,
            "iTerm2Profile" => Self::ProfileName,
            "name" => Self::TerminfoName,
            _ => Self::Unrecognized,
        }
    }

    /// Canonical textual form, `None` for [`Self::Unrecognized`].
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::Unrecognized => None,
            Self::TerminalName => Some("TN"),
            Self::ProfileName => Some("iTerm2Profile"),
            Self::TerminfoName => Some("name"),
        }
    }
}

impl From<&str> for CapabilityRequestName {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

pub fn capability_name_to_enum(name: &str) -> CapabilityRequestName {
    CapabilityRequestName::from_name(name)
}

pub fn enum_to_capability_name(id: CapabilityRequestName) -> Option<&'static str> {
    id.name()
}

/// One capability named in a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityRequest {
    /// Segment exactly as received, needed to echo the name back in a reply.
    pub hex: String,
    /// Decoded name, `None` when the segment is not valid hex.
    pub name: Option<String>,
    pub id: CapabilityRequestName,
}

/// `DCS + q Pt ST` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityQuery {
    /// Private parameter bytes preceding `+q`.
    pub params: String,
    /// Requested capabilities in wire order.
    pub requests: Vec<CapabilityRequest>,
}

impl CapabilityQuery {
    /// Resolved names in wire order.
    pub fn ids(&self) -> impl Iterator<Item = CapabilityRequestName> + '_ {
        self.requests.iter().map(|request| request.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityEntry {
    pub request: CapabilityRequest,
    /// Decoded value following `=`, if any.
    pub value: Option<String>,
}

/// `DCS Ps + r Pt ST` reply, as relayed by nested terminals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityReport {
    /// `Ps` is `1` when the capabilities are known.
    pub valid: bool,
    pub entries: Vec<CapabilityEntry>,
}

fn segments(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    data.split(|&b| b == b';').filter(|segment| !segment.is_empty())
}

fn parse_request(segment: &[u8], encoding: Encoding) -> CapabilityRequest {
    let hex = encoding.decode(segment);
    match hex::decode(segment) {
        Ok(raw) => {
            let name = encoding.decode(&raw);
            let id = CapabilityRequestName::from_name(&name);
            if id == CapabilityRequestName::Unrecognized {
                debug!("[DCS] unrecognized capability name: {name:?}");
            }
            CapabilityRequest {
                hex,
                name: Some(name),
                id,
            }
        },
        Err(e) => {
            debug!("[DCS] capability name {hex:?} is not valid hex: {e}");
            CapabilityRequest {
                hex,
                name: None,
                id: CapabilityRequestName::Unrecognized,
            }
        },
    }
}

pub(super) fn parse_query(
    params: &[u8],
    data: &[u8],
    encoding: Encoding,
) -> CapabilityQuery {
    CapabilityQuery {
        params: encoding.decode(params),
        requests: segments(data)
            .map(|segment| parse_request(segment, encoding))
            .collect(),
    }
}

pub(super) fn parse_report(
    params: &[u8],
    data: &[u8],
    encoding: Encoding,
) -> CapabilityReport {
    let entries = segments(data)
        .map(|segment| {
            let (name, value) = match memchr::memchr(b'=', segment) {
                Some(idx) => (&segment[..idx], Some(&segment[idx + 1..])),
                None => (segment, None),
            };

            let value = value.and_then(|value| match hex::decode(value) {
                Ok(raw) => Some(encoding.decode(&raw)),
                Err(e) => {
                    debug!("[DCS] capability value is not valid hex: {e}");
                    None
                },
            });

            CapabilityEntry {
                request: parse_request(name, encoding),
                value,
            }
        })
        .collect();

    CapabilityReport {
        valid: params == b"1",
        entries,
    }
}
