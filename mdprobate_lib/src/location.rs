//! Heuristic splitting of free-text "address, city, ST 12345" blobs.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static RE_STATE_ZIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z]{2})\s+(\d{5}(?:-\d{4})?)").expect("invalid regex: state zip")
});

/// Discrete parts recovered from a location string. Any part may be blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocationParts {
    pub address: String,
    pub city: String,
    /// Two-letter state code.
    pub state: String,
    /// Five-digit ZIP; ZIP+4 input is cut to its first five digits.
    pub zip: String,
}

impl LocationParts {
    pub fn is_blank(&self) -> bool {
        self.address.is_empty()
            && self.city.is_empty()
            && self.state.is_empty()
            && self.zip.is_empty()
    }
}

/// Splits a location string into address, city, state and zip.
///
/// The first `ST 12345` (or `ST 12345-6789`) occurrence anchors the parse:
/// text before it is the city, and if that still contains a comma the part
/// before the last comma becomes the address. Without a state/zip anchor
/// the whole string is kept as the address. Never fails.
pub fn parse_location(input: &str) -> LocationParts {
    let text = input.trim();
    if text.is_empty() {
        return LocationParts::default();
    }

    let Some(caps) = RE_STATE_ZIP.captures(text) else {
        return LocationParts {
            address: text.to_string(),
            ..LocationParts::default()
        };
    };

    let mut parts = LocationParts {
        state: caps[1].to_string(),
        zip: caps[2].split('-').next().unwrap_or_default().to_string(),
        ..LocationParts::default()
    };

    let start = caps.get(0).map_or(0, |m| m.start());
    let mut city = text[..start].trim();
    if let Some(stripped) = city.strip_suffix(',') {
        city = stripped.trim();
    }

    match city.rsplit_once(',') {
        Some((address, city)) => {
            parts.address = address.trim().to_string();
            parts.city = city.trim().to_string();
        }
        None => parts.city = city.to_string(),
    }

    parts
}
