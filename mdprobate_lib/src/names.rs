//! Splitting of "First [Middle] Last [role]" name labels.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersonName {
    pub first: String,
    pub middle: String,
    pub last: String,
}

/// Drops the bracketed role annotation, keeping the trimmed name before it.
pub fn strip_role(label: &str) -> &str {
    label.split_once('[').map_or(label, |(name, _)| name).trim()
}

/// One token is a first name, two are first and last, and with three or
/// more the second token is the middle name and the rest form the last name.
pub fn split_representative_name(name: &str) -> PersonName {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    match tokens.as_slice() {
        [] => PersonName::default(),
        [first] => PersonName {
            first: first.to_string(),
            ..PersonName::default()
        },
        [first, last] => PersonName {
            first: first.to_string(),
            last: last.to_string(),
            ..PersonName::default()
        },
        [first, middle, rest @ ..] => PersonName {
            first: first.to_string(),
            middle: middle.to_string(),
            last: rest.join(" "),
        },
    }
}

/// Attorneys keep only the first and last token; middle tokens are dropped.
/// A single token is not enough to tell the names apart and yields blanks.
pub fn split_attorney_name(name: &str) -> PersonName {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    match tokens.as_slice() {
        [first, .., last] => PersonName {
            first: first.to_string(),
            last: last.to_string(),
            ..PersonName::default()
        },
        _ => PersonName::default(),
    }
}
