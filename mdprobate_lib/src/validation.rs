use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use mdprobate_api::form::FORM_DATE_FORMAT;
use mdprobate_api::{PartyType, SearchFilter};
use url::Url;

use crate::error::ProbateError;

/// Validate an MM/DD/YYYY date string, the format the search form uses.
pub fn validate_date(input: &str) -> Result<NaiveDate, ProbateError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, FORM_DATE_FORMAT).map_err(|_| {
        ProbateError::InvalidInput(format!(
            "invalid date '{}'. Expected format: MM/DD/YYYY (e.g., 01/31/2024)",
            trimmed
        ))
    })
}

/// The from date may not come after the to date. Equal dates search one day.
pub fn validate_date_range(from: NaiveDate, to: NaiveDate) -> Result<(), ProbateError> {
    if from > to {
        return Err(ProbateError::InvalidInput(format!(
            "from date {} cannot be after to date {}",
            from.format(FORM_DATE_FORMAT),
            to.format(FORM_DATE_FORMAT)
        )));
    }
    Ok(())
}

/// Validate a party type: case-insensitive, supports shorthand pr/d.
pub fn validate_party_type(input: &str) -> Result<PartyType, ProbateError> {
    input.parse::<PartyType>().map_err(|_| {
        ProbateError::InvalidInput(format!(
            "unknown party type '{}'. Valid values: pr (personal representative), d (decedent)",
            input
        ))
    })
}

/// A record limit, when given, must keep at least one case.
pub fn validate_record_limit(limit: usize) -> Result<usize, ProbateError> {
    if limit == 0 {
        return Err(ProbateError::InvalidInput(
            "record limit must be at least 1".to_string(),
        ));
    }
    Ok(limit)
}

/// The export directory must already exist.
pub fn validate_output_dir(path: &Path) -> Result<PathBuf, ProbateError> {
    if path.as_os_str().is_empty() {
        return Err(ProbateError::InvalidInput(
            "output directory is empty".to_string(),
        ));
    }
    if !path.is_dir() {
        return Err(ProbateError::InvalidInput(format!(
            "output directory '{}' does not exist",
            path.display()
        )));
    }
    Ok(path.to_path_buf())
}

/// A case URL must be an absolute http(s) URL.
pub fn validate_case_url(input: &str) -> Result<String, ProbateError> {
    let trimmed = input.trim();
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url.to_string()),
        _ => Err(ProbateError::InvalidInput(format!(
            "invalid case URL '{}'. Expected an http(s) link to a detail page",
            trimmed
        ))),
    }
}

/// Validates raw inputs and assembles the search filter for a run.
pub fn build_search_filter(
    from: &str,
    to: &str,
    party_type: &str,
) -> Result<SearchFilter, ProbateError> {
    let date_from = validate_date(from)?;
    let date_to = validate_date(to)?;
    validate_date_range(date_from, date_to)?;
    let party_type = validate_party_type(party_type)?;
    Ok(SearchFilter::new(date_from, date_to, party_type))
}
