//! The initial search submission: [`SearchFilter`] and [`PartyType`].

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use super::common::{FormPayload, ViewState};

/// Date format the search form expects for both filing-date bounds.
pub const FORM_DATE_FORMAT: &str = "%m/%d/%Y";

/// Filter fields the form requires to be present even when unused.
const EMPTY_FILTER_FIELDS: &[&str] = &[
    "txtEstateNo",
    "txtLN",
    "cboCountyId",
    "txtFN",
    "txtMN",
    "cboStatus",
    "cboType",
];

/// Which party role the search matches names against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PartyType {
    #[default]
    PersonalRepresentative,
    Decedent,
}

impl PartyType {
    /// The value submitted in the `cboPartyType` field.
    pub fn form_value(&self) -> &'static str {
        match self {
            PartyType::PersonalRepresentative => "Personal Representative",
            PartyType::Decedent => "Decedent",
        }
    }
}

impl fmt::Display for PartyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.form_value())
    }
}

impl FromStr for PartyType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pr" | "personal representative" => Ok(PartyType::PersonalRepresentative),
            "d" | "decedent" => Ok(PartyType::Decedent),
            _ => Err(()),
        }
    }
}

/// User-supplied query for one run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchFilter {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub party_type: PartyType,
}

impl SearchFilter {
    pub fn new(date_from: NaiveDate, date_to: NaiveDate, party_type: PartyType) -> Self {
        Self {
            date_from,
            date_to,
            party_type,
        }
    }

    pub fn date_from_str(&self) -> String {
        self.date_from.format(FORM_DATE_FORMAT).to_string()
    }

    pub fn date_to_str(&self) -> String {
        self.date_to.format(FORM_DATE_FORMAT).to_string()
    }

    /// Builds the payload for the first POST: the hidden tokens from the bare
    /// form, the blank filter fields, the filing-date range, the party type
    /// and the submit marker.
    pub fn to_form(&self, view_state: &ViewState) -> FormPayload {
        let mut payload = view_state.append_to(FormPayload::new());
        for field in EMPTY_FILTER_FIELDS {
            payload = payload.with_empty(field);
        }
        payload
            .with_field("DateOfFilingFrom", self.date_from_str())
            .with_field("DateOfFilingTo", self.date_to_str())
            .with_empty("txtDOF")
            .with_field("cboPartyType", self.party_type.form_value())
            .with_field("cmdSearch", "Search")
    }
}
