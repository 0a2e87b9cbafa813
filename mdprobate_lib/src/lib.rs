//! Library layer for mdprobate: probate estate filings from the Maryland
//! Register of Wills estate search.
//!
//! Replays the search form's hidden postback protocol page by page,
//! collects the distinct case links, and turns each case's detail page into
//! flat rows (one per personal representative).

pub mod config;
pub mod detail;
pub mod error;
pub mod export;
mod html;
pub mod links;
pub mod location;
pub mod names;
pub mod pagination;
pub mod scrape;
pub mod validation;

pub use mdprobate_api;
pub use mdprobate_api::{Client, Endpoints, Fetcher, PartyType, SearchFilter};

pub use config::ScrapeConfig;
pub use detail::{extract_case_rows, Attorney, CaseRecord, OutputRow, Representative};
pub use error::{ProbateError, ScrapeError};
pub use links::DiscoveredUrls;
pub use location::{parse_location, LocationParts};
pub use pagination::{PageToken, PaginationFailure, PaginationState};
pub use scrape::{ProbateScraper, ScrapeProgress};
