//! Transport for the Maryland Register of Wills estate search.
//!
//! Provides the reqwest-backed [`Client`], the [`Fetcher`] contract the
//! scraper is written against, and builders for the hidden-field postbacks
//! the search form requires.

mod client;
mod errors;
mod fetcher;
pub mod form;
mod user_agent;
pub use self::client::{Client, ClientOptions, Endpoints, DEFAULT_BASE_URL};
pub use self::errors::Error;
pub use self::fetcher::Fetcher;
pub use self::form::{FormPayload, PartyType, SearchFilter, ViewState};
