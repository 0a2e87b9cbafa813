//! CLI subcommand implementations.

pub mod case;
pub mod location;
pub mod scrape;
