//! The `case` subcommand: extracts a single detail page.

use anyhow::{bail, Result};
use clap::Args;
use mdprobate_lib::validation;
use mdprobate_lib::{ProbateScraper, ScrapeConfig};

use crate::output::{print_rows, OutputFormat};

#[derive(Args)]
pub struct CaseArgs {
    /// Absolute URL of an estate detail page
    pub url: String,
}

pub async fn run(args: &CaseArgs, config: &ScrapeConfig, format: &OutputFormat) -> Result<()> {
    let url = validation::validate_case_url(&args.url)?;
    let scraper = ProbateScraper::from_config(config)?;

    let rows = scraper.scrape_case(&url).await;
    if rows.is_empty() {
        bail!("could not fetch case page {}", url);
    }
    print_rows(&rows, format)
}
