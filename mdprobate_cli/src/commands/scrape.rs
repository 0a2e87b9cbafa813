//! The `scrape` subcommand: searches a filing-date range and extracts every
//! matching case.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use mdprobate_lib::validation;
use mdprobate_lib::{ProbateScraper, ScrapeConfig, ScrapeProgress};

use crate::output::{print_rows, save_export, OutputFormat};

/// Arguments for the `scrape` subcommand.
///
/// Without `--output-dir` the rows are printed in the global `--output`
/// format; with it, a timestamped CSV export is written there instead.
#[derive(Args)]
pub struct ScrapeArgs {
    /// First filing date, inclusive (MM/DD/YYYY)
    #[arg(long)]
    pub from: String,

    /// Last filing date, inclusive (MM/DD/YYYY)
    #[arg(long)]
    pub to: String,

    /// Party type: pr (personal representative) or d (decedent)
    #[arg(long, default_value = "pr")]
    pub party_type: String,

    /// Directory to write the CSV export into (must exist)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Only fetch the first N cases found
    #[arg(long)]
    pub limit: Option<usize>,

    /// Delay between detail page fetches in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,
}

pub async fn run(args: &ScrapeArgs, config: &ScrapeConfig, format: &OutputFormat) -> Result<()> {
    let filter = validation::build_search_filter(&args.from, &args.to, &args.party_type)?;
    let limit = args
        .limit
        .map(validation::validate_record_limit)
        .transpose()?;
    let output_dir = args
        .output_dir
        .as_deref()
        .map(validation::validate_output_dir)
        .transpose()?;

    let mut config = config.clone();
    if let Some(ms) = args.delay_ms {
        config = config.with_detail_delay(Duration::from_millis(ms));
    }
    let scraper = ProbateScraper::from_config(&config)?;

    let bar_style =
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>5}/{len:5} {msg}")?;
    let pb = ProgressBar::new_spinner();
    pb.set_message("searching...");

    let rows = scraper
        .scrape_with_progress(&filter, limit, |event| match event {
            ScrapeProgress::PageRead {
                page, total_urls, ..
            } => {
                pb.set_message(format!("results page {} ({} cases)", page, total_urls));
                pb.tick();
            }
            ScrapeProgress::CasesDiscovered { selected, .. } => {
                pb.set_style(bar_style.clone());
                pb.set_length(selected as u64);
                pb.set_position(0);
                pb.set_message("fetching cases...");
            }
            ScrapeProgress::CaseScraped { .. } => pb.inc(1),
        })
        .await;
    pb.finish_and_clear();
    let rows = rows?;

    if rows.is_empty() {
        eprintln!("No records found for {} to {}", args.from, args.to);
        return Ok(());
    }

    match output_dir {
        Some(dir) => {
            let path = save_export(&dir, &rows, Local::now().naive_local())?;
            eprintln!("Wrote {} rows to {}", rows.len(), path.display());
        }
        None => print_rows(&rows, format)?,
    }

    Ok(())
}
