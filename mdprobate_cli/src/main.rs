mod commands;
mod output;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use mdprobate_lib::ScrapeConfig;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "mdprobate")]
#[command(about = "Extract probate estate filings from the Maryland Register of Wills")]
struct Cli {
    /// Output format: table, json, csv, or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search filings in a date range and extract every case
    Scrape(commands::scrape::ScrapeArgs),
    /// Extract a single case detail page
    Case(commands::case::CaseArgs),
    /// Split a free-text location into address, city, state and zip
    Location(commands::location::LocationArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mdprobate=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "table" => OutputFormat::Table,
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        "markdown" | "md" => OutputFormat::Markdown,
        other => bail!(
            "unknown output format '{}'. Valid values: table, json, csv, markdown",
            other
        ),
    };

    let config = ScrapeConfig::from_env();

    match &cli.command {
        Commands::Scrape(args) => commands::scrape::run(args, &config, &format).await?,
        Commands::Case(args) => commands::case::run(args, &config, &format).await?,
        Commands::Location(args) => commands::location::run(args, &format)?,
    }

    Ok(())
}
