//! The `location` subcommand: runs the location parser on free text.

use anyhow::Result;
use clap::Args;
use mdprobate_lib::parse_location;

use crate::output::{print_location, OutputFormat};

#[derive(Args)]
pub struct LocationArgs {
    /// Location text, e.g. "123 Main St, Baltimore, MD 21201"
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub text: Vec<String>,
}

pub fn run(args: &LocationArgs, format: &OutputFormat) -> Result<()> {
    let parts = parse_location(&args.text.join(" "));
    print_location(&parts, format)
}
