//! Profile assignment and verification

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use berth_profiles::ProfileMatcher;
use clap::Args;

use crate::config::BerthConfig;
use crate::error::CliResult;
use crate::input::load_flavors;
use crate::inventory::FileInventory;
use crate::output::{print_report, OutputFormat};

/// Arguments of `berth profiles`
#[derive(Debug, Args)]
pub struct ProfilesArgs {
    /// Inventory snapshot (JSON array of nodes)
    #[arg(long)]
    pub inventory: PathBuf,

    /// Flavors file (YAML map of name to profile and scale)
    #[arg(long)]
    pub flavors: PathBuf,

    /// Assign profiles to tagged candidate nodes
    #[arg(long)]
    pub assign: bool,

    /// Compute assignments without saving them
    #[arg(long)]
    pub dry_run: bool,
}

/// Run the matcher; exit code 1 when any flavor is unsatisfied
pub fn execute(args: ProfilesArgs, config: &BerthConfig, format: OutputFormat) -> CliResult<ExitCode> {
    let inventory = Arc::new(FileInventory::open(&args.inventory)?);
    let flavors = load_flavors(&args.flavors)?;

    let matcher = ProfileMatcher::new(inventory, config.matcher.clone());
    let report = matcher.assign_and_verify_inventory(&flavors, args.assign, args.dry_run)?;
    print_report(&report, format)?;

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
