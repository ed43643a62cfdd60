//! Capability string normalisation

use std::path::Path;
use std::process::ExitCode;

use berth_types::CapabilitySet;
use clap::Args;

use crate::error::CliResult;
use crate::output::{print_error, print_single, OutputFormat};

/// Arguments of `berth caps`
#[derive(Debug, Args)]
pub struct CapsArgs {
    /// Capability string, or a file containing one
    pub input: String,
}

/// Print the canonical form; exit code 2 on a malformed string
pub fn execute(args: CapsArgs, format: OutputFormat) -> CliResult<ExitCode> {
    let path = Path::new(&args.input);
    let raw = if path.is_file() {
        std::fs::read_to_string(path)?
    } else {
        args.input.clone()
    };

    let caps = match CapabilitySet::parse(raw.trim()) {
        Ok(caps) => caps,
        Err(err) => {
            print_error(&err.to_string());
            return Ok(ExitCode::from(2));
        }
    };

    match format {
        OutputFormat::Table => println!("{caps}"),
        other => {
            let map: std::collections::BTreeMap<&str, &str> = caps.iter().collect();
            print_single(&map, other)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
