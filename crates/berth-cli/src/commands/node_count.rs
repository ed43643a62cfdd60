//! Node-count pre-check

use std::path::PathBuf;
use std::process::ExitCode;

use berth_profiles::{check_nodes_count, ScaleSource};
use clap::Args;

use crate::error::CliResult;
use crate::input::{load_counts, load_stack_parameters, parse_count_param};
use crate::inventory::FileInventory;
use crate::output::{print_error, print_single, print_success, OutputFormat};

/// Arguments of `berth node-count`
#[derive(Debug, Args)]
pub struct NodeCountArgs {
    /// Inventory snapshot (JSON array of nodes)
    #[arg(long)]
    pub inventory: PathBuf,

    /// Default counts (YAML map of parameter to count)
    #[arg(long)]
    pub defaults: PathBuf,

    /// Requested count, overriding stack and default values
    #[arg(long = "param", value_name = "NAME=COUNT")]
    pub params: Vec<String>,

    /// Parameters of the existing stack (YAML map)
    #[arg(long)]
    pub stack_params: Option<PathBuf>,
}

/// Exit code 1 when there are not enough nodes
pub fn execute(args: NodeCountArgs, format: OutputFormat) -> CliResult<ExitCode> {
    let inventory = FileInventory::open(&args.inventory)?;

    let params = args
        .params
        .iter()
        .map(|raw| parse_count_param(raw))
        .collect::<CliResult<Vec<_>>>()?;
    let mut source = ScaleSource::new(load_counts(&args.defaults)?).with_user_parameters(params);
    if let Some(path) = &args.stack_params {
        source = source.with_stack_parameters(load_stack_parameters(path)?);
    }

    let check = check_nodes_count(&inventory, &source)?;
    match format {
        OutputFormat::Table => {
            let message = format!(
                "requested {} nodes, {} available",
                check.requested, check.usable
            );
            if check.enough {
                print_success(&message);
            } else {
                print_error(&format!("Not enough nodes: {message}"));
            }
        }
        other => print_single(&check, other)?,
    }

    Ok(if check.enough {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
