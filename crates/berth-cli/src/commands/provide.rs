//! Make manageable nodes available

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use berth_inventory::{InventoryClient, NodeFilter};
use berth_types::ProvisionState;
use berth_wait::{set_nodes_state, ProvisionWaiter, ThreadDelay};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::config::BerthConfig;
use crate::error::CliResult;
use crate::inventory::FileInventory;
use crate::output::{print_rows, OutputFormat};

/// Arguments of `berth provide`
#[derive(Debug, Args)]
pub struct ProvideArgs {
    /// Inventory snapshot (JSON array of nodes)
    #[arg(long)]
    pub inventory: PathBuf,
}

#[derive(Serialize, Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Node")]
    node_id: String,
    #[tabled(rename = "Result")]
    result: String,
}

/// Run `provide` on every node not yet available or active.
///
/// Exit code 1 when any node failed to become available.
pub fn execute(args: ProvideArgs, config: &BerthConfig, format: OutputFormat) -> CliResult<ExitCode> {
    let inventory = Arc::new(FileInventory::open(&args.inventory)?);
    let nodes = inventory.list_nodes(&NodeFilter::all().maintenance(false))?;

    let waiter = ProvisionWaiter::new(inventory, Arc::new(ThreadDelay), config.wait.provision);
    let outcomes = set_nodes_state(
        &waiter,
        &nodes,
        "provide",
        &ProvisionState::Available,
        &[ProvisionState::Available, ProvisionState::Active],
    )?;

    let failed = outcomes.iter().filter(|o| !o.succeeded()).count();
    let rows = outcomes
        .into_iter()
        .map(|outcome| OutcomeRow {
            node_id: outcome.node_id.to_string(),
            result: match outcome.result {
                Ok(done) if done.is_reached() => "available".to_string(),
                Ok(_) => "vanished".to_string(),
                Err(err) => err.to_string(),
            },
        })
        .collect();
    print_rows(rows, format)?;

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
