//! Output formatting utilities

use berth_profiles::{FlavorPlan, FlavorStatus, MatchReport};
use colored::*;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::error::CliResult;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Print a single item as JSON or YAML. Table output falls back to JSON.
pub fn print_single<T: Serialize>(data: &T, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table | OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(data)?);
        }
    }
    Ok(())
}

/// Print a list of rows in the specified format
pub fn print_rows<T: Serialize + Tabled>(rows: Vec<T>, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("{}", "No results".dimmed());
            } else {
                println!("{}", Table::new(rows));
            }
            Ok(())
        }
        other => print_single(&rows, other),
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

#[derive(Serialize, Tabled)]
struct FlavorRow {
    #[tabled(rename = "Flavor")]
    flavor: String,
    #[tabled(rename = "Profile")]
    profile: String,
    #[tabled(rename = "Scale")]
    scale: u32,
    #[tabled(rename = "Existing")]
    existing: usize,
    #[tabled(rename = "New")]
    selected: usize,
    #[tabled(rename = "Redundant")]
    redundant: u32,
    #[tabled(rename = "Missing")]
    missing: u32,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&FlavorPlan> for FlavorRow {
    fn from(plan: &FlavorPlan) -> Self {
        Self {
            flavor: plan.flavor.clone(),
            profile: plan.profile.clone().unwrap_or_else(|| "-".to_string()),
            scale: plan.scale,
            existing: plan.satisfying.len(),
            selected: plan.selected.len(),
            redundant: plan.redundant,
            missing: plan.missing,
            status: status_label(plan.status).to_string(),
        }
    }
}

fn status_label(status: FlavorStatus) -> &'static str {
    match status {
        FlavorStatus::Skipped => "skipped",
        FlavorStatus::MissingProfile => "no profile",
        FlavorStatus::Satisfied => "ok",
        FlavorStatus::Unsatisfied => "unsatisfied",
        FlavorStatus::CommitFailed => "rolled back",
    }
}

/// Print a matcher report
pub fn print_report(report: &MatchReport, format: OutputFormat) -> CliResult<()> {
    if !matches!(format, OutputFormat::Table) {
        return print_single(report, format);
    }

    let rows: Vec<FlavorRow> = report.plan.flavors.iter().map(FlavorRow::from).collect();
    print_rows(rows, format)?;

    for assignment in report.assignments() {
        let verb = if report.dry_run { "would assign" } else { "assigned" };
        println!(
            "  {} {} {} {}",
            assignment.node_id,
            verb.dimmed(),
            assignment.profile,
            format!("(flavor {})", assignment.flavor).dimmed()
        );
    }

    for failure in &report.commit_failures {
        print_error(&format!(
            "flavor {} rolled back: node {} refused the update ({})",
            failure.flavor, failure.node_id, failure.reason
        ));
    }

    let summary = format!(
        "{} errors, {} warnings",
        report.errors, report.warnings
    );
    if report.errors > 0 {
        print_error(&summary);
    } else if report.warnings > 0 {
        print_warning(&summary);
    } else {
        print_success(&summary);
    }
    Ok(())
}
