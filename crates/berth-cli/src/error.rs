//! CLI error types

use berth_inventory::InventoryError;
use berth_profiles::ProfileError;
use berth_types::TypesError;
use berth_wait::WaitError;
use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Types(#[from] TypesError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Wait(#[from] WaitError),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
