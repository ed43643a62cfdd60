//! Profile error types

use berth_inventory::InventoryError;
use berth_types::TypesError;
use thiserror::Error;

/// Errors raised while matching profiles or resolving scales.
///
/// Unsatisfied or redundant flavors are not errors; they are counted in
/// the [`MatchReport`](crate::MatchReport).
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Scale parameter {parameter} is missing from the scale source")]
    MissingScaleParameter { parameter: String },

    #[error("Scale parameter {parameter} has non-integer value {value:?}")]
    InvalidScaleParameter { parameter: String, value: String },

    #[error("No scale parameter is mapped to flavor {0}")]
    UnmappedFlavor(String),

    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Types(#[from] TypesError),
}

/// Result type for profile operations
pub type Result<T> = std::result::Result<T, ProfileError>;
