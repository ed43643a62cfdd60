//! Descriptor and codec error types

use thiserror::Error;

/// Errors raised while parsing or constructing descriptors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    /// A capability fragment does not follow the `key:value` grammar
    #[error("malformed capability fragment '{fragment}': {reason}")]
    MalformedCapability {
        fragment: String,
        reason: &'static str,
    },

    #[error("invalid flavor '{name}': {reason}")]
    InvalidFlavor { name: String, reason: String },

    #[error("invalid node descriptor: {0}")]
    InvalidNode(String),
}

impl TypesError {
    pub(crate) fn malformed(fragment: impl Into<String>, reason: &'static str) -> Self {
        Self::MalformedCapability {
            fragment: fragment.into(),
            reason,
        }
    }
}

/// Result type for descriptor operations
pub type Result<T> = std::result::Result<T, TypesError>;
