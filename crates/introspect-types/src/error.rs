//! Error types for introspect-types crate.

use crate::builtin::ScalarTag;
use thiserror::Error;

/// Errors raised while parsing type names or accessing variant cells.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypesError {
    #[error("Bad type name: '{0}'")]
    InvalidTypeName(String),

    #[error("Type mismatch: cell holds {actual}, cannot extract {requested}")]
    TypeMismatch {
        requested: &'static str,
        actual: ScalarTag,
    },

    #[error("Cannot convert {actual} to {requested}: {reason}")]
    Conversion {
        requested: &'static str,
        actual: ScalarTag,
        reason: &'static str,
    },
}

/// Result type alias for introspect-types operations.
pub type Result<T> = std::result::Result<T, TypesError>;
