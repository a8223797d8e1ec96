//! Type system errors

use thiserror::Error;

/// Errors raised when a value or member does not fit a declared type
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TypeError {
    /// Type mismatch between expected and actual types
    #[error("Type mismatch: expected {expected}, got {actual}")]
    Mismatch {
        /// Expected type
        expected: String,
        /// Actual type
        actual: String,
    },

    /// Null supplied where a primitive is required
    #[error("Cannot assign null to primitive type {ty}")]
    NullPrimitive {
        /// The primitive type
        ty: String,
    },

    /// Class id does not resolve in the hierarchy
    #[error("Unknown class: {id}")]
    UnknownClass {
        /// Class id that was not found
        id: String,
    },
}
