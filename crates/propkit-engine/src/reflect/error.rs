//! Errors for class synthesis and property introspection

use crate::error::{DefineError, InvokeError};
use thiserror::Error;

/// Errors raised by the dynamic class builder
///
/// Every shape error is detected before anything is registered.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    /// An entry of the extra interface list is not an interface
    #[error("'{name}' is not an interface")]
    NotAnInterface {
        /// Offending type name
        name: String,
    },

    /// An abstract method is neither a getter nor a setter
    #[error("Cannot implement method {method} of '{class}': not a getter or setter")]
    CannotImplement {
        /// Type declaring the method
        class: String,
        /// Method signature
        method: String,
    },

    /// Accessors or an inherited field disagree on the type of a property
    #[error("Field types mismatch for property '{property}': {expected} vs {actual}")]
    FieldTypeMismatch {
        /// Property name
        property: String,
        /// Type fixed first (backing field or earlier accessor)
        expected: String,
        /// Conflicting type
        actual: String,
    },

    /// The synthesized class failed registration
    #[error(transparent)]
    Define(#[from] DefineError),
}

/// Errors raised by the introspector and introspected properties
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IntrospectionError {
    /// Descriptor queried while still open
    #[error("Descriptor for '{class}' is not sealed")]
    NotSealed {
        /// Class name
        class: String,
    },

    /// Descriptor modified or sealed after sealing
    #[error("Descriptor for '{class}' is already sealed")]
    AlreadySealed {
        /// Class name
        class: String,
    },

    /// Registration under a key with neither name nor annotation
    #[error("Cannot register a property of '{class}' under the null key")]
    NullKey {
        /// Class name
        class: String,
    },

    /// Class registered in a different registry than the introspector's
    #[error("Class '{class}' does not belong to this introspector's registry")]
    ForeignClass {
        /// Class name
        class: String,
    },

    /// Lookup miss
    #[error("Class '{class}' does not define property {key}")]
    NoSuchProperty {
        /// Class name
        class: String,
        /// Requested key
        key: String,
    },

    /// No conversion rule applies to a read or write
    #[error("Cannot coerce property {key} of '{class}': {message}")]
    Coercion {
        /// Class name
        class: String,
        /// Property key
        key: String,
        /// Requested or supplied type and the registered accessor types
        message: String,
    },

    /// An accessor failed while running
    #[error(transparent)]
    Invoke(#[from] InvokeError),
}
