//! propkit Type System
//!
//! Type representation and assignability checking shared by the object model,
//! the dynamic class builder and the property introspector.

#![warn(missing_docs)]

pub mod error;
pub mod subtyping;
pub mod ty;

pub use error::TypeError;
pub use subtyping::{AssignabilityContext, ClassHierarchy};
pub use ty::{ClassId, Primitive, Type};
