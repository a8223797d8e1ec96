//! Class synthesis and property introspection
//!
//! ## Generating classes
//!
//! [`DynamicClassBuilder`] turns an abstract class or interface made of
//! getter/setter contracts into a concrete, registered class:
//!
//! ```rust,ignore
//! let builder = DynamicClassBuilder::new(registry.clone(), BuilderOptions::default());
//! let bean = builder.new_class(&person, &[])?;          // one field per property
//! let mapper = builder.new_mapper_class(&person, &[])?; // one shared property map
//! ```
//!
//! ## Introspecting
//!
//! [`Introspector`] discovers the readable and writable properties of any
//! class and reads or writes them under the coercion rules of
//! [`IntrospectedProperty`]:
//!
//! ```rust,ignore
//! let introspector = Introspector::new(registry, IntrospectorOptions::default());
//! introspector.write(&obj, "age", Value::from("42"))?;
//! let age = introspector.read(&obj, "age", Type::LONG)?;
//! ```

mod access;
pub mod coerce;
mod descriptor;
mod error;
mod introspector;
mod key;
mod property;
mod strategy;
mod type_builder;

pub use access::AccessEntry;
pub use coerce::Lookup;
pub use descriptor::IntrospectionDescriptor;
pub use error::{BuildError, IntrospectionError};
pub use introspector::Introspector;
pub use key::{normalize_name, reader_property, writer_property, PropertyKey};
pub use property::IntrospectedProperty;
pub use strategy::{AccessorStrategy, FieldBacked, MapBacked, PropertyPlan, Storage};
pub use type_builder::DynamicClassBuilder;
