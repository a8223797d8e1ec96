//! propkit Engine
//!
//! This crate provides the runtime object model and the two tools built on
//! top of it:
//! - **Object model**: values, classes, objects and the class registry
//! - **Class builder**: synthesizes concrete accessor classes from abstract
//!   getter/setter contracts (`reflect::DynamicClassBuilder`)
//! - **Introspector**: discovers properties of any class and reads/writes
//!   them with type coercion (`reflect::Introspector`)
//!
//! # Example
//!
//! ```rust,ignore
//! use propkit_engine::{ClassDefinition, ClassRegistry, Engine, MethodDefinition, Value};
//! use propkit_types::Type;
//!
//! let engine = Engine::default();
//! let person = engine.registry().define(
//!     ClassDefinition::interface("Person")
//!         .add_method(MethodDefinition::getter("getAge", Type::INT))
//!         .add_method(MethodDefinition::setter("setAge", Type::INT)),
//! )?;
//!
//! let class = engine.builder().new_class(&person, &[])?;
//! let obj = class.instantiate()?;
//! engine.introspector().write(&obj, "age", Value::Long(42))?;
//! assert_eq!(obj.invoke("getAge", &[])?, Value::Int(42));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod annotation;
pub mod class;
pub mod class_registry;
pub mod error;
pub mod object;
pub mod options;
pub mod reflect;
pub mod value;

use std::sync::Arc;

pub use annotation::{Annotation, NOT_INTROSPECTED, NOT_NULL};
pub use class::{
    ClassDefinition, ClassKind, ClassRef, FieldDefinition, FieldInfo, MethodBody,
    MethodDefinition, MethodInfo, ParameterDefinition, ParameterInfo, Signature, Visibility,
};
pub use class_registry::{ClassRegistry, GET_PROPERTY_MAP, PROPERTY_MAPPED};
pub use error::{DefineError, InvokeError};
pub use object::{Object, ObjectRef};
pub use options::{BuilderOptions, EngineOptions, IntrospectorOptions, OptionsError};
pub use reflect::{
    BuildError, DynamicClassBuilder, IntrospectedProperty, IntrospectionDescriptor,
    IntrospectionError, Introspector, PropertyKey,
};
pub use value::{PropertyMap, Value};

/// A class registry with a class builder and an introspector bound to it
#[derive(Debug)]
pub struct Engine {
    registry: Arc<ClassRegistry>,
    builder: DynamicClassBuilder,
    introspector: Introspector,
}

impl Engine {
    /// Create an engine over a fresh registry
    pub fn new(options: EngineOptions) -> Self {
        let registry = Arc::new(ClassRegistry::new());
        Self {
            builder: DynamicClassBuilder::new(registry.clone(), options.builder),
            introspector: Introspector::new(registry.clone(), options.introspection),
            registry,
        }
    }

    /// Shared class registry
    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    /// Class builder registering into [`registry`](Self::registry)
    pub fn builder(&self) -> &DynamicClassBuilder {
        &self.builder
    }

    /// Introspector resolving against [`registry`](Self::registry)
    pub fn introspector(&self) -> &Introspector {
        &self.introspector
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}
