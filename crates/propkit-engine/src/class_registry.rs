//! Class registry for runtime class metadata

use crate::annotation::{Annotation, NOT_INTROSPECTED};
use crate::class::{Class, ClassDefinition, ClassRef, MethodDefinition};
use crate::error::{DefineError, InvokeError};
use crate::object::ObjectRef;
use dashmap::DashMap;
use parking_lot::RwLock;
use propkit_types::{AssignabilityContext, ClassHierarchy, ClassId, Type};
use std::sync::Arc;
use tracing::debug;

/// Name of the marker interface implemented by map-backed classes
pub const PROPERTY_MAPPED: &str = "PropertyMapped";

/// Accessor of the marker interface returning the live property container
pub const GET_PROPERTY_MAP: &str = "getPropertyMap";

/// Registry of every class known to an engine
///
/// Classes are indexed by ID and by name, and live as long as the registry.
/// Registration and lookup may happen concurrently from any thread.
#[derive(Debug)]
pub struct ClassRegistry {
    /// Classes indexed by ID
    classes: RwLock<Vec<ClassRef>>,
    /// Class name to ID mapping
    name_to_id: DashMap<String, ClassId>,
    property_mapped: ClassRef,
}

impl ClassRegistry {
    /// Create a registry holding only the `PropertyMapped` interface
    pub fn new() -> Self {
        let id = ClassId(0);
        let getter = MethodDefinition::getter(GET_PROPERTY_MAP, Type::Map)
            .annotated(Annotation::marker(NOT_INTROSPECTED));
        let property_mapped = Arc::new(Class::bootstrap_interface(
            id,
            PROPERTY_MAPPED,
            vec![getter],
        ));

        let name_to_id = DashMap::new();
        name_to_id.insert(PROPERTY_MAPPED.to_string(), id);
        Self {
            classes: RwLock::new(vec![property_mapped.clone()]),
            name_to_id,
            property_mapped,
        }
    }

    /// Validate and register a class definition
    pub fn define(&self, definition: ClassDefinition) -> Result<ClassRef, DefineError> {
        self.register(definition, false)
    }

    /// Register a class synthesized by the class builder
    pub(crate) fn define_generated(
        &self,
        definition: ClassDefinition,
    ) -> Result<ClassRef, DefineError> {
        self.register(definition, true)
    }

    fn register(&self, definition: ClassDefinition, generated: bool) -> Result<ClassRef, DefineError> {
        // The write lock serializes ID allocation with the name check.
        let mut classes = self.classes.write();
        if self.name_to_id.contains_key(&definition.name) {
            return Err(DefineError::DuplicateClass {
                name: definition.name,
            });
        }

        let id = ClassId(classes.len() as u32);
        let class = Arc::new(Class::resolve(id, definition, generated)?);
        self.name_to_id.insert(class.name().to_string(), id);
        classes.push(class.clone());

        debug!(
            class = class.name(),
            id = id.0,
            kind = ?class.kind(),
            slots = class.field_count(),
            "registered class"
        );
        Ok(class)
    }

    /// Get class by ID
    pub fn get(&self, id: ClassId) -> Option<ClassRef> {
        self.classes.read().get(id.index()).cloned()
    }

    /// Get class by name
    pub fn get_by_name(&self, name: &str) -> Option<ClassRef> {
        let id = *self.name_to_id.get(name)?;
        self.get(id)
    }

    /// The `PropertyMapped` marker interface
    pub fn property_mapped(&self) -> &ClassRef {
        &self.property_mapped
    }

    /// Number of registered classes, the marker interface included
    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    /// Always false: the marker interface is registered from the start
    pub fn is_empty(&self) -> bool {
        self.classes.read().is_empty()
    }

    /// Snapshot of all registered classes
    pub fn classes(&self) -> Vec<ClassRef> {
        self.classes.read().clone()
    }

    /// Create an instance of a concrete class
    pub fn instantiate(&self, class: &ClassRef) -> Result<ObjectRef, InvokeError> {
        class.instantiate()
    }

    /// Whether a `source` value may be stored where `target` is declared
    pub fn is_assignable(&self, target: Type, source: Type) -> bool {
        AssignabilityContext::new(self).is_assignable(target, source)
    }

    /// Display name of a type, class names resolved
    pub fn type_name(&self, ty: Type) -> String {
        AssignabilityContext::new(self).display(ty)
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassHierarchy for ClassRegistry {
    fn supertypes(&self, id: ClassId) -> Vec<ClassId> {
        self.get(id)
            .map(|class| {
                class
                    .parent()
                    .into_iter()
                    .chain(class.interfaces())
                    .map(|c| c.id())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn class_name(&self, id: ClassId) -> Option<String> {
        self.get(id).map(|c| c.name().to_string())
    }
}
