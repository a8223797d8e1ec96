//! Introspection descriptors
//!
//! A descriptor collects every property discovered on one class. It is
//! built open, accepting readers and writers, and then sealed: sealing
//! freezes the properties and indexes them by annotation. Queries are only
//! answered once sealed.

use super::access::AccessEntry;
use super::error::IntrospectionError;
use super::key::PropertyKey;
use super::property::IntrospectedProperty;
use crate::annotation::Annotation;
use crate::class::ClassRef;
use crate::class_registry::ClassRegistry;
use crate::object::ObjectRef;
use crate::value::Value;
use propkit_types::Type;
use rustc_hash::FxHashMap;
use std::sync::Arc;

type AnnotationIndex = FxHashMap<String, FxHashMap<Annotation, Vec<Arc<IntrospectedProperty>>>>;

enum State {
    Open(FxHashMap<PropertyKey, IntrospectedProperty>),
    Sealed {
        properties: FxHashMap<PropertyKey, Arc<IntrospectedProperty>>,
        by_annotation: AnnotationIndex,
    },
}

/// All introspected properties of one class
pub struct IntrospectionDescriptor {
    class: ClassRef,
    registry: Arc<ClassRegistry>,
    /// Keys in discovery order
    order: Vec<PropertyKey>,
    state: State,
}

impl IntrospectionDescriptor {
    /// Open descriptor for `class`
    pub fn new(class: ClassRef, registry: Arc<ClassRegistry>) -> Self {
        Self {
            class,
            registry,
            order: Vec::new(),
            state: State::Open(FxHashMap::default()),
        }
    }

    /// Class the descriptor describes
    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    /// Whether the descriptor has been sealed
    pub fn is_sealed(&self) -> bool {
        matches!(self.state, State::Sealed { .. })
    }

    /// Register a reader under `key`; returns whether it was added
    pub fn add_reader(
        &mut self,
        key: PropertyKey,
        entry: AccessEntry,
        only_if_empty: bool,
    ) -> Result<bool, IntrospectionError> {
        Ok(self.open_property(key)?.add_reader(entry, only_if_empty))
    }

    /// Register a writer under `key`; returns whether it was added
    pub fn add_writer(
        &mut self,
        key: PropertyKey,
        entry: AccessEntry,
        only_if_empty: bool,
    ) -> Result<bool, IntrospectionError> {
        Ok(self.open_property(key)?.add_writer(entry, only_if_empty))
    }

    fn open_property(
        &mut self,
        key: PropertyKey,
    ) -> Result<&mut IntrospectedProperty, IntrospectionError> {
        if key.is_null() {
            return Err(IntrospectionError::NullKey {
                class: self.class.name().to_string(),
            });
        }
        let class_name = self.class.name().to_string();
        match &mut self.state {
            State::Sealed { .. } => Err(IntrospectionError::AlreadySealed { class: class_name }),
            State::Open(pending) => {
                if !pending.contains_key(&key) {
                    self.order.push(key.clone());
                }
                Ok(pending.entry(key.clone()).or_insert_with(|| {
                    IntrospectedProperty::new(key, class_name, self.registry.clone())
                }))
            }
        }
    }

    /// Freeze the properties and build the annotation index
    pub fn seal(&mut self) -> Result<(), IntrospectionError> {
        let pending = match &mut self.state {
            State::Open(pending) => std::mem::take(pending),
            State::Sealed { .. } => {
                return Err(IntrospectionError::AlreadySealed {
                    class: self.class.name().to_string(),
                })
            }
        };

        let mut properties = FxHashMap::default();
        let mut by_annotation: AnnotationIndex = FxHashMap::default();
        for (key, property) in pending {
            let property = Arc::new(property);
            if let Some(annotation) = key.annotation() {
                by_annotation
                    .entry(annotation.name().to_string())
                    .or_default()
                    .entry(annotation.clone())
                    .or_default()
                    .push(property.clone());
            }
            properties.insert(key, property);
        }

        self.state = State::Sealed {
            properties,
            by_annotation,
        };
        Ok(())
    }

    fn sealed(
        &self,
    ) -> Result<
        (
            &FxHashMap<PropertyKey, Arc<IntrospectedProperty>>,
            &AnnotationIndex,
        ),
        IntrospectionError,
    > {
        match &self.state {
            State::Sealed {
                properties,
                by_annotation,
            } => Ok((properties, by_annotation)),
            State::Open(_) => Err(IntrospectionError::NotSealed {
                class: self.class.name().to_string(),
            }),
        }
    }

    /// Property registered under exactly `key`
    pub fn property_by_key(
        &self,
        key: &PropertyKey,
    ) -> Result<Arc<IntrospectedProperty>, IntrospectionError> {
        let (properties, _) = self.sealed()?;
        properties
            .get(key)
            .cloned()
            .ok_or_else(|| IntrospectionError::NoSuchProperty {
                class: self.class.name().to_string(),
                key: key.to_string(),
            })
    }

    /// Property registered under `name`
    pub fn property(&self, name: &str) -> Result<Arc<IntrospectedProperty>, IntrospectionError> {
        self.property_by_key(&PropertyKey::named(name))
    }

    /// Property registered under an annotation instance
    pub fn property_by_annotation(
        &self,
        annotation: &Annotation,
    ) -> Result<Arc<IntrospectedProperty>, IntrospectionError> {
        self.property_by_key(&PropertyKey::annotated(annotation.clone()))
    }

    /// Every property carrying an annotation with this type name
    pub fn properties_with_annotation(
        &self,
        name: &str,
    ) -> Result<Vec<Arc<IntrospectedProperty>>, IntrospectionError> {
        let (_, by_annotation) = self.sealed()?;
        let mut found: Vec<(&Annotation, &Vec<Arc<IntrospectedProperty>>)> = by_annotation
            .get(name)
            .map(|instances| instances.iter().collect())
            .unwrap_or_default();
        found.sort_by(|a, b| a.0.cmp(b.0));
        Ok(found
            .into_iter()
            .flat_map(|(_, props)| props.iter().cloned())
            .collect())
    }

    /// All properties in discovery order
    pub fn properties(&self) -> Result<Vec<Arc<IntrospectedProperty>>, IntrospectionError> {
        let (properties, _) = self.sealed()?;
        Ok(self
            .order
            .iter()
            .filter_map(|key| properties.get(key).cloned())
            .collect())
    }

    /// Whether a property is registered under `name`
    pub fn has_property(&self, name: &str) -> Result<bool, IntrospectionError> {
        let (properties, _) = self.sealed()?;
        Ok(properties.contains_key(&PropertyKey::named(name)))
    }

    /// Read property `name` of `obj` as `as_type`
    pub fn read(
        &self,
        obj: &ObjectRef,
        name: &str,
        as_type: Type,
    ) -> Result<Value, IntrospectionError> {
        self.property(name)?.read(obj, as_type)
    }

    /// Write `value` to property `name` of `obj`
    pub fn write(&self, obj: &ObjectRef, name: &str, value: Value) -> Result<(), IntrospectionError> {
        self.property(name)?.write(obj, value)
    }
}

impl std::fmt::Debug for IntrospectionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntrospectionDescriptor")
            .field("class", &self.class.name())
            .field("keys", &self.order)
            .field("sealed", &self.is_sealed())
            .finish()
    }
}
