//! Property introspection
//!
//! The introspector scans a class in two passes. The public pass takes every
//! public implemented method (most-derived override) and every public
//! instance field, inherited ones included. The declared pass then walks the
//! class and each superclass, scanning protected, package and private
//! members as separate tiers. Declared members only fill properties nothing
//! earlier has claimed, so a private member never shadows a more visible one.
//!
//! Descriptors are cached per class for the lifetime of the introspector.

use super::access::AccessEntry;
use super::descriptor::IntrospectionDescriptor;
use super::error::IntrospectionError;
use super::key::{reader_property, writer_property, PropertyKey};
use crate::annotation::NOT_INTROSPECTED;
use crate::class::{ClassRef, FieldInfo, MethodInfo, Visibility};
use crate::class_registry::ClassRegistry;
use crate::object::ObjectRef;
use crate::options::IntrospectorOptions;
use crate::value::Value;
use dashmap::DashMap;
use propkit_types::{ClassId, Type};
use std::sync::Arc;
use tracing::{debug, trace};

const DECLARED_TIERS: [Visibility; 3] =
    [Visibility::Protected, Visibility::Package, Visibility::Private];

/// Builds and caches [`IntrospectionDescriptor`]s
#[derive(Debug)]
pub struct Introspector {
    registry: Arc<ClassRegistry>,
    options: IntrospectorOptions,
    cache: DashMap<ClassId, Arc<IntrospectionDescriptor>>,
}

impl Introspector {
    /// Create an introspector over `registry`
    pub fn new(registry: Arc<ClassRegistry>, options: IntrospectorOptions) -> Self {
        Self {
            registry,
            options,
            cache: DashMap::new(),
        }
    }

    /// The registry classes are resolved against
    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    /// Sealed descriptor for `class`, built on first request
    ///
    /// `class` must come from this introspector's registry.
    ///
    /// Concurrent first requests may each build a descriptor; the first one
    /// inserted is kept and returned to every caller.
    pub fn descriptor(
        &self,
        class: &ClassRef,
    ) -> Result<Arc<IntrospectionDescriptor>, IntrospectionError> {
        // ids are only unique within one registry
        let registered = self.registry.get(class.id());
        if !registered.is_some_and(|c| Arc::ptr_eq(&c, class)) {
            return Err(IntrospectionError::ForeignClass {
                class: class.name().to_string(),
            });
        }

        if let Some(cached) = self.cache.get(&class.id()) {
            trace!(class = class.name(), "descriptor cache hit");
            return Ok(cached.clone());
        }

        trace!(class = class.name(), "descriptor cache miss");
        let built = Arc::new(self.build(class)?);
        let entry = self.cache.entry(class.id()).or_insert(built);
        Ok(entry.value().clone())
    }

    /// Number of cached descriptors
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Read property `name` of `obj` as `as_type`
    pub fn read(&self, obj: &ObjectRef, name: &str, as_type: Type) -> Result<Value, IntrospectionError> {
        self.descriptor(obj.class())?.read(obj, name, as_type)
    }

    /// Write `value` to property `name` of `obj`
    pub fn write(&self, obj: &ObjectRef, name: &str, value: Value) -> Result<(), IntrospectionError> {
        self.descriptor(obj.class())?.write(obj, name, value)
    }

    fn build(&self, class: &ClassRef) -> Result<IntrospectionDescriptor, IntrospectionError> {
        let mut desc = IntrospectionDescriptor::new(class.clone(), self.registry.clone());

        for method in class.public_methods() {
            register_method(&mut desc, method, false)?;
        }
        if self.options.include_fields {
            for field in class.public_fields() {
                register_field(&mut desc, field, false)?;
            }
        }

        if self.options.include_declared {
            for ancestor in class.lineage() {
                for tier in DECLARED_TIERS {
                    for method in ancestor
                        .declared_methods()
                        .iter()
                        .filter(|m| m.visibility == tier && !m.is_abstract())
                    {
                        register_method(&mut desc, method, true)?;
                    }
                    if self.options.include_fields {
                        for field in ancestor
                            .declared_fields()
                            .iter()
                            .filter(|f| f.visibility == tier && !f.is_static)
                        {
                            register_field(&mut desc, field, true)?;
                        }
                    }
                }
            }
        }

        desc.seal()?;
        debug!(
            class = class.name(),
            properties = desc.properties()?.len(),
            "built introspection descriptor"
        );
        Ok(desc)
    }
}

fn register_method(
    desc: &mut IntrospectionDescriptor,
    method: &MethodInfo,
    only_if_empty: bool,
) -> Result<(), IntrospectionError> {
    if method.has_annotation(NOT_INTROSPECTED) || method.erased || method.is_static {
        return Ok(());
    }

    let (name, entry, is_reader) = match method.arity() {
        0 if !method.return_type.is_void() => {
            (reader_property(&method.name), AccessEntry::getter(method), true)
        }
        1 => (writer_property(&method.name), AccessEntry::setter(method), false),
        _ => return Ok(()),
    };

    let keys = name
        .map(|n| PropertyKey::named(&n))
        .into_iter()
        .chain(method.annotations.iter().cloned().map(PropertyKey::annotated));
    for key in keys {
        if is_reader {
            desc.add_reader(key, entry.clone(), only_if_empty)?;
        } else {
            desc.add_writer(key, entry.clone(), only_if_empty)?;
        }
    }
    Ok(())
}

fn register_field(
    desc: &mut IntrospectionDescriptor,
    field: &FieldInfo,
    only_if_empty: bool,
) -> Result<(), IntrospectionError> {
    if field.has_annotation(NOT_INTROSPECTED) {
        return Ok(());
    }

    let entry = AccessEntry::field(field);
    let keys = std::iter::once(PropertyKey::named(&field.name))
        .chain(field.annotations.iter().cloned().map(PropertyKey::annotated));
    for key in keys {
        if key.is_null() {
            continue;
        }
        desc.add_reader(key.clone(), entry.clone(), only_if_empty)?;
        if !field.is_final {
            desc.add_writer(key, entry.clone(), only_if_empty)?;
        }
    }
    Ok(())
}
