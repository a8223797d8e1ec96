//! Object instances

use crate::class::{slot_mismatch, ClassRef};
use crate::class_registry::GET_PROPERTY_MAP;
use crate::error::InvokeError;
use crate::value::{PropertyMap, Value};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared handle to an object
pub type ObjectRef = Arc<Object>;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// An instance of a registered class
///
/// Field slots are laid out by the class: inherited slots first, then the
/// class's own instance fields in declaration order.
pub struct Object {
    id: u64,
    class: ClassRef,
    fields: RwLock<Vec<Value>>,
}

impl Object {
    pub(crate) fn new(class: ClassRef) -> Self {
        let fields = class.instance_defaults();
        Self {
            id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
            class,
            fields: RwLock::new(fields),
        }
    }

    /// Process-unique object ID
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Class of this object
    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    /// Value in a field slot
    pub fn slot(&self, index: usize) -> Result<Value, InvokeError> {
        self.fields
            .read()
            .get(index)
            .cloned()
            .ok_or_else(|| self.no_such_field(format!("#{}", index)))
    }

    /// Store a value in a field slot, checked against the declared type
    pub fn set_slot(&self, index: usize, value: Value) -> Result<(), InvokeError> {
        let field = self
            .class
            .field_at(index)
            .ok_or_else(|| self.no_such_field(format!("#{}", index)))?;
        if !value.is_instance_of(field.ty) {
            return Err(slot_mismatch(field.ty, &value));
        }
        match self.fields.write().get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(self.no_such_field(format!("#{}", index))),
        }
    }

    /// Value of the most-derived instance field with this name
    pub fn field(&self, name: &str) -> Result<Value, InvokeError> {
        let index = self
            .class
            .find_field(name)
            .map(|f| f.index)
            .ok_or_else(|| self.no_such_field(name.to_string()))?;
        self.slot(index)
    }

    /// Assign the most-derived instance field with this name
    pub fn set_field(&self, name: &str, value: Value) -> Result<(), InvokeError> {
        let index = self
            .class
            .find_field(name)
            .map(|f| f.index)
            .ok_or_else(|| self.no_such_field(name.to_string()))?;
        self.set_slot(index, value)
    }

    /// Call a method by name
    ///
    /// Resolves the most-derived implemented method whose parameters accept
    /// the arguments. Primitive parameters reject null and only accept their
    /// own boxed kind.
    pub fn invoke(self: &Arc<Self>, name: &str, args: &[Value]) -> Result<Value, InvokeError> {
        let method = self.class.resolve_method(name, args)?;
        method.invoke(self, args)
    }

    /// The live property container of a map-backed instance
    pub fn property_map(self: &Arc<Self>) -> Result<PropertyMap, InvokeError> {
        match self.invoke(GET_PROPERTY_MAP, &[])? {
            Value::Map(map) => Ok(map),
            other => Err(InvokeError::ClassCast {
                expected: "Map".to_string(),
                actual: other.type_label(),
            }),
        }
    }

    fn no_such_field(&self, field: String) -> InvokeError {
        InvokeError::NoSuchField {
            class: self.class.name().to_string(),
            field,
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.id)
            .field("class", &self.class.name())
            .finish_non_exhaustive()
    }
}
