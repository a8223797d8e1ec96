//! Readers and writers over fields and accessor methods

use crate::class::{slot_mismatch, FieldInfo, MethodInfo};
use crate::error::InvokeError;
use crate::object::ObjectRef;
use crate::value::Value;
use propkit_types::{ClassId, Type};
use std::fmt;

#[derive(Clone)]
enum Target {
    Field { slot: usize },
    Method(MethodInfo),
}

/// A single way to read or write a property: a field slot, a no-arg getter
/// or a one-arg setter
#[derive(Clone)]
pub struct AccessEntry {
    member: String,
    raw_type: Type,
    declaring_class: ClassId,
    target: Target,
}

impl AccessEntry {
    /// Reader over an instance field
    pub fn field(field: &FieldInfo) -> Self {
        Self {
            member: field.name.clone(),
            raw_type: field.ty,
            declaring_class: field.declaring_class,
            target: Target::Field { slot: field.index },
        }
    }

    /// Reader over a zero-parameter method; its type is the return type
    pub fn getter(method: &MethodInfo) -> Self {
        Self {
            member: method.name.clone(),
            raw_type: method.return_type,
            declaring_class: method.declaring_class,
            target: Target::Method(method.clone()),
        }
    }

    /// Writer over a one-parameter method; its type is the parameter type
    pub fn setter(method: &MethodInfo) -> Self {
        Self {
            member: method.name.clone(),
            raw_type: method.params.first().map_or(Type::Void, |p| p.ty),
            declaring_class: method.declaring_class,
            target: Target::Method(method.clone()),
        }
    }

    /// Member name
    pub fn member(&self) -> &str {
        &self.member
    }

    /// Class declaring the member
    pub fn declaring_class(&self) -> ClassId {
        self.declaring_class
    }

    /// Declared type
    pub fn raw_type(&self) -> Type {
        self.raw_type
    }

    /// Declared type with primitives boxed
    pub fn value_type(&self) -> Type {
        self.raw_type.boxed()
    }

    /// Whether the declared type is primitive (null cannot be written)
    pub fn is_primitive(&self) -> bool {
        self.raw_type.is_primitive()
    }

    /// Whether this entry accesses a field directly
    pub fn is_field(&self) -> bool {
        matches!(self.target, Target::Field { .. })
    }

    /// Read the value from `obj`
    pub fn read(&self, obj: &ObjectRef) -> Result<Value, InvokeError> {
        match &self.target {
            Target::Field { slot } => obj.slot(*slot),
            Target::Method(method) => method.invoke(obj, &[]),
        }
    }

    /// Write `value` to `obj`
    ///
    /// The value must already be an instance of the declared type.
    pub fn write(&self, obj: &ObjectRef, value: Value) -> Result<(), InvokeError> {
        if !value.is_instance_of(self.raw_type) {
            return Err(slot_mismatch(self.raw_type, &value));
        }
        match &self.target {
            Target::Field { slot } => obj.set_slot(*slot, value),
            Target::Method(method) => method.invoke(obj, &[value]).map(|_| ()),
        }
    }
}

impl fmt::Debug for AccessEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessEntry")
            .field("member", &self.member)
            .field("raw_type", &self.raw_type)
            .field("field", &self.is_field())
            .finish()
    }
}
