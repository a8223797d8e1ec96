//! Storage strategies for generated accessor classes
//!
//! A strategy decides where each property of a generated class lives and
//! how the synthesized getters and setters reach it. The class builder owns
//! everything else: collecting abstract methods, classifying them, checking
//! types and naming the class.

use super::error::BuildError;
use crate::class::{slot_mismatch, ClassRef, FieldDefinition, MethodDefinition, MethodInfo};
use crate::class_registry::{ClassRegistry, GET_PROPERTY_MAP};
use crate::error::InvokeError;
use crate::object::ObjectRef;
use crate::value::{PropertyMap, Value};
use propkit_types::Type;

/// A property the generated class must store
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPlan {
    /// Property name
    pub name: String,
    /// Type of the backing storage
    pub ty: Type,
}

/// Where a property lives in a generated instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    /// Its own field slot
    Slot(usize),
    /// An entry of the map held in `slot`
    MapEntry {
        /// Slot of the property map
        slot: usize,
        /// Entry key
        key: String,
    },
}

/// How generated classes store their properties
pub trait AccessorStrategy: Send + Sync {
    /// Short name for diagnostics
    fn name(&self) -> &'static str;

    /// Interfaces the generated class implements besides the requested ones
    fn extra_interfaces(&self, _registry: &ClassRegistry) -> Vec<ClassRef> {
        Vec::new()
    }

    /// Whether the strategy implements `method` itself instead of treating
    /// it as a property accessor
    fn handles(&self, _method: &MethodInfo) -> bool {
        false
    }

    /// Declare backing fields and return the storage of each property
    ///
    /// `base` is the generated class's superclass, if any; `first_slot` is
    /// the slot the first pushed field will occupy.
    fn layout(
        &self,
        base: Option<&ClassRef>,
        properties: &[PropertyPlan],
        first_slot: usize,
        fields: &mut Vec<FieldDefinition>,
    ) -> Result<Vec<Storage>, BuildError>;

    /// Implementations of the methods claimed through [`handles`](Self::handles)
    fn extra_methods(&self, _claimed: &[MethodInfo], _first_slot: usize) -> Vec<MethodDefinition> {
        Vec::new()
    }

    /// Current value of a property; `ty` is the reading accessor's type
    fn load(&self, this: &ObjectRef, storage: &Storage, ty: Type) -> Result<Value, InvokeError>;

    /// Replace the value of a property
    fn store(&self, this: &ObjectRef, storage: &Storage, value: Value) -> Result<(), InvokeError>;
}

/// One field per property
///
/// An inherited non-private instance field of the same name is reused when
/// its type is identical; a different type is an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldBacked;

impl AccessorStrategy for FieldBacked {
    fn name(&self) -> &'static str {
        "field"
    }

    fn layout(
        &self,
        base: Option<&ClassRef>,
        properties: &[PropertyPlan],
        first_slot: usize,
        fields: &mut Vec<FieldDefinition>,
    ) -> Result<Vec<Storage>, BuildError> {
        let mut storage = Vec::with_capacity(properties.len());
        for plan in properties {
            let inherited = base
                .and_then(|b| b.find_field(&plan.name))
                .filter(|f| f.visibility != crate::class::Visibility::Private);
            match inherited {
                Some(field) if field.ty == plan.ty => storage.push(Storage::Slot(field.index)),
                Some(field) => {
                    return Err(BuildError::FieldTypeMismatch {
                        property: plan.name.clone(),
                        expected: field.ty.to_string(),
                        actual: plan.ty.to_string(),
                    })
                }
                None => {
                    storage.push(Storage::Slot(first_slot + fields.len()));
                    fields.push(FieldDefinition::new(plan.name.clone(), plan.ty));
                }
            }
        }
        Ok(storage)
    }

    fn load(&self, this: &ObjectRef, storage: &Storage, _ty: Type) -> Result<Value, InvokeError> {
        match storage {
            Storage::Slot(slot) => this.slot(*slot),
            Storage::MapEntry { .. } => Err(unsupported(storage)),
        }
    }

    fn store(&self, this: &ObjectRef, storage: &Storage, value: Value) -> Result<(), InvokeError> {
        match storage {
            Storage::Slot(slot) => this.set_slot(*slot, value),
            Storage::MapEntry { .. } => Err(unsupported(storage)),
        }
    }
}

/// All properties in one private name to value map
///
/// The generated class implements `PropertyMapped`; its `getPropertyMap`
/// hands out the instance's own map, not a copy.
#[derive(Debug, Clone)]
pub struct MapBacked {
    map_field: String,
}

impl MapBacked {
    /// Store properties in a field named `map_field`
    pub fn new(map_field: impl Into<String>) -> Self {
        Self {
            map_field: map_field.into(),
        }
    }

    fn map(this: &ObjectRef, slot: usize) -> Result<PropertyMap, InvokeError> {
        match this.slot(slot)? {
            Value::Map(map) => Ok(map),
            other => Err(InvokeError::ClassCast {
                expected: "Map".to_string(),
                actual: other.type_label(),
            }),
        }
    }
}

impl AccessorStrategy for MapBacked {
    fn name(&self) -> &'static str {
        "map"
    }

    fn extra_interfaces(&self, registry: &ClassRegistry) -> Vec<ClassRef> {
        vec![registry.property_mapped().clone()]
    }

    fn handles(&self, method: &MethodInfo) -> bool {
        method.name == GET_PROPERTY_MAP && method.arity() == 0
    }

    fn layout(
        &self,
        _base: Option<&ClassRef>,
        properties: &[PropertyPlan],
        first_slot: usize,
        fields: &mut Vec<FieldDefinition>,
    ) -> Result<Vec<Storage>, BuildError> {
        let slot = first_slot + fields.len();
        fields.push(
            FieldDefinition::new(self.map_field.clone(), Type::Map)
                .initial_value(Value::Map(PropertyMap::new())),
        );
        Ok(properties
            .iter()
            .map(|plan| Storage::MapEntry {
                slot,
                key: plan.name.clone(),
            })
            .collect())
    }

    fn extra_methods(&self, claimed: &[MethodInfo], first_slot: usize) -> Vec<MethodDefinition> {
        claimed
            .iter()
            .map(|method| {
                method
                    .to_definition()
                    .body(move |this, _| Ok(Value::Map(MapBacked::map(this, first_slot)?)))
            })
            .collect()
    }

    fn load(&self, this: &ObjectRef, storage: &Storage, ty: Type) -> Result<Value, InvokeError> {
        match storage {
            Storage::MapEntry { slot, key } => {
                let value = Self::map(this, *slot)?
                    .get(key)
                    .unwrap_or_else(|| Value::default_for(ty));
                // the live map may hold entries of any type
                if value.is_instance_of(ty) {
                    Ok(value)
                } else if value.is_null() {
                    Err(slot_mismatch(ty, &value))
                } else {
                    Err(InvokeError::ClassCast {
                        expected: ty.to_string(),
                        actual: value.type_label(),
                    })
                }
            }
            Storage::Slot(_) => Err(unsupported(storage)),
        }
    }

    fn store(&self, this: &ObjectRef, storage: &Storage, value: Value) -> Result<(), InvokeError> {
        match storage {
            Storage::MapEntry { slot, key } => {
                Self::map(this, *slot)?.insert(key.clone(), value);
                Ok(())
            }
            Storage::Slot(_) => Err(unsupported(storage)),
        }
    }
}

fn unsupported(storage: &Storage) -> InvokeError {
    InvokeError::Failed(format!("storage {:?} not supported by this strategy", storage))
}
