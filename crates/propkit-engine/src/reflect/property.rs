//! Introspected properties: readers and writers sharing a key

use super::access::AccessEntry;
use super::coerce::{self, Lookup};
use super::error::IntrospectionError;
use super::key::PropertyKey;
use crate::class_registry::ClassRegistry;
use crate::object::ObjectRef;
use crate::value::Value;
use propkit_types::{Primitive, Type};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Readers and writers registered under one [`PropertyKey`]
///
/// Built by an open descriptor and shared immutably once it is sealed.
pub struct IntrospectedProperty {
    key: PropertyKey,
    class_name: String,
    registry: Arc<ClassRegistry>,
    readers: Vec<AccessEntry>,
    writers: Vec<AccessEntry>,
}

impl IntrospectedProperty {
    pub(crate) fn new(key: PropertyKey, class_name: String, registry: Arc<ClassRegistry>) -> Self {
        Self {
            key,
            class_name,
            registry,
            readers: Vec::new(),
            writers: Vec::new(),
        }
    }

    /// Property key
    pub fn key(&self) -> &PropertyKey {
        &self.key
    }

    /// Registered readers, in registration order
    pub fn readers(&self) -> &[AccessEntry] {
        &self.readers
    }

    /// Registered writers, in registration order
    pub fn writers(&self) -> &[AccessEntry] {
        &self.writers
    }

    /// Whether the property has at least one reader
    pub fn is_readable(&self) -> bool {
        !self.readers.is_empty()
    }

    /// Whether the property has at least one writer
    pub fn is_writable(&self) -> bool {
        !self.writers.is_empty()
    }

    pub(crate) fn add_reader(&mut self, entry: AccessEntry, only_if_empty: bool) -> bool {
        add_entry(&mut self.readers, entry, only_if_empty)
    }

    pub(crate) fn add_writer(&mut self, entry: AccessEntry, only_if_empty: bool) -> bool {
        add_entry(&mut self.writers, entry, only_if_empty)
    }

    /// Read the property as `as_type`
    pub fn read(&self, obj: &ObjectRef, as_type: Type) -> Result<Value, IntrospectionError> {
        match self.read_lookup(obj, as_type)? {
            Lookup::Found(value) => Ok(value),
            Lookup::NoPath => Err(self.coercion(format!(
                "no reader converts to {}; readers: [{}]",
                self.registry.type_name(as_type),
                self.type_list(&self.readers)
            ))),
        }
    }

    fn read_lookup(&self, obj: &ObjectRef, as_type: Type) -> Result<Lookup, IntrospectionError> {
        let wanted = as_type.boxed();

        let direct = self
            .readers
            .iter()
            .find(|r| r.value_type() == wanted)
            .or_else(|| {
                self.readers
                    .iter()
                    .find(|r| self.registry.is_assignable(wanted, r.value_type()))
            });
        if let Some(reader) = direct {
            return Ok(Lookup::Found(reader.read(obj)?));
        }

        trace!(key = %self.key, wanted = %wanted, "no direct reader");
        if let Some(p) = wanted.primitive_kind().filter(|p| p.is_numeric()) {
            return Ok(self
                .read_lookup(obj, Type::Number)?
                .and_then(|v| coerce::number_to(v, p)));
        }
        match wanted {
            Type::Boxed(Primitive::Boolean) => Ok(self
                .read_lookup(obj, Type::String)?
                .and_then(coerce::string_to_boolean)),
            Type::String => Ok(self
                .read_lookup(obj, Type::Object)?
                .and_then(coerce::to_string_value)),
            _ => Ok(Lookup::NoPath),
        }
    }

    /// Write `value` through the first writer a conversion rule reaches
    pub fn write(&self, obj: &ObjectRef, value: Value) -> Result<(), IntrospectionError> {
        if value.is_null() {
            return match self.writers.iter().find(|w| !w.is_primitive()) {
                Some(writer) => Ok(writer.write(obj, Value::Null)?),
                None => Err(self.coercion(format!(
                    "null cannot be written; writers: [{}]",
                    self.type_list(&self.writers)
                ))),
            };
        }

        if self.write_typed(obj, &value)? {
            return Ok(());
        }

        trace!(key = %self.key, value = %value.type_label(), "falling back to string form");
        for candidate in coerce::reinterpretations(&value) {
            if self.write_typed(obj, &candidate)? {
                return Ok(());
            }
        }

        Err(self.coercion(format!(
            "no writer accepts {}; writers: [{}]",
            value.type_label(),
            self.type_list(&self.writers)
        )))
    }

    /// Direct match, then numeric narrowing; `false` when neither applies
    fn write_typed(&self, obj: &ObjectRef, value: &Value) -> Result<bool, IntrospectionError> {
        if let Some(writer) = self.direct_writer(value) {
            writer.write(obj, value.clone())?;
            return Ok(true);
        }

        if value.is_number() {
            // first numeric writer in registration order, narrowed to its kind
            let numeric = self.writers.iter().find_map(|w| {
                w.value_type()
                    .primitive_kind()
                    .filter(|p| Primitive::NUMERIC.contains(p))
                    .map(|p| (w, p))
            });
            if let Some((writer, p)) = numeric {
                if let Some(narrowed) = value.narrow(p) {
                    writer.write(obj, narrowed)?;
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn direct_writer(&self, value: &Value) -> Option<&AccessEntry> {
        let actual = value.runtime_type()?;
        self.writers
            .iter()
            .find(|w| w.value_type() == actual)
            .or_else(|| {
                self.writers
                    .iter()
                    .find(|w| self.registry.is_assignable(w.value_type(), actual))
            })
    }

    fn type_list(&self, entries: &[AccessEntry]) -> String {
        entries
            .iter()
            .map(|e| self.registry.type_name(e.raw_type()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn coercion(&self, message: String) -> IntrospectionError {
        IntrospectionError::Coercion {
            class: self.class_name.clone(),
            key: self.key.to_string(),
            message,
        }
    }
}

/// Add unless an entry exists and either `only_if_empty` is set or an entry
/// of the same value type is already present
fn add_entry(entries: &mut Vec<AccessEntry>, entry: AccessEntry, only_if_empty: bool) -> bool {
    if !entries.is_empty()
        && (only_if_empty || entries.iter().any(|e| e.value_type() == entry.value_type()))
    {
        return false;
    }
    entries.push(entry);
    true
}

impl fmt::Debug for IntrospectedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntrospectedProperty")
            .field("key", &self.key)
            .field("class", &self.class_name)
            .field("readers", &self.readers)
            .field("writers", &self.writers)
            .finish()
    }
}
