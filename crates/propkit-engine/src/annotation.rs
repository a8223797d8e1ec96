//! Member annotations
//!
//! Annotations are attached to fields, methods and parameters of a class
//! definition. The introspector indexes properties by annotation, and the
//! dynamic class builder honours [`NOT_NULL`] on setters.

use std::collections::BTreeMap;
use std::fmt;

/// Marker: the member is invisible to the introspector
pub const NOT_INTROSPECTED: &str = "NotIntrospected";

/// Marker: a generated setter rejects null before assignment
pub const NOT_NULL: &str = "NotNull";

/// An annotation instance: a type name plus attribute values
///
/// Two annotations are equal when both the name and every attribute match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Annotation {
    name: String,
    attributes: BTreeMap<String, String>,
}

impl Annotation {
    /// Annotation without attributes
    pub fn marker(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Annotation type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value by key
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// All attributes in key order
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Whether this annotation has the given type name
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if !self.attributes.is_empty() {
            write!(f, "(")?;
            for (i, (k, v)) in self.attributes.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}={:?}", k, v)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Whether `annotations` contains one with the given type name
pub fn has_annotation(annotations: &[Annotation], name: &str) -> bool {
    annotations.iter().any(|a| a.is(name))
}
