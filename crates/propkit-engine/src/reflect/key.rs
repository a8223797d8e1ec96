//! Property keys and accessor naming

use crate::annotation::Annotation;
use std::fmt;

/// Identity of an introspected property: a name, an annotation, or both
///
/// Names are normalized on construction: an empty name becomes `None` and
/// the first letter is lower-cased. A key with neither component is the null
/// key, which descriptors refuse to register.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyKey {
    name: Option<String>,
    annotation: Option<Annotation>,
}

impl PropertyKey {
    /// Key from optional components
    pub fn new(name: Option<&str>, annotation: Option<Annotation>) -> Self {
        Self {
            name: name.and_then(normalize_name),
            annotation,
        }
    }

    /// Name-only key
    pub fn named(name: &str) -> Self {
        Self::new(Some(name), None)
    }

    /// Annotation-only key
    pub fn annotated(annotation: Annotation) -> Self {
        Self::new(None, Some(annotation))
    }

    /// Normalized name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Annotation component
    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    /// Whether both components are absent
    pub fn is_null(&self) -> bool {
        self.name.is_none() && self.annotation.is_none()
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.annotation) {
            (Some(name), Some(a)) => write!(f, "'{}' {}", name, a),
            (Some(name), None) => write!(f, "'{}'", name),
            (None, Some(a)) => write!(f, "{}", a),
            (None, None) => f.write_str("<null>"),
        }
    }
}

/// Lower-case the first letter; empty names have no key
pub fn normalize_name(name: &str) -> Option<String> {
    let mut chars = name.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().chain(chars).collect())
}

/// Property named by a getter (`getX` or `isX`)
pub fn reader_property(method: &str) -> Option<String> {
    method
        .strip_prefix("get")
        .or_else(|| method.strip_prefix("is"))
        .and_then(normalize_name)
}

/// Property named by a setter (`setX`)
pub fn writer_property(method: &str) -> Option<String> {
    method.strip_prefix("set").and_then(normalize_name)
}
