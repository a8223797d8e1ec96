//! Engine configuration (propkit.toml)
//!
//! ```toml
//! [builder]
//! class_suffix = "$$Bean"
//! map_field = "properties"
//!
//! [introspection]
//! include_fields = true
//! include_declared = true
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading options
#[derive(Debug, Error)]
pub enum OptionsError {
    /// Failed to read options file
    #[error("Failed to read options file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse options: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid options: {0}")]
    ValidationError(String),
}

/// Top-level engine options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EngineOptions {
    /// Dynamic class builder settings
    #[serde(default)]
    pub builder: BuilderOptions,

    /// Introspector settings
    #[serde(default)]
    pub introspection: IntrospectorOptions,
}

/// Dynamic class builder settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuilderOptions {
    /// Inserted between the primary type name and the sequence number of
    /// generated class names (default: "$$Bean")
    #[serde(default = "default_class_suffix")]
    pub class_suffix: String,

    /// Name of the private field holding the property map of map-backed
    /// classes (default: "properties")
    #[serde(default = "default_map_field")]
    pub map_field: String,
}

/// Introspector settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntrospectorOptions {
    /// Register public fields as readers/writers (default: true)
    #[serde(default = "default_true")]
    pub include_fields: bool,

    /// Scan protected, package and private members after the public tier
    /// (default: true)
    #[serde(default = "default_true")]
    pub include_declared: bool,
}

fn default_class_suffix() -> String {
    "$$Bean".to_string()
}

fn default_map_field() -> String {
    "properties".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            class_suffix: default_class_suffix(),
            map_field: default_map_field(),
        }
    }
}

impl Default for IntrospectorOptions {
    fn default() -> Self {
        Self {
            include_fields: true,
            include_declared: true,
        }
    }
}

impl EngineOptions {
    /// Load options from a file
    pub fn from_file(path: &Path) -> Result<Self, OptionsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse options from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, OptionsError> {
        let options: EngineOptions = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.builder.class_suffix.is_empty() {
            return Err(OptionsError::ValidationError(
                "builder.class_suffix cannot be empty".to_string(),
            ));
        }
        if self.builder.class_suffix.chars().any(char::is_whitespace) {
            return Err(OptionsError::ValidationError(format!(
                "builder.class_suffix '{}' contains whitespace",
                self.builder.class_suffix
            )));
        }
        if !is_identifier(&self.builder.map_field) {
            return Err(OptionsError::ValidationError(format!(
                "builder.map_field '{}' is not a valid field name",
                self.builder.map_field
            )));
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
