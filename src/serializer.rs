//! Serialization of rendered output to YAML or JSON.
//!
//! Both the OpenAPI document and the raw composed tree go through these functions.

use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Serializes a value to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Example
///
/// ```
/// use route_composer::openapi::OpenApiBuilder;
/// use route_composer::model::ParameterDictionary;
/// use route_composer::registry::compose;
/// use route_composer::serializer::serialize_yaml;
///
/// let api = compose(&[], &ParameterDictionary::new()).unwrap();
/// let doc = OpenApiBuilder::new().build(&api);
/// let yaml = serialize_yaml(&doc).unwrap();
/// assert!(yaml.contains("openapi:"));
/// ```
pub fn serialize_yaml<T: Serialize>(value: &T) -> Result<String> {
    debug!("Serializing output to YAML");
    serde_yaml::to_string(value).context("Failed to serialize output to YAML")
}

/// Serializes a value to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    debug!("Serializing output to JSON");
    serde_json::to_string_pretty(value).context("Failed to serialize output to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
///
/// An existing file is overwritten.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content).with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
