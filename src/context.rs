//! JSON-LD context extraction
//!
//! Builds a prefix map from a consolidated document for resources that use
//! OBO-style PURLs.

use serde::Serialize;
use serde_json::{json, Map};
use serde_yaml_ng::{Mapping, Value};
use std::fs;
use std::path::Path;

use crate::error::RegistryError;
use crate::vocab::{OBO_PURL_BASE, RESOURCES_KEY};

/// Read a consolidated document from disk
pub fn read_consolidated(path: &Path) -> Result<Mapping, RegistryError> {
    let content = fs::read_to_string(path).map_err(|e| RegistryError::LoadError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    match serde_yaml_ng::from_str::<Value>(&content)? {
        Value::Mapping(map) => Ok(map),
        _ => Err(RegistryError::malformed(
            path.display().to_string(),
            "consolidated document is not a YAML mapping",
        )),
    }
}

fn uses_obo_prefix(resource: &Value) -> bool {
    match resource.get("uri_prefix") {
        None => true,
        Some(prefix) => prefix.as_str() == Some(OBO_PURL_BASE),
    }
}

fn prefix_of(resource: &Value) -> Option<String> {
    if let Some(preferred) = resource.get("preferredPrefix").and_then(Value::as_str) {
        return Some(preferred.to_string());
    }
    resource
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_uppercase)
}

/// Build the `@context` prefix map, keyed and sorted by prefix
pub fn extract_context(document: &Mapping) -> serde_json::Value {
    let mut prefixes = Map::new();

    let resources = document
        .get(RESOURCES_KEY)
        .and_then(Value::as_sequence)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for resource in resources.iter().filter(|r| uses_obo_prefix(r)) {
        let Some(prefix) = prefix_of(resource) else {
            continue;
        };
        prefixes.insert(
            prefix.clone(),
            json!({
                "@id": format!("{OBO_PURL_BASE}{prefix}_"),
                "@prefix": true
            }),
        );
    }

    json!({ "@context": prefixes })
}

/// Pretty print JSON with four-space indentation
pub fn to_json_string(value: &serde_json::Value) -> Result<String, RegistryError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
