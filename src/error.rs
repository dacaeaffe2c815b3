//! Error types for registry consolidation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to load record from {path}: {reason}")]
    LoadError { path: String, reason: String },

    #[error("Malformed record {path}: {reason}")]
    MalformedRecord { path: String, reason: String },

    #[error("Malformed record {path}: no front-matter header block")]
    MissingHeader { path: String },

    #[error("Could not find id for license in {resource}")]
    MissingLicenseId { resource: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RegistryError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        RegistryError::MalformedRecord {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
