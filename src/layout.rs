//! On-disk layout of the registry
//!
//! Each resource lives in its own directory, `resource/<id>/<id>.md`, with
//! materialized product pages next to it as `resource/<id>/<product-id>.md`.

use std::path::PathBuf;

use crate::vocab::{PAGE_EXTENSION, RESOURCE_DIR};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryLayout {
    root: PathBuf,
}

impl RegistryLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resource_dir(&self, resource_id: &str) -> PathBuf {
        self.root.join(RESOURCE_DIR).join(resource_id)
    }

    /// Canonical page of a resource
    pub fn resource_page(&self, resource_id: &str) -> PathBuf {
        self.resource_dir(resource_id)
            .join(format!("{resource_id}.{PAGE_EXTENSION}"))
    }

    /// Materialized page of a product hosted by `resource_id`
    pub fn product_page(&self, resource_id: &str, product_id: &str) -> PathBuf {
        self.resource_dir(resource_id)
            .join(format!("{product_id}.{PAGE_EXTENSION}"))
    }
}

impl Default for RegistryLayout {
    fn default() -> Self {
        Self::new(".")
    }
}
