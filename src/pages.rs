//! Product page materialization
//!
//! Every product whose id starts with its resource's id gets its own page at
//! `resource/<id>/<product-id>.md`. Pages are only rewritten when the product
//! changed, so repeated runs leave the tree untouched.

use serde_yaml_ng::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::RegistryError;
use crate::frontmatter::{read_document, to_canonical, write_document};
use crate::layout::RegistryLayout;
use crate::record::{Product, Resource};
use crate::vocab::{LAYOUT_KEY, PRODUCT_LAYOUT};

/// Key-level differences between an existing page and the current product
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldDiff {
    /// Keys present on the product but not on the page
    pub added: Vec<String>,
    /// Keys present on the page but no longer on the product
    pub removed: Vec<String>,
    /// Keys on both whose values differ
    pub changed: Vec<String>,
}

/// What happened to a single product page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// No page existed, a new one was written
    Created,
    /// The page already matched the product
    Unchanged,
    /// The page was rewritten with the current product
    Updated(FieldDiff),
    /// The existing page could not be read and was rewritten from scratch
    Recreated { reason: String },
}

#[derive(Debug, Clone)]
pub struct PageReport {
    pub product_id: String,
    pub path: PathBuf,
    pub outcome: PageOutcome,
}

/// Whether a product gets a page of its own under `resource`
pub fn has_own_page(resource: &Resource, product: &Product) -> bool {
    product.id.starts_with(&resource.id)
}

/// Whether a product's page path is the resource's own page
pub fn replaces_resource_page(resource: &Resource, product: &Product) -> bool {
    product.id == resource.id
}

/// Create or refresh the page of every eligible product
pub fn materialize_product_pages(
    resources: &[Resource],
    layout: &RegistryLayout,
) -> Result<Vec<PageReport>, RegistryError> {
    let mut reports = Vec::new();

    for resource in resources {
        for product in resource.products() {
            if !has_own_page(resource, product) {
                continue;
            }
            if replaces_resource_page(resource, product) {
                warn!(
                    "Product {} shares its id with resource {}; its page replaces {}",
                    product.id,
                    resource.id,
                    layout.resource_page(&resource.id).display()
                );
            }
            let path = layout.product_page(&resource.id, &product.id);
            reports.push(materialize_page(product, &path)?);
        }
    }

    Ok(reports)
}

/// Bring a single product page in line with `product`
pub fn materialize_page(product: &Product, path: &Path) -> Result<PageReport, RegistryError> {
    let fields = product_fields(product)?;

    let outcome = if path.exists() {
        match read_document(path) {
            Ok(existing) => {
                let mut existing = existing.header;
                existing.remove(LAYOUT_KEY);

                if existing == fields {
                    debug!("Page for product {} is up to date", product.id);
                    return Ok(PageReport {
                        product_id: product.id.clone(),
                        path: path.to_path_buf(),
                        outcome: PageOutcome::Unchanged,
                    });
                }

                let diff = diff_fields(&fields, &existing);
                info!(
                    "Updating page for product {} (added: {:?}, removed: {:?}, changed: {:?})",
                    product.id, diff.added, diff.removed, diff.changed
                );
                PageOutcome::Updated(diff)
            }
            Err(e) => {
                warn!(
                    "Error reading existing product file {}, will recreate: {}",
                    path.display(),
                    e
                );
                PageOutcome::Recreated {
                    reason: e.to_string(),
                }
            }
        }
    } else {
        info!("Creating new page for product {}", product.id);
        PageOutcome::Created
    };

    let mut header = fields;
    header.insert(Value::from(LAYOUT_KEY), Value::from(PRODUCT_LAYOUT));
    write_document(path, &header, "")?;

    Ok(PageReport {
        product_id: product.id.clone(),
        path: path.to_path_buf(),
        outcome,
    })
}

/// The product as a canonical field mapping
fn product_fields(product: &Product) -> Result<Mapping, RegistryError> {
    match to_canonical(product)? {
        Value::Mapping(fields) => Ok(fields),
        _ => Err(RegistryError::malformed(
            &product.id,
            "product did not serialize to a mapping",
        )),
    }
}

/// Compare two field mappings key by key
pub fn diff_fields(current: &Mapping, existing: &Mapping) -> FieldDiff {
    let mut diff = FieldDiff::default();

    for (key, value) in current {
        match existing.get(key) {
            None => diff.added.push(key_name(key)),
            Some(old) if old != value => diff.changed.push(key_name(key)),
            Some(_) => {}
        }
    }

    for key in existing.keys() {
        if !current.contains_key(key) {
            diff.removed.push(key_name(key));
        }
    }

    diff
}

fn key_name(key: &Value) -> String {
    match key.as_str() {
        Some(s) => s.to_string(),
        None => serde_yaml_ng::to_string(key)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
