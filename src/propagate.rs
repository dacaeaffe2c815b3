//! Cross-reference propagation of derived products
//!
//! If the page for aggregator A lists a product built from source S (through
//! `original_source` or `secondary_source`), S should list that product as
//! well. Propagation copies such products onto the referenced resources, both
//! in the consolidated collection and on each target's own page.

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::error::RegistryError;
use crate::frontmatter::{to_canonical, write_document};
use crate::layout::RegistryLayout;
use crate::record::{load_resource, Product, Resource};

/// Products waiting to be copied onto the resources they reference
#[derive(Debug, Default, Clone)]
pub struct PendingProducts {
    /// Keyed by referenced resource id, in discovery order
    by_target: IndexMap<String, Vec<Product>>,
}

impl PendingProducts {
    /// Scan every product of every resource for foreign source references
    ///
    /// A product naming its own declaring resource as a source is skipped for
    /// that entry; it never propagates back onto itself.
    pub fn collect(resources: &[Resource]) -> Self {
        let mut pending = Self::default();

        for resource in resources {
            for product in resource.products() {
                for source_id in product.sources() {
                    if source_id != resource.id {
                        pending
                            .by_target
                            .entry(source_id.to_string())
                            .or_default()
                            .push(product.clone());
                    }
                }
            }
        }

        pending
    }

    /// Referenced resource ids, in the order they were first seen
    pub fn targets(&self) -> Vec<&str> {
        self.by_target.keys().map(String::as_str).collect()
    }

    pub fn for_target(&self, resource_id: &str) -> &[Product] {
        self.by_target
            .get(resource_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }
}

/// Propagation outcome for one target resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationEntry {
    pub resource_id: String,
    /// Product copies referencing this resource
    pub referencing: usize,
    /// Products newly added to the consolidated record
    pub added: usize,
    /// Products newly added to the resource's own page
    pub added_on_disk: usize,
    /// Why the resource's own page could not be updated, if it could not
    pub page_error: Option<String>,
}

/// Audit trail of a propagation pass
#[derive(Debug, Clone, Default)]
pub struct PropagationReport {
    /// Every referenced resource id, whether or not it is in the collection
    pub referenced: Vec<String>,
    /// Referenced resources present in the collection, in collection order
    pub entries: Vec<PropagationEntry>,
}

impl PropagationReport {
    /// Number of resources that received at least one new product
    pub fn resources_updated(&self) -> usize {
        self.entries.iter().filter(|e| e.added > 0).count()
    }
}

/// Propagate derived products onto the resources they reference
///
/// Mutates `resources` in place and rewrites the page of every target whose
/// on-disk product list was missing one of the copies. The in-memory and
/// on-disk lists are checked separately, since a page may have been edited
/// since it was loaded.
pub fn propagate_products(
    resources: &mut [Resource],
    layout: &RegistryLayout,
) -> Result<PropagationReport, RegistryError> {
    let pending = PendingProducts::collect(resources);
    let targets = pending.targets();
    let mut report = PropagationReport {
        referenced: targets.iter().map(|id| id.to_string()).collect(),
        entries: Vec::new(),
    };

    if pending.is_empty() {
        return Ok(report);
    }

    info!(
        "Found {} resources with products to propagate: {}",
        targets.len(),
        targets.join(", ")
    );

    for resource in resources.iter_mut() {
        let products = pending.for_target(&resource.id);
        if products.is_empty() {
            continue;
        }

        let mut entry = PropagationEntry {
            resource_id: resource.id.clone(),
            referencing: products.len(),
            ..Default::default()
        };

        resource.products.get_or_insert_with(Vec::new);
        for product in products {
            if resource.add_product(product.clone()) {
                entry.added += 1;
            }
        }

        match propagate_to_page(&resource.id, products, layout) {
            Ok(added) => entry.added_on_disk = added,
            Err(e) => {
                warn!("Could not update page for {}: {}", resource.id, e);
                entry.page_error = Some(e.to_string());
            }
        }

        if entry.added > 0 {
            info!("Wrote {} product(s) to {} entry", entry.added, resource.id);
        }
        report.entries.push(entry);
    }

    Ok(report)
}

/// Add any missing products to a resource's own page
///
/// Returns how many were added. The page is only rewritten when that number
/// is non-zero; its body is kept as-is.
pub fn propagate_to_page(
    resource_id: &str,
    products: &[Product],
    layout: &RegistryLayout,
) -> Result<usize, RegistryError> {
    let path = layout.resource_page(resource_id);
    let (mut on_disk, body) = load_resource(&path)?;

    let mut added = 0;
    for product in products {
        if on_disk.add_product(product.clone()) {
            added += 1;
        }
    }

    if added > 0 {
        write_document(&path, &to_canonical(&on_disk)?, &body)?;
    }

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::read_document;
    use std::fs;

    fn derived(id: &str, original: &[&str], secondary: &[&str]) -> Product {
        let mut product = Product::new(id);
        if !original.is_empty() {
            product.original_source = Some(original.iter().map(|s| s.to_string()).collect());
        }
        if !secondary.is_empty() {
            product.secondary_source = Some(secondary.iter().map(|s| s.to_string()).collect());
        }
        product
    }

    fn with_products(id: &str, products: Vec<Product>) -> Resource {
        let mut resource = Resource::new(id);
        resource.products = Some(products);
        resource
    }

    fn write_page(layout: &RegistryLayout, id: &str, header: &str, body: &str) {
        let path = layout.resource_page(id);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, format!("---\n{header}---\n{body}")).unwrap();
    }

    #[test]
    fn test_collect_skips_self_references() {
        let resources = vec![with_products(
            "kg",
            vec![derived("kg.graph", &["kg", "go"], &["hp"])],
        )];

        let pending = PendingProducts::collect(&resources);
        assert_eq!(pending.targets(), vec!["go", "hp"]);
        assert!(pending.for_target("kg").is_empty());
        assert_eq!(pending.for_target("go").len(), 1);
    }

    #[test]
    fn test_propagates_in_memory_and_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RegistryLayout::new(dir.path());
        write_page(&layout, "go", "id: go\nname: Gene Ontology\n", "# GO\n\nBody text.\n");

        let product = derived("kg.graph", &["go"], &[]);
        let mut resources = vec![
            Resource::new("go"),
            with_products("kg", vec![product.clone()]),
        ];

        let report = propagate_products(&mut resources, &layout).unwrap();

        assert_eq!(resources[0].products(), [product.clone()]);
        assert_eq!(report.resources_updated(), 1);
        assert_eq!(report.entries[0].added_on_disk, 1);

        let doc = read_document(&layout.resource_page("go")).unwrap();
        assert_eq!(doc.body, "# GO\n\nBody text.\n");
        let (on_disk, _) = load_resource(&layout.resource_page("go")).unwrap();
        assert!(on_disk.has_product(&product));
        assert_eq!(
            on_disk.extra.get("name"),
            Some(&serde_yaml_ng::Value::from("Gene Ontology"))
        );
    }

    #[test]
    fn test_second_pass_adds_no_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RegistryLayout::new(dir.path());
        write_page(&layout, "go", "id: go\n", "");

        let mut resources = vec![
            Resource::new("go"),
            with_products("kg", vec![derived("kg.graph", &["go"], &["go"])]),
        ];

        let first = propagate_products(&mut resources, &layout).unwrap();
        assert_eq!(first.entries[0].referencing, 2);
        assert_eq!(first.entries[0].added, 1);
        assert_eq!(first.entries[0].added_on_disk, 1);
        let page = fs::read_to_string(layout.resource_page("go")).unwrap();

        let second = propagate_products(&mut resources, &layout).unwrap();
        assert_eq!(second.entries[0].added, 0);
        assert_eq!(second.entries[0].added_on_disk, 0);
        assert_eq!(second.resources_updated(), 0);
        assert_eq!(resources[0].products().len(), 1);
        assert_eq!(fs::read_to_string(layout.resource_page("go")).unwrap(), page);
    }

    #[test]
    fn test_disk_and_memory_are_checked_independently() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RegistryLayout::new(dir.path());
        // The page already lists the product, the in-memory copy does not
        write_page(
            &layout,
            "go",
            "id: go\nproducts:\n- id: kg.graph\n  original_source:\n  - go\n",
            "",
        );

        let mut resources = vec![
            Resource::new("go"),
            with_products("kg", vec![derived("kg.graph", &["go"], &[])]),
        ];

        let report = propagate_products(&mut resources, &layout).unwrap();
        assert_eq!(report.entries[0].added, 1);
        assert_eq!(report.entries[0].added_on_disk, 0);

        let (on_disk, _) = load_resource(&layout.resource_page("go")).unwrap();
        assert_eq!(on_disk.products().len(), 1);
    }

    #[test]
    fn test_self_reference_is_not_propagated() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RegistryLayout::new(dir.path());
        let mut resources = vec![with_products("kg", vec![derived("kg.graph", &["kg"], &[])])];

        let report = propagate_products(&mut resources, &layout).unwrap();

        assert!(report.referenced.is_empty());
        assert!(report.entries.is_empty());
        assert_eq!(resources[0].products().len(), 1);
    }

    #[test]
    fn test_missing_target_page_does_not_block_others() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RegistryLayout::new(dir.path());
        write_page(&layout, "hp", "id: hp\n", "");

        let mut resources = vec![
            Resource::new("go"),
            Resource::new("hp"),
            with_products("kg", vec![derived("kg.graph", &["go", "hp"], &[])]),
        ];

        let report = propagate_products(&mut resources, &layout).unwrap();

        assert_eq!(report.entries.len(), 2);
        assert!(report.entries[0].page_error.is_some());
        assert_eq!(report.entries[0].added, 1);
        assert_eq!(report.entries[1].added_on_disk, 1);
        assert_eq!(report.resources_updated(), 2);
    }

    #[test]
    fn test_unknown_targets_are_only_reported() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RegistryLayout::new(dir.path());
        let mut resources = vec![with_products(
            "kg",
            vec![derived("kg.graph", &[], &["elsewhere"])],
        )];

        let report = propagate_products(&mut resources, &layout).unwrap();
        assert_eq!(report.referenced, ["elsewhere"]);
        assert!(report.entries.is_empty());
    }
}
