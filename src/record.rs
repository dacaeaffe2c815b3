//! Resource, product and license records
//!
//! Records keep a small set of typed fields next to an open mapping of
//! everything else, so unknown metadata passes through unchanged.

use serde::{Deserialize, Serialize};
use serde_yaml_ng::{Mapping, Value};
use std::path::Path;

use crate::error::RegistryError;
use crate::frontmatter::{read_document, Document};

/// A registry resource, the header of `resource/<id>/<id>.md`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Something a resource publishes
///
/// Equality is structural over every field, which is what propagation uses
/// to decide whether a product is already listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_source: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_source: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    /// Canonical license URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl Resource {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            license: None,
            products: None,
            extra: Mapping::new(),
        }
    }

    /// Build a resource from a parsed page header
    pub fn from_header(header: Mapping, path: &str) -> Result<Self, RegistryError> {
        serde_yaml_ng::from_value(Value::Mapping(header))
            .map_err(|e| RegistryError::malformed(path, e.to_string()))
    }

    pub fn products(&self) -> &[Product] {
        self.products.as_deref().unwrap_or_default()
    }

    /// Whether a structurally equal product is already listed
    pub fn has_product(&self, product: &Product) -> bool {
        self.products().iter().any(|p| p == product)
    }

    /// Append a product unless an equal one is already listed
    ///
    /// Returns `true` if the product was added.
    pub fn add_product(&mut self, product: Product) -> bool {
        if self.has_product(&product) {
            return false;
        }
        self.products.get_or_insert_with(Vec::new).push(product);
        true
    }
}

impl Product {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            original_source: None,
            secondary_source: None,
            extra: Mapping::new(),
        }
    }

    /// Resource ids this product is derived from, original sources first
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.original_source
            .iter()
            .chain(self.secondary_source.iter())
            .flatten()
            .map(String::as_str)
    }
}

/// Whether a header declares the root resource of its directory
///
/// Only `resource/<id>/<id>.md`-style records, whose `id` matches the parent
/// directory name, count as resources. Product pages and other auxiliary
/// files in the same directory do not.
pub fn is_root_record(header: &Mapping, path: &Path) -> bool {
    let declared = header.get("id").and_then(Value::as_str);
    let parent = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str());

    matches!((declared, parent), (Some(id), Some(dir)) if id == dir)
}

/// Load a page as a root resource, or `None` if it is an auxiliary file
pub fn load_root_resource(path: &Path) -> Result<Option<(Resource, String)>, RegistryError> {
    let Document { header, body } = read_document(path)?;
    if !is_root_record(&header, path) {
        return Ok(None);
    }
    let resource = Resource::from_header(header, &path.display().to_string())?;
    Ok(Some((resource, body)))
}

/// Load a page that must hold a resource, together with its body
pub fn load_resource(path: &Path) -> Result<(Resource, String), RegistryError> {
    let Document { header, body } = read_document(path)?;
    let resource = Resource::from_header(header, &path.display().to_string())?;
    Ok((resource, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn parse_resource(yaml: &str) -> Resource {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let resource = parse_resource(
            "id: go\nname: Gene Ontology\ndomains: [biology]\nproducts:\n  - id: go.owl\n    format: owl\n",
        );

        assert_eq!(resource.id, "go");
        assert_eq!(resource.extra.get("name"), Some(&Value::from("Gene Ontology")));
        assert_eq!(resource.products().len(), 1);
        assert_eq!(
            resource.products()[0].extra.get("format"),
            Some(&Value::from("owl"))
        );

        let value = serde_yaml_ng::to_value(&resource).unwrap();
        assert_eq!(value["domains"][0], Value::from("biology"));
        assert_eq!(value["products"][0]["format"], Value::from("owl"));
    }

    #[test]
    fn test_product_equality_ignores_key_order() {
        let a: Product =
            serde_yaml_ng::from_str("id: x:1\nname: X\noriginal_source: [a]\n").unwrap();
        let b: Product =
            serde_yaml_ng::from_str("name: X\noriginal_source: [a]\nid: x:1\n").unwrap();
        let c: Product =
            serde_yaml_ng::from_str("id: x:1\nname: Y\noriginal_source: [a]\n").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_add_product_skips_duplicates() {
        let mut resource = Resource::new("a");
        assert!(resource.add_product(Product::new("b:1")));
        assert!(!resource.add_product(Product::new("b:1")));
        assert_eq!(resource.products().len(), 1);
        assert!(resource.has_product(&Product::new("b:1")));
    }

    #[test]
    fn test_sources_chain_both_fields() {
        let mut product = Product::new("kg:1");
        product.original_source = Some(vec!["a".into(), "b".into()]);
        product.secondary_source = Some(vec!["c".into()]);

        assert_eq!(product.sources().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(Product::new("kg:2").sources().count(), 0);
    }

    #[test]
    fn test_is_root_record() {
        let header: Mapping = serde_yaml_ng::from_str("id: go").unwrap();
        assert!(is_root_record(&header, Path::new("resource/go/go.md")));
        assert!(!is_root_record(&header, Path::new("resource/obo/go.md")));

        let product: Mapping = serde_yaml_ng::from_str("id: go.owl").unwrap();
        assert!(!is_root_record(&product, Path::new("resource/go/go.owl.md")));

        let missing: Mapping = serde_yaml_ng::from_str("name: nothing").unwrap();
        assert!(!is_root_record(&missing, Path::new("resource/go/go.md")));
    }

    #[test]
    fn test_load_root_resource_skips_auxiliary_pages() {
        let dir = tempfile::tempdir().unwrap();
        let resource_dir = dir.path().join("go");
        fs::create_dir_all(&resource_dir).unwrap();
        fs::write(resource_dir.join("go.md"), "---\nid: go\n---\n# GO\n").unwrap();
        fs::write(
            resource_dir.join("go.owl.md"),
            "---\nid: go.owl\nlayout: product_detail\n---\n",
        )
        .unwrap();

        let (resource, body) = load_root_resource(&resource_dir.join("go.md"))
            .unwrap()
            .unwrap();
        assert_eq!(resource.id, "go");
        assert_eq!(body, "# GO\n");

        assert!(load_root_resource(&resource_dir.join("go.owl.md"))
            .unwrap()
            .is_none());
    }
}
