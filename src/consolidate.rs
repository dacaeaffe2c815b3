//! Main consolidation logic
//!
//! Loads resource pages, runs the decoration, product page and propagation
//! stages over the collection, and folds everything into one YAML document.

use serde_yaml_ng::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::RegistryError;
use crate::frontmatter::{self, to_canonical};
use crate::layout::RegistryLayout;
use crate::license::decorate_licenses;
use crate::pages::{materialize_product_pages, PageOutcome, PageReport};
use crate::propagate::{propagate_products, PropagationReport};
use crate::record::{load_root_resource, Resource};
use crate::vocab::RESOURCES_KEY;

/// Options for a concat run
#[derive(Debug, Clone)]
pub struct ConcatOptions {
    /// Where `resource/<id>/` directories live
    pub layout: RegistryLayout,
    /// Create or refresh per-product pages
    pub product_pages: bool,
    /// Copy derived products onto the resources they reference
    pub propagate: bool,
}

impl Default for ConcatOptions {
    fn default() -> Self {
        Self {
            layout: RegistryLayout::default(),
            product_pages: true,
            propagate: true,
        }
    }
}

/// Result of a concat run
#[derive(Debug)]
pub struct ConcatResult {
    /// Header configuration with the `resources` array merged in
    pub document: Mapping,
    /// Per-product page outcomes
    pub pages: Vec<PageReport>,
    /// Propagation audit trail (`None` when propagation is disabled)
    pub propagation: Option<PropagationReport>,
    pub stats: ConcatStats,
}

/// Statistics from a concat run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConcatStats {
    /// Resources in the consolidated document
    pub resources: usize,
    /// Licenses that received a logo
    pub licenses_decorated: usize,
    pub pages_created: usize,
    pub pages_updated: usize,
    pub pages_unchanged: usize,
    /// Resources that received at least one propagated product
    pub resources_propagated: usize,
}

/// Loaded resources plus the auxiliary files that were passed over
#[derive(Debug, Default)]
pub struct LoadedResources {
    pub resources: Vec<Resource>,
    pub skipped: Vec<PathBuf>,
}

/// Load the root resources among `files`, in the order given
///
/// Files whose declared id does not match their directory (product pages and
/// other auxiliary pages) are skipped, and so are files without a front-matter
/// header. A header that fails to parse is still an error.
pub fn load_resources<P: AsRef<Path>>(files: &[P]) -> Result<LoadedResources, RegistryError> {
    let mut loaded = LoadedResources::default();

    for file in files {
        let path = file.as_ref();
        match load_root_resource(path) {
            Ok(Some((resource, _body))) => loaded.resources.push(resource),
            Ok(None) => {
                debug!("Skipping {}: not a root resource page", path.display());
                loaded.skipped.push(path.to_path_buf());
            }
            Err(RegistryError::MissingHeader { .. }) => {
                warn!("Skipping {}: no front-matter header", path.display());
                loaded.skipped.push(path.to_path_buf());
            }
            Err(e) => return Err(e),
        }
    }

    Ok(loaded)
}

/// Load the header configuration included at the top of the output
///
/// A missing path or an empty file yields an empty mapping.
pub fn load_header(include: Option<&Path>) -> Result<Mapping, RegistryError> {
    let Some(path) = include else {
        return Ok(Mapping::new());
    };

    let content = fs::read_to_string(path).map_err(|e| RegistryError::LoadError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    match serde_yaml_ng::from_str::<Value>(&content)? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(RegistryError::malformed(
            path.display().to_string(),
            "include file is not a YAML mapping",
        )),
    }
}

/// Run every stage over `resources` and build the consolidated document
///
/// Licenses are validated first, so a license without an id aborts the run
/// before any page is written. Resource order is kept as given.
pub fn concat(
    mut resources: Vec<Resource>,
    header: Mapping,
    options: &ConcatOptions,
) -> Result<ConcatResult, RegistryError> {
    let mut stats = ConcatStats {
        licenses_decorated: decorate_licenses(&mut resources)?,
        ..Default::default()
    };

    let pages = if options.product_pages {
        materialize_product_pages(&resources, &options.layout)?
    } else {
        Vec::new()
    };
    for report in &pages {
        match report.outcome {
            PageOutcome::Created => stats.pages_created += 1,
            PageOutcome::Unchanged => stats.pages_unchanged += 1,
            PageOutcome::Updated(_) | PageOutcome::Recreated { .. } => stats.pages_updated += 1,
        }
    }

    let propagation = if options.propagate {
        let report = propagate_products(&mut resources, &options.layout)?;
        stats.resources_propagated = report.resources_updated();
        Some(report)
    } else {
        None
    };

    stats.resources = resources.len();
    let document = consolidate(header, &resources)?;

    Ok(ConcatResult {
        document,
        pages,
        propagation,
        stats,
    })
}

/// Merge resources into the header under the `resources` key
///
/// The header keeps its own key order; an existing `resources` key is
/// replaced in place.
pub fn consolidate(mut header: Mapping, resources: &[Resource]) -> Result<Mapping, RegistryError> {
    let records = resources
        .iter()
        .map(to_canonical)
        .collect::<Result<Vec<Value>, _>>()?;

    header.insert(Value::from(RESOURCES_KEY), Value::Sequence(records));
    Ok(header)
}

/// Serialize a consolidated document to YAML
pub fn to_yaml_string(document: &Mapping) -> Result<String, RegistryError> {
    frontmatter::to_yaml_string(document)
}

/// Write a consolidated document, replacing the file if it exists
pub fn write_output(path: &Path, document: &Mapping) -> Result<(), RegistryError> {
    fs::write(path, to_yaml_string(document)?)?;
    Ok(())
}
