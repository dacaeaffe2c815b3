//! Knowledge-Graph Registry Consolidation Library
//!
//! The registry keeps one Markdown page per resource, at
//! `resource/<id>/<id>.md`, whose YAML front matter describes the resource and
//! the products it publishes. This library consolidates those pages into a
//! single metadata document by:
//!
//! 1. Loading every root resource page (pages whose `id` matches their directory)
//! 2. Validating licenses and decorating them with a badge `logo`
//! 3. Materializing a page per product whose id is prefixed by its resource id
//! 4. Propagating derived products onto the resources named in their
//!    `original_source` / `secondary_source`, in memory and on disk
//! 5. Merging the resources into an optional header under `resources`
//!
//! Every stage is idempotent: running it again over unchanged pages writes
//! nothing.
//!
//! # Usage
//!
//! ```ignore
//! use kg_registry::{concat, load_header, load_resources, write_output, ConcatOptions};
//!
//! let loaded = load_resources(&files)?;
//! let header = load_header(Some(Path::new("util/header.yml")))?;
//! let result = concat(loaded.resources, header, &ConcatOptions::default())?;
//!
//! write_output(Path::new("registry/kgs.yml"), &result.document)?;
//! ```

pub mod check;
pub mod consolidate;
pub mod context;
pub mod error;
pub mod frontmatter;
pub mod layout;
pub mod license;
pub mod pages;
pub mod propagate;
pub mod record;
pub mod vocab;

// Re-export main types for convenience
pub use crate::check::{check_file, check_files, CheckFailure};
pub use crate::consolidate::{
    concat, consolidate, load_header, load_resources, to_yaml_string, write_output,
    ConcatOptions, ConcatResult, ConcatStats, LoadedResources,
};
pub use crate::context::{extract_context, read_consolidated, to_json_string};
pub use crate::error::RegistryError;
pub use crate::frontmatter::{prettify_file, read_document, write_document, Document};
pub use crate::layout::RegistryLayout;
pub use crate::pages::{FieldDiff, PageOutcome, PageReport};
pub use crate::propagate::{PropagationEntry, PropagationReport};
pub use crate::record::{License, Product, Resource};
