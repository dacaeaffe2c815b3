//! Structural checks on registry pages
//!
//! Verifies that pages carry a readable header and that root resources fit the
//! record model. Schema validation and YAML linting are left to external tools.

use std::path::{Path, PathBuf};

use crate::error::RegistryError;
use crate::frontmatter::read_document;
use crate::license::validate_license;
use crate::record::{is_root_record, Resource};

/// A page that failed its checks
#[derive(Debug)]
pub struct CheckFailure {
    pub path: PathBuf,
    pub error: RegistryError,
}

/// Check a single page
///
/// Every page needs a front-matter header. Root resource pages must also
/// deserialize into a [`Resource`] and declare an id on any license.
pub fn check_file(path: &Path) -> Result<(), RegistryError> {
    let document = read_document(path)?;
    if !is_root_record(&document.header, path) {
        return Ok(());
    }

    let resource = Resource::from_header(document.header, &path.display().to_string())?;
    validate_license(&resource)
}

/// Check every page, collecting all failures
pub fn check_files<P: AsRef<Path>>(files: &[P]) -> Vec<CheckFailure> {
    files
        .iter()
        .filter_map(|file| {
            let path = file.as_ref();
            check_file(path).err().map(|error| CheckFailure {
                path: path.to_path_buf(),
                error,
            })
        })
        .collect()
}
