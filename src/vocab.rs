//! Vocabulary definitions for the registry
//!
//! Field names, page layout markers and license logo constants shared by the
//! consolidation stages.

/// Directory (relative to the registry root) holding one folder per resource
pub const RESOURCE_DIR: &str = "resource";

/// Extension of resource and product pages
pub const PAGE_EXTENSION: &str = "md";

/// Key holding the resource array in the consolidated document
pub const RESOURCES_KEY: &str = "resources";

/// Key injected into materialized product pages
pub const LAYOUT_KEY: &str = "layout";

/// Layout value for materialized product pages
pub const PRODUCT_LAYOUT: &str = "product_detail";

/// Creative Commons Attribution-ShareAlike licenses
pub const CC_BY_SA_PATTERN: &str = "creativecommons.org/licenses/by-sa";
pub const CC_BY_SA_LOGO: &str =
    "https://mirrors.creativecommons.org/presskit/buttons/80x15/png/by-sa.png";

/// Creative Commons Attribution licenses
pub const CC_BY_PATTERN: &str = "creativecommons.org/licenses/by/";
pub const CC_BY_LOGO: &str = "http://mirrors.creativecommons.org/presskit/buttons/80x15/png/by.png";

/// Creative Commons public domain dedication
pub const CC_ZERO_PATTERN: &str = "creativecommons.org/publicdomain/zero/";
pub const CC_ZERO_LOGO: &str =
    "http://mirrors.creativecommons.org/presskit/buttons/80x15/png/cc-zero.png";

/// License families in match priority order
pub const LICENSE_LOGOS: [(&str, &str); 3] = [
    (CC_BY_SA_PATTERN, CC_BY_SA_LOGO),
    (CC_BY_PATTERN, CC_BY_LOGO),
    (CC_ZERO_PATTERN, CC_ZERO_LOGO),
];

/// Base IRI for OBO-style prefixes in the JSON-LD context
pub const OBO_PURL_BASE: &str = "http://purl.obolibrary.org/obo/";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sharealike_checked_before_attribution() {
        // "by-sa" does not contain "by/", but priority order must still put it first
        assert_eq!(LICENSE_LOGOS[0].0, CC_BY_SA_PATTERN);
        assert_eq!(LICENSE_LOGOS[1].0, CC_BY_PATTERN);
        assert_eq!(LICENSE_LOGOS[2].0, CC_ZERO_PATTERN);
    }
}
