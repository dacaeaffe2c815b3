//! License logo decoration
//!
//! Resources declaring a Creative Commons license get a `logo` pointing at the
//! matching badge. See <https://creativecommons.org/about/downloads>.

use tracing::debug;

use crate::error::RegistryError;
use crate::record::Resource;
use crate::vocab::LICENSE_LOGOS;

/// Badge URL for a license id, if it belongs to a known family
pub fn license_logo(license_id: &str) -> Option<&'static str> {
    LICENSE_LOGOS
        .iter()
        .find(|(pattern, _)| license_id.contains(*pattern))
        .map(|(_, logo)| *logo)
}

/// Fail if the resource declares a license without an id
pub fn validate_license(resource: &Resource) -> Result<(), RegistryError> {
    match &resource.license {
        Some(license) if license.id.is_none() => Err(RegistryError::MissingLicenseId {
            resource: resource.id.clone(),
        }),
        _ => Ok(()),
    }
}

/// Set the license logo of a single resource
///
/// Returns `true` if a logo was assigned.
pub fn decorate_resource(resource: &mut Resource) -> Result<bool, RegistryError> {
    validate_license(resource)?;

    let Some(license) = resource.license.as_mut() else {
        return Ok(false);
    };
    let Some(logo) = license.id.as_deref().and_then(license_logo) else {
        return Ok(false);
    };

    debug!("Assigning license logo {} to {}", logo, resource.id);
    license.logo = Some(logo.to_string());
    Ok(true)
}

/// Decorate every resource, returning how many received a logo
///
/// All licenses are validated before any resource is touched, so a missing id
/// leaves the collection unchanged.
pub fn decorate_licenses(resources: &mut [Resource]) -> Result<usize, RegistryError> {
    for resource in resources.iter() {
        validate_license(resource)?;
    }

    let mut decorated = 0;
    for resource in resources.iter_mut() {
        if decorate_resource(resource)? {
            decorated += 1;
        }
    }
    Ok(decorated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::License;
    use crate::vocab::{CC_BY_LOGO, CC_BY_SA_LOGO, CC_ZERO_LOGO};
    use serde_yaml_ng::Mapping;

    fn licensed(id: &str, license_id: Option<&str>) -> Resource {
        let mut resource = Resource::new(id);
        resource.license = Some(License {
            id: license_id.map(String::from),
            logo: None,
            extra: Mapping::new(),
        });
        resource
    }

    #[test]
    fn test_license_logo_families() {
        assert_eq!(
            license_logo("https://creativecommons.org/licenses/by-sa/4.0/"),
            Some(CC_BY_SA_LOGO)
        );
        assert_eq!(
            license_logo("https://creativecommons.org/licenses/by/4.0/"),
            Some(CC_BY_LOGO)
        );
        assert_eq!(
            license_logo("http://creativecommons.org/publicdomain/zero/1.0/"),
            Some(CC_ZERO_LOGO)
        );
    }

    #[test]
    fn test_unknown_license_has_no_logo() {
        assert_eq!(license_logo("https://opensource.org/licenses/MIT"), None);
        assert_eq!(
            license_logo("https://creativecommons.org/licenses/by-nc/4.0/"),
            None
        );

        let mut resource = licensed("mit", Some("https://opensource.org/licenses/MIT"));
        assert!(!decorate_resource(&mut resource).unwrap());
        assert!(resource.license.unwrap().logo.is_none());
    }

    #[test]
    fn test_decorate_sets_logo() {
        let mut resources = vec![
            licensed("a", Some("https://creativecommons.org/licenses/by/4.0/")),
            Resource::new("b"),
        ];

        assert_eq!(decorate_licenses(&mut resources).unwrap(), 1);
        assert_eq!(
            resources[0].license.as_ref().unwrap().logo.as_deref(),
            Some(CC_BY_LOGO)
        );
        assert!(resources[1].license.is_none());
    }

    #[test]
    fn test_missing_license_id_is_fatal() {
        let mut resources = vec![
            licensed("ok", Some("https://creativecommons.org/licenses/by/4.0/")),
            licensed("broken", None),
        ];

        let err = decorate_licenses(&mut resources).unwrap_err();
        assert!(
            matches!(err, RegistryError::MissingLicenseId { ref resource } if resource == "broken")
        );
        // Nothing decorated before the failure was found
        assert!(resources[0].license.as_ref().unwrap().logo.is_none());
    }
}
