//! Reading the published package identity from a `package.json`.
//!
//! The compiled-in profile pins the library dependency of the example to the
//! version the library itself declares, so the example always points at the
//! release it was published alongside.

use crate::error::{Error, Result};
use semver::Version;
use serde::Deserialize;
use std::path::Path;

/// Name and version declared by a package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIdentity {
    pub name: String,
    pub version: Version,
}

impl PackageIdentity {
    /// The caret range a published dependent should declare, e.g. `^1.4.0`.
    pub fn caret_range(&self) -> String {
        format!("^{}", self.version)
    }
}

#[derive(Deserialize)]
struct RawPackage {
    name: Option<String>,
    version: Option<String>,
}

/// Parse the `name` and `version` fields of a `package.json` document.
pub fn parse_package_identity(json: &str) -> Result<PackageIdentity> {
    let raw: RawPackage = serde_json::from_str(json)?;

    let name = raw.name.filter(|n| !n.is_empty()).ok_or_else(|| Error::Config {
        message: "package manifest has no \"name\"".to_string(),
        hint: None,
    })?;
    let version = raw.version.ok_or_else(|| Error::Config {
        message: format!("package manifest for {} has no \"version\"", name),
        hint: None,
    })?;

    Ok(PackageIdentity {
        name,
        version: Version::parse(&version)?,
    })
}

/// Read the package identity from a manifest on disk.
pub fn read_package_identity(path: &Path) -> Result<PackageIdentity> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("cannot read {}: {}", path.display(), e),
        hint: Some("run from the library root or pass --profile".to_string()),
    })?;
    parse_package_identity(&content)
}
