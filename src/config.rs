//! # Publish Profile
//!
//! This module defines the publish profile: every parameter a publish run
//! needs, loaded from a YAML file (`publish-example.yaml` by default) or taken
//! from the compiled-in profile in [`crate::defaults`].
//!
//! ## Format
//!
//! ```yaml
//! source: test
//! exclude_dirs: [node_modules]
//! marker: "// !publish: remove"
//! manifest:
//!   file: package.json
//!   rules:
//!     - pattern: '"convex": "file:../node_modules/convex",'
//!       replacement: '"convex": "^1.12.2",'
//! exclude_paths:
//!   - convex/otp/FakePhone.ts
//! target:
//!   url: https://github.com/example/example-app.git
//!   branch: main
//!   push: lease
//! provenance: https://github.com/example/library
//! ```
//!
//! A relative `source` is resolved against the directory holding the profile
//! file. `push` is either `lease` (the default: refuse to overwrite a branch
//! that moved after the run started) or `force`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// A literal substitution applied to the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    /// Exact text to look for. Every occurrence is replaced.
    pub pattern: String,
    /// Text written in place of each occurrence.
    pub replacement: String,
}

impl RewriteRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// The manifest file and the ordered rules applied to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestSpec {
    /// Path of the manifest, relative to the workspace root.
    pub file: PathBuf,
    /// Rules, applied in order.
    #[serde(default)]
    pub rules: Vec<RewriteRule>,
}

/// How the final push treats the current remote branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushPolicy {
    /// Overwrite only if the remote tip still matches what preflight observed.
    #[default]
    Lease,
    /// Overwrite unconditionally. Concurrent runs race; the last push wins.
    Force,
}

/// Destination repository and branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishTarget {
    pub url: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default)]
    pub push: PushPolicy,
}

/// Identity recorded on the published commit.
///
/// When absent, git falls back to the user's own configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// A complete publish profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Root of the tree to publish.
    pub source: PathBuf,
    /// Directory names skipped at any depth while staging.
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
    /// Lines containing this text are removed together with the next line.
    pub marker: String,
    pub manifest: ManifestSpec,
    /// Paths, relative to the workspace root, removed after filtering.
    #[serde(default)]
    pub exclude_paths: Vec<PathBuf>,
    pub target: PublishTarget,
    /// Where the published tree comes from; quoted in the commit message.
    #[serde(default)]
    pub provenance: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_exclude_dirs() -> Vec<String> {
    vec!["node_modules".to_string()]
}

impl Profile {
    /// The fixed message of the single published commit.
    pub fn commit_message(&self) -> String {
        match &self.provenance {
            Some(provenance) => format!("Published from {}", provenance),
            None => format!("Published from {}", self.source.display()),
        }
    }

    /// Check the profile for values that would make a run unsafe or
    /// meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.marker.trim().is_empty() {
            return Err(config_error(
                "marker must not be empty",
                Some("an empty marker would match every line"),
            ));
        }

        if self.manifest.file.as_os_str().is_empty() {
            return Err(config_error("manifest.file must not be empty", None));
        }
        check_relative("manifest.file", &self.manifest.file)?;

        for (index, rule) in self.manifest.rules.iter().enumerate() {
            if rule.pattern.is_empty() {
                return Err(config_error(
                    format!("manifest.rules[{}].pattern must not be empty", index),
                    None,
                ));
            }
        }

        for dir in &self.exclude_dirs {
            if dir.is_empty() || dir.contains('/') || dir.contains('\\') || dir == "." || dir == ".." {
                return Err(config_error(
                    format!("exclude_dirs entry '{}' is not a bare directory name", dir),
                    Some("list names such as 'node_modules', not paths"),
                ));
            }
        }

        for path in &self.exclude_paths {
            check_relative("exclude_paths", path)?;
        }

        if self.target.url.trim().is_empty() {
            return Err(config_error("target.url must not be empty", None));
        }
        if self.target.branch.trim().is_empty() {
            return Err(config_error("target.branch must not be empty", None));
        }

        Ok(())
    }

    /// Resolve a relative `source` against `base`.
    pub fn resolve_source(&mut self, base: &Path) {
        if self.source.is_relative() {
            self.source = base.join(&self.source);
        }
    }
}

/// Reject absolute paths and paths that climb out of the workspace.
fn check_relative(field: &str, path: &Path) -> Result<()> {
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    let names_entry = path.components().any(|c| matches!(c, Component::Normal(_)));
    if escapes || !names_entry {
        return Err(config_error(
            format!(
                "{} entry '{}' must be a relative path inside the workspace",
                field,
                path.display()
            ),
            Some("remove leading '/' and any '..' components"),
        ));
    }
    Ok(())
}

fn config_error(message: impl Into<String>, hint: Option<&str>) -> Error {
    Error::Config {
        message: message.into(),
        hint: hint.map(str::to_string),
    }
}

/// Parse a profile from YAML without resolving or validating it.
pub fn parse(yaml: &str) -> Result<Profile> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load, resolve and validate a profile file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Profile> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("cannot read profile {}: {}", path.display(), e),
        hint: None,
    })?;
    let mut profile = parse(&content)?;

    let base = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    profile.resolve_source(base);
    profile.validate()?;
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const FULL: &str = r#"
source: test
exclude_dirs: [node_modules, .git]
marker: "// !publish: remove"
manifest:
  file: package.json
  rules:
    - pattern: '"react": "file:../node_modules/react",'
      replacement: '"react": "^18.3.0",'
    - pattern: '"convex": "file:../node_modules/convex",'
      replacement: '"convex": "^1.12.2",'
exclude_paths:
  - convex/otp/FakePhone.ts
target:
  url: https://github.com/example/example-app.git
  branch: release
  push: force
provenance: https://github.com/example/library
author:
  name: Publisher
  email: publisher@example.com
"#;

    const MINIMAL: &str = r##"
source: .
marker: "#internal"
manifest:
  file: Cargo.toml
target:
  url: /srv/git/example.git
"##;

    #[test]
    fn test_parse_full_profile() {
        let profile = parse(FULL).unwrap();
        assert_eq!(profile.source, PathBuf::from("test"));
        assert_eq!(profile.exclude_dirs, vec!["node_modules", ".git"]);
        assert_eq!(profile.manifest.rules.len(), 2);
        assert_eq!(profile.manifest.rules[1].replacement, r#""convex": "^1.12.2","#);
        assert_eq!(profile.target.branch, "release");
        assert_eq!(profile.target.push, PushPolicy::Force);
        assert_eq!(profile.author.unwrap().name, "Publisher");
        profile_validates(FULL);
    }

    fn profile_validates(yaml: &str) {
        parse(yaml).unwrap().validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_profile_defaults() {
        let profile = parse(MINIMAL).unwrap();
        assert_eq!(profile.exclude_dirs, vec!["node_modules"]);
        assert!(profile.manifest.rules.is_empty());
        assert!(profile.exclude_paths.is_empty());
        assert_eq!(profile.target.branch, "main");
        assert_eq!(profile.target.push, PushPolicy::Lease);
        assert!(profile.author.is_none());
        profile_validates(MINIMAL);
    }

    #[test]
    fn test_commit_message_uses_provenance() {
        let profile = parse(FULL).unwrap();
        assert_eq!(
            profile.commit_message(),
            "Published from https://github.com/example/library"
        );
    }

    #[test]
    fn test_commit_message_falls_back_to_source() {
        let profile = parse(MINIMAL).unwrap();
        assert_eq!(profile.commit_message(), "Published from .");
    }

    #[test]
    fn test_validate_rejects_empty_marker() {
        let mut profile = parse(MINIMAL).unwrap();
        profile.marker = "  ".to_string();
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("marker must not be empty"));
    }

    #[test]
    fn test_validate_rejects_escaping_exclude_path() {
        let mut profile = parse(MINIMAL).unwrap();
        profile.exclude_paths = vec![PathBuf::from("../outside.txt")];
        assert!(profile.validate().is_err());

        profile.exclude_paths = vec![PathBuf::from("/etc/passwd")];
        assert!(profile.validate().is_err());

        profile.exclude_paths = vec![PathBuf::from(".")];
        assert!(profile.validate().is_err());

        profile.exclude_paths = vec![PathBuf::from("./convex/otp/FakePhone.ts")];
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_path_in_exclude_dirs() {
        let mut profile = parse(MINIMAL).unwrap();
        profile.exclude_dirs = vec!["src/node_modules".to_string()];
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("bare directory name"));
    }

    #[test]
    fn test_validate_rejects_empty_rule_pattern() {
        let mut profile = parse(MINIMAL).unwrap();
        profile.manifest.rules.push(RewriteRule::new("", "x"));
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_branch() {
        let mut profile = parse(MINIMAL).unwrap();
        profile.target.branch = String::new();
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_push_policy() {
        let yaml = MINIMAL.replace("url: /srv/git/example.git", "url: x\n  push: merge");
        assert!(parse(&yaml).is_err());
    }

    #[test]
    fn test_from_file_resolves_source_against_profile_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("publish-example.yaml");
        fs::write(&path, FULL).unwrap();

        let profile = from_file(&path).unwrap();
        assert_eq!(profile.source, temp_dir.path().join("test"));
    }

    #[test]
    fn test_from_file_keeps_absolute_source() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("profile.yaml");
        fs::write(&path, MINIMAL.replace("source: .", "source: /srv/example")).unwrap();

        let profile = from_file(&path).unwrap();
        assert_eq!(profile.source, PathBuf::from("/srv/example"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = from_file("/nonexistent/publish-example.yaml").unwrap_err();
        assert!(err.to_string().contains("cannot read profile"));
    }
}
