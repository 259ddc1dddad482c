//! Default values and the compiled-in publish profile.
//!
//! This module centralizes defaults used across commands, ensuring the
//! `publish` and `check` commands resolve profiles and workspaces the same way.

use std::path::{Path, PathBuf};

use crate::config::{ManifestSpec, Profile, PublishTarget, PushPolicy, RewriteRule};
use crate::error::Result;
use crate::version::read_package_identity;

/// Profile file looked up in the current directory when `--profile` is absent.
pub const PROFILE_FILE: &str = "publish-example.yaml";

/// Prefix of every workspace directory; a random suffix follows.
pub const WORKSPACE_PREFIX: &str = "publish-example-";

/// Returns the directory new workspaces are created under.
///
/// This is the OS temporary directory unless overridden by the `--temp-dir`
/// CLI flag or the `PUBLISH_EXAMPLE_TMPDIR` environment variable.
pub fn default_temp_base() -> PathBuf {
    std::env::temp_dir()
}

/// The compiled-in profile, rooted at the library checkout `root`.
///
/// Publishes `root/test` to the example repository. The library's own
/// dependency is pinned to the version in `root/package.json`; the other
/// local-path dependencies are pinned to fixed published ranges.
pub fn builtin_profile(root: &Path) -> Result<Profile> {
    let identity = read_package_identity(&root.join("package.json"))?;

    let rules = vec![
        RewriteRule::new(
            format!("\"{}\": \"file:..\",", identity.name),
            format!("\"{}\": \"{}\",", identity.name, identity.caret_range()),
        ),
        RewriteRule::new(
            "\"convex\": \"file:../node_modules/convex\",",
            "\"convex\": \"^1.12.2\",",
        ),
        RewriteRule::new(
            "\"react\": \"file:../node_modules/react\",",
            "\"react\": \"^18.3.0\",",
        ),
        RewriteRule::new(
            "\"react-dom\": \"file:../node_modules/react-dom\",",
            "\"react-dom\": \"^18.3.0\",",
        ),
    ];

    Ok(Profile {
        source: root.join("test"),
        exclude_dirs: vec!["node_modules".to_string()],
        marker: "// !publish: remove".to_string(),
        manifest: ManifestSpec {
            file: PathBuf::from("package.json"),
            rules,
        },
        exclude_paths: vec![PathBuf::from("convex/otp/FakePhone.ts")],
        target: PublishTarget {
            url: "https://github.com/get-convex/convex-auth-example.git".to_string(),
            branch: "main".to_string(),
            push: PushPolicy::Lease,
        },
        provenance: Some("https://github.com/get-convex/convex-auth".to_string()),
        author: None,
    })
}
