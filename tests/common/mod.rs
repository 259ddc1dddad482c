//! Shared test utilities for the end-to-end tests.
//!
//! Add `mod common;` to a test file, then `use common::prelude::*;`.

#![allow(dead_code)]

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git, git_available, TestFixture};
}

/// Profile template; `{source}` and `{url}` are substituted by the fixture.
pub const PROFILE: &str = r#"
source: "{source}"
marker: "// !publish: remove"
manifest:
  file: package.json
  rules:
    - pattern: '"@acme/auth": "file:..",'
      replacement: '"@acme/auth": "^0.4.1",'
    - pattern: '"react": "file:../node_modules/react",'
      replacement: '"react": "^18.3.0",'
exclude_paths:
  - convex/otp/FakePhone.ts
target:
  url: "{url}"
  branch: main
provenance: https://example.com/acme/auth
author:
  name: Publisher
  email: publisher@example.com
"#;

pub const PACKAGE_JSON: &str = r#"{
  "name": "auth-example",
  "dependencies": {
    "@acme/auth": "file:..",
    "react": "file:../node_modules/react",
    "zod": "^3.0.0"
  }
}
"#;

pub const APP_TS: &str = "import { auth } from \"@acme/auth\";\n\
// !publish: remove\n\
import { debugOnly } from \"../internal\";\n\
export default auth;\n";

/// Whether a usable `git` is on PATH.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run git in `dir` and return trimmed stdout, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
        .args(args)
        .current_dir(dir)
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE")
        .env_remove("GIT_INDEX_FILE")
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A temp directory holding an example source tree, a scratch directory for
/// workspaces, and optionally a bare target repository.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// An example tree under `app/` with a marked line, a manifest with
    /// local references, an excluded file and a `node_modules` directory.
    pub fn new() -> Self {
        let fixture = Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        };
        fixture
            .with_file("app/package.json", PACKAGE_JSON)
            .with_file("app/src/App.ts", APP_TS)
            .with_file("app/convex/otp/FakePhone.ts", "export const fake = true;\n")
            .with_file("app/convex/otp/ResendOTP.ts", "export const real = true;\n")
            .with_file("app/node_modules/react/index.js", "module.exports = {};\n")
            .with_dir("tmp")
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn with_dir(self, path: &str) -> Self {
        self.temp_dir
            .child(path)
            .create_dir_all()
            .expect("Failed to create directory");
        self
    }

    /// Write the profile pointing at `url` and return its path.
    pub fn with_profile(&self, url: &str) -> PathBuf {
        let content = PROFILE
            .replace("{source}", &self.source().display().to_string())
            .replace("{url}", url);
        let child = self.temp_dir.child("publish-example.yaml");
        child.write_str(&content).expect("Failed to write profile");
        child.path().to_path_buf()
    }

    /// Create an empty bare repository to publish into.
    pub fn bare_remote(&self) -> PathBuf {
        let remote = self.path().join("remote.git");
        std::fs::create_dir_all(&remote).expect("Failed to create remote dir");
        git(&remote, &["init", "--bare", "--quiet"]);
        remote
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn source(&self) -> PathBuf {
        self.path().join("app")
    }

    /// Scratch directory passed as `--temp-dir`.
    pub fn scratch(&self) -> PathBuf {
        self.path().join("tmp")
    }

    /// Number of entries left in the scratch directory.
    pub fn leftover_workspaces(&self) -> usize {
        std::fs::read_dir(self.scratch())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// `publish-example` running in the fixture directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("publish-example");
        cmd.current_dir(self.path())
            .env_remove("PUBLISH_EXAMPLE_PROFILE")
            .env_remove("PUBLISH_EXAMPLE_TMPDIR")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
