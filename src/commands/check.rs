//! # Check Command Implementation
//!
//! The `check` subcommand verifies a publish profile and the preconditions of
//! a run without staging, committing or pushing anything:
//!
//! - the profile loads and validates,
//! - `git` is available,
//! - the source tree exists and is a directory,
//! - the manifest named by the profile exists in the source tree,
//! - with `--remote`, the target branch can be queried (its current tip is
//!   printed, or reported as absent).
//!
//! Excluded paths missing from the source are reported for information only,
//! since pruning tolerates absent entries.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use publish_example::output::{OutputConfig, Symbol};
use publish_example::vcs::{GitCli, VersionControl};

/// Validate the publish profile and run preconditions
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the publish profile
    #[arg(short, long, value_name = "FILE", env = "PUBLISH_EXAMPLE_PROFILE")]
    pub profile: Option<PathBuf>,

    /// Also query the target repository for the current branch tip
    #[arg(long)]
    pub remote: bool,
}

/// Execute the `check` command.
pub fn execute(args: CheckArgs, output: &OutputConfig) -> Result<()> {
    let profile = super::load_profile(args.profile.as_deref())?;
    output.status(
        Symbol::Success,
        format!(
            "Profile valid: {} -> {} ({})",
            profile.source.display(),
            profile.target.url,
            profile.target.branch
        ),
    );

    let git = GitCli::new();
    let mut failures = 0;

    if git.is_available() {
        output.status(Symbol::Success, "git is available");
    } else {
        output.status(Symbol::Failure, "git is not available");
        failures += 1;
    }

    if profile.source.is_dir() {
        output.status(
            Symbol::Success,
            format!("Source tree found: {}", profile.source.display()),
        );

        let manifest = profile.source.join(&profile.manifest.file);
        if manifest.is_file() {
            output.status(
                Symbol::Success,
                format!("Manifest found: {}", profile.manifest.file.display()),
            );
        } else {
            output.status(
                Symbol::Failure,
                format!("Manifest not found: {}", manifest.display()),
            );
            failures += 1;
        }

        for path in &profile.exclude_paths {
            if !profile.source.join(path).exists() {
                output.status(
                    Symbol::Info,
                    format!("Excluded path not present in source: {}", path.display()),
                );
            }
        }
    } else {
        output.status(
            Symbol::Failure,
            format!("Source tree not found: {}", profile.source.display()),
        );
        failures += 1;
    }

    if args.remote && failures == 0 {
        match git.remote_tip(&profile.target.url, &profile.target.branch) {
            Ok(Some(tip)) => output.status(
                Symbol::Success,
                format!("Remote branch {} is at {}", profile.target.branch, tip),
            ),
            Ok(None) => output.status(
                Symbol::Info,
                format!("Remote branch {} does not exist yet", profile.target.branch),
            ),
            Err(e) => {
                output.status(Symbol::Failure, format!("Remote not reachable: {}", e));
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} check(s) failed", failures);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn quiet() -> OutputConfig {
        OutputConfig::from_env_and_flag("never").quiet(true)
    }

    fn write_profile(dir: &TempDir, with_manifest: bool) -> PathBuf {
        let source = dir.path().join("app");
        fs::create_dir_all(&source).unwrap();
        if with_manifest {
            fs::write(source.join("package.json"), "{}\n").unwrap();
        }

        let path = dir.path().join("publish-example.yaml");
        fs::write(
            &path,
            r#"
source: app
marker: "// internal"
manifest:
  file: package.json
exclude_paths:
  - secrets/fake.ts
target:
  url: /nonexistent/remote.git
"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_check_missing_profile() {
        let args = CheckArgs {
            profile: Some(PathBuf::from("/nonexistent/publish-example.yaml")),
            remote: false,
        };
        let err = execute(args, &quiet()).unwrap_err();
        assert!(err.to_string().contains("Profile file not found"));
    }

    #[test]
    fn test_check_missing_manifest_fails() {
        let temp_dir = TempDir::new().unwrap();
        let args = CheckArgs {
            profile: Some(write_profile(&temp_dir, false)),
            remote: false,
        };
        let err = execute(args, &quiet()).unwrap_err();
        assert!(err.to_string().contains("check(s) failed"));
    }

    #[test]
    fn test_check_valid_profile() {
        if !GitCli::new().is_available() {
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let args = CheckArgs {
            profile: Some(write_profile(&temp_dir, true)),
            remote: false,
        };
        execute(args, &quiet()).unwrap();
    }

    #[test]
    fn test_check_unreachable_remote_fails() {
        if !GitCli::new().is_available() {
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let args = CheckArgs {
            profile: Some(write_profile(&temp_dir, true)),
            remote: true,
        };
        assert!(execute(args, &quiet()).is_err());
    }
}
