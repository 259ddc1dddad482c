//! # CLI Command Implementations
//!
//! Each subcommand of `publish-example` lives in its own module with an
//! `Args` struct (derived with `clap`) and an `execute` function that calls
//! into the `publish_example` library.

pub mod check;
pub mod publish;

use anyhow::{Context, Result};
use std::path::Path;

use publish_example::config::{self, Profile};
use publish_example::defaults;

/// Resolve the profile for a run.
///
/// An explicit path wins; otherwise `publish-example.yaml` in the current
/// directory is used if present, and the compiled-in profile rooted at the
/// current directory if not.
pub fn load_profile(explicit: Option<&Path>) -> Result<Profile> {
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Profile file not found: {}", path.display());
        }
        return config::from_file(path)
            .with_context(|| format!("Failed to load profile {}", path.display()));
    }

    let local = Path::new(defaults::PROFILE_FILE);
    if local.exists() {
        return config::from_file(local)
            .with_context(|| format!("Failed to load profile {}", local.display()));
    }

    let root = std::env::current_dir().context("Failed to get current directory")?;
    let profile = defaults::builtin_profile(&root).with_context(|| {
        format!(
            "No {} found and the built-in profile could not be loaded",
            defaults::PROFILE_FILE
        )
    })?;
    profile.validate()?;
    Ok(profile)
}
