//! # Error Handling
//!
//! This module defines the centralized error type for the `publish-example`
//! pipeline. It uses `thiserror` to give every failure mode a descriptive
//! message and enough context (paths, commands, stderr) to act on.
//!
//! ## Key Components
//!
//! - **`Error`**: Every failure the pipeline can produce. The domain variants
//!   map one-to-one onto the pipeline stages:
//!   - `Staging` for workspace creation and copy failures.
//!   - `Filter` for unreadable or non-UTF-8 content under the marker filter.
//!   - `ManifestNotFound` when the manifest to rewrite is missing.
//!   - `VersionControl` and `LeaseRejected` for init, commit and push failures.
//!   - `Prune` when an excluded path exists but cannot be removed.
//!   - `Cleanup` when the workspace cannot be torn down.
//!
//!   `Error::Stage` wraps any of these with the [`Stage`] that failed, which is
//!   what the orchestrator hands back to the caller.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A step of the publish pipeline, used to name the stage a run failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preflight,
    Staging,
    Filter,
    Rewrite,
    Prune,
    Commit,
    Push,
    Cleanup,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Preflight => "preflight",
            Stage::Staging => "stage",
            Stage::Filter => "filter",
            Stage::Rewrite => "rewrite",
            Stage::Prune => "prune",
            Stage::Commit => "commit",
            Stage::Push => "push",
            Stage::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for publish-example operations
#[derive(Error, Debug)]
pub enum Error {
    /// The workspace could not be created or populated from the source tree.
    #[error("Staging error: {message}")]
    Staging { message: String },

    /// A file in the workspace could not be processed by the marker filter.
    #[error("Filter error in {}: {message}", path.display())]
    Filter { path: PathBuf, message: String },

    /// The manifest named by the profile does not exist in the workspace.
    #[error("Manifest not found: {}", path.display())]
    ManifestNotFound { path: PathBuf },

    /// An exclusion could not be removed from the workspace.
    #[error("Prune error for {}: {message}", path.display())]
    Prune { path: PathBuf, message: String },

    /// A version-control command failed.
    ///
    /// Includes the git subcommand and its stderr, plus an optional hint for
    /// common causes such as missing credentials.
    #[error("Version control command failed: git {command} - {stderr}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    VersionControl {
        command: String,
        stderr: String,
        hint: Option<String>,
    },

    /// The remote branch moved between preflight and push.
    #[error("Push rejected for {url} ({branch}): remote tip is no longer {}", expected.as_deref().unwrap_or("absent"))]
    LeaseRejected {
        url: String,
        branch: String,
        expected: Option<String>,
    },

    /// The workspace could not be removed.
    #[error("Cleanup error for {}: {message}", path.display())]
    Cleanup { path: PathBuf, message: String },

    /// The publish profile is invalid or could not be loaded.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Config {
        message: String,
        hint: Option<String>,
    },

    /// A pipeline stage failed; wraps the underlying cause.
    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON parsing error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A semantic versioning parsing error, wrapped from `semver::Error`.
    #[error("Semver parsing error: {0}")]
    Semver(#[from] semver::Error),
}

impl Error {
    /// Attach the failing pipeline stage to this error.
    ///
    /// Errors that already carry a stage are returned unchanged so the
    /// innermost stage wins.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            Error::Stage { .. } => self,
            other => Error::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The stage this error was attributed to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
