//! Exclusion pruning: delete paths that must never be published.
//!
//! Runs after filtering and rewriting. Each entry is removed whether it is a
//! file, a symlink or a directory; entries that are already absent are
//! skipped, so pruning can be repeated safely.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Error, Result};

/// Which exclusions were present and removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub removed: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

/// Remove every path in `exclusions` from `root`.
pub fn execute(root: &Path, exclusions: &[PathBuf]) -> Result<PruneReport> {
    let mut report = PruneReport::default();

    for relative in exclusions {
        let path = root.join(relative);

        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{}: already absent", relative.display());
                report.missing.push(relative.clone());
                continue;
            }
            Err(e) => {
                return Err(Error::Prune {
                    path: relative.clone(),
                    message: e.to_string(),
                })
            }
        };

        let removed = if metadata.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };

        match removed {
            Ok(()) => {
                debug!("{}: removed", relative.display());
                report.removed.push(relative.clone());
            }
            Err(e) if e.kind() == ErrorKind::NotFound => report.missing.push(relative.clone()),
            Err(e) => {
                return Err(Error::Prune {
                    path: relative.clone(),
                    message: e.to_string(),
                })
            }
        }
    }

    info!(
        "Pruned {} paths ({} already absent)",
        report.removed.len(),
        report.missing.len()
    );
    Ok(report)
}
