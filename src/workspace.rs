//! # Workspace Staging
//!
//! A [`Workspace`] is the exclusively-owned scratch copy a publish run mutates
//! and finally commits. It is backed by a [`tempfile::TempDir`] whose name
//! carries a random suffix, so concurrent runs never share a directory, and
//! whose `Drop` removes the tree on every exit path, including panics and
//! early returns.
//!
//! [`stage`] creates the workspace under an injected base directory and copies
//! the source tree into it, skipping excluded directory names at any depth.
//! `.git` entries are never copied, so the published history starts empty.
//! Relative structure and file contents are preserved exactly. On Unix the
//! file mode is preserved, with owner-write added so later stages can rewrite
//! files in place (git only records the executable bit). Symlinks are copied
//! as symlinks.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::defaults::WORKSPACE_PREFIX;

const GIT_DIR: &str = ".git";
use crate::error::{Error, Result};

/// What staging copied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageReport {
    pub files: usize,
    pub bytes: u64,
    pub skipped_dirs: usize,
}

/// The staged copy of a source tree for one publish run.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    report: StageReport,
}

impl Workspace {
    /// Root directory of the workspace.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn report(&self) -> StageReport {
        self.report
    }

    /// Recursively delete the workspace, reporting any failure.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(|e| Error::Cleanup {
            path,
            message: e.to_string(),
        })
    }

    /// Detach the directory from automatic cleanup and return its path.
    pub fn keep(self) -> PathBuf {
        self.dir.keep()
    }
}

/// Create a fresh workspace under `temp_base` and copy `source` into it.
pub fn stage(source: &Path, temp_base: &Path, exclude_dirs: &[String]) -> Result<Workspace> {
    let metadata = fs::metadata(source).map_err(|e| Error::Staging {
        message: format!("source tree {} is not accessible: {}", source.display(), e),
    })?;
    if !metadata.is_dir() {
        return Err(Error::Staging {
            message: format!("source tree {} is not a directory", source.display()),
        });
    }

    fs::create_dir_all(temp_base).map_err(|e| Error::Staging {
        message: format!(
            "cannot create workspace base {}: {}",
            temp_base.display(),
            e
        ),
    })?;

    let dir = tempfile::Builder::new()
        .prefix(WORKSPACE_PREFIX)
        .tempdir_in(temp_base)
        .map_err(|e| Error::Staging {
            message: format!(
                "cannot create workspace under {}: {}",
                temp_base.display(),
                e
            ),
        })?;

    info!("Staging {} into {}", source.display(), dir.path().display());

    // On failure `dir` is dropped here, which removes the partial copy.
    let report = copy_tree(source, dir.path(), exclude_dirs)?;

    debug!(
        "Staged {} files ({} bytes), skipped {} directories",
        report.files, report.bytes, report.skipped_dirs
    );

    Ok(Workspace { dir, report })
}

fn copy_tree(source: &Path, dest: &Path, exclude_dirs: &[String]) -> Result<StageReport> {
    let mut report = StageReport::default();
    let mut skipped_dirs = 0;

    let walker = WalkDir::new(source)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 {
                return true;
            }
            // The source's own repository, or a gitlink file, would turn the
            // workspace into a checkout of the internal history.
            if e.file_name() == GIT_DIR {
                debug!("Skipping {}", e.path().display());
                return false;
            }
            if !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_str().unwrap_or("");
            let excluded = exclude_dirs.iter().any(|d| d == name);
            if excluded {
                skipped_dirs += 1;
            }
            !excluded
        });

    for entry in walker {
        let entry = entry.map_err(|e| Error::Staging {
            message: format!("cannot read source tree: {}", e),
        })?;
        if entry.depth() == 0 {
            continue;
        }

        let relative = entry.path().strip_prefix(source).map_err(|_| Error::Staging {
            message: format!("path escapes source tree: {}", entry.path().display()),
        })?;
        let target = dest.join(relative);
        let file_type = entry.file_type();

        let copied = if file_type.is_dir() {
            fs::create_dir_all(&target)
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)
        } else {
            copy_file(entry.path(), &target).map(|bytes| {
                report.files += 1;
                report.bytes += bytes;
            })
        };

        copied.map_err(|e| Error::Staging {
            message: format!("cannot copy {}: {}", relative.display(), e),
        })?;
    }

    report.skipped_dirs = skipped_dirs;
    Ok(report)
}

fn copy_file(from: &Path, to: &Path) -> io::Result<u64> {
    let bytes = fs::copy(from, to)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(to)?.permissions();
        if perms.mode() & 0o200 == 0 {
            perms.set_mode(perms.mode() | 0o200);
            fs::set_permissions(to, perms)?;
        }
    }

    Ok(bytes)
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    let link = fs::read_link(from)?;
    std::os::unix::fs::symlink(link, to)
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to).map(|_| ())
}
