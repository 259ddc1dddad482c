//! Marker filtering: strip internal-only lines from every staged file.
//!
//! A line containing the marker token is removed together with the line that
//! follows it. The following line is consumed without being inspected, so two
//! consecutive marker lines remove each other and never chain further. A
//! marker on the last line removes only itself and is reported as dangling.
//!
//! Lines keep their original terminators (`\n` or `\r\n`), and a file whose
//! last retained line had no terminator still has none. Files without a marker
//! are never rewritten, which keeps them byte-identical.

use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Result of filtering one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredText {
    pub text: String,
    pub markers: usize,
    pub lines_removed: usize,
    /// The last marker had no line after it.
    pub dangling: bool,
}

/// Totals for a filtered tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub lines_removed: usize,
    pub dangling_markers: usize,
}

/// Filter a single text. Returns `None` when the marker does not occur.
pub fn filter_text(content: &str, marker: &str) -> Option<FilteredText> {
    if !content.contains(marker) {
        return None;
    }

    let mut text = String::with_capacity(content.len());
    let mut markers = 0;
    let mut lines_removed = 0;
    let mut skip_next = false;

    for line in content.split_inclusive('\n') {
        if skip_next {
            skip_next = false;
            lines_removed += 1;
        } else if line.contains(marker) {
            markers += 1;
            lines_removed += 1;
            skip_next = true;
        } else {
            text.push_str(line);
        }
    }

    Some(FilteredText {
        text,
        markers,
        lines_removed,
        dangling: skip_next,
    })
}

/// Filter every regular file under `root` in place.
///
/// Symlinks are not followed. A file that contains the marker but is not
/// valid UTF-8 is a [`Error::Filter`]; files without the marker are left
/// untouched whatever their encoding.
pub fn execute(root: &Path, marker: &str) -> Result<FilterReport> {
    let mut report = FilterReport::default();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Filter {
            path: e.path().unwrap_or(root).to_path_buf(),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        report.files_scanned += 1;

        let bytes = fs::read(path).map_err(|e| Error::Filter {
            path: relative.to_path_buf(),
            message: e.to_string(),
        })?;
        if !contains_bytes(&bytes, marker.as_bytes()) {
            continue;
        }

        let content = String::from_utf8(bytes).map_err(|e| Error::Filter {
            path: relative.to_path_buf(),
            message: format!("contains the marker but is not valid UTF-8: {}", e),
        })?;

        let Some(filtered) = filter_text(&content, marker) else {
            continue;
        };

        if filtered.dangling {
            warn!(
                "{}: marker on the last line has no following line to remove",
                relative.display()
            );
            report.dangling_markers += 1;
        }

        fs::write(path, filtered.text.as_bytes()).map_err(|e| Error::Filter {
            path: relative.to_path_buf(),
            message: format!("cannot write filtered content: {}", e),
        })?;

        debug!(
            "{}: removed {} lines ({} markers)",
            relative.display(),
            filtered.lines_removed,
            filtered.markers
        );
        report.files_changed += 1;
        report.lines_removed += filtered.lines_removed;
    }

    info!(
        "Filtered {} files, {} changed, {} lines removed",
        report.files_scanned, report.files_changed, report.lines_removed
    );
    Ok(report)
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}
