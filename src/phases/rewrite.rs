//! Manifest rewriting: swap internal dependency declarations for published
//! ones.
//!
//! Rules are literal substring substitutions applied in profile order, each
//! replacing every occurrence of its pattern in the output of the previous
//! rule. A pattern that does not occur is skipped. The manifest is never
//! parsed, so the result is not checked for well-formedness.

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::config::RewriteRule;
use crate::error::{Error, Result};

/// How often each rule matched, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub replacements: Vec<usize>,
}

impl RewriteReport {
    /// Number of rules that matched at least once.
    pub fn rules_applied(&self) -> usize {
        self.replacements.iter().filter(|n| **n > 0).count()
    }

    pub fn total_replacements(&self) -> usize {
        self.replacements.iter().sum()
    }
}

/// Apply `rules` to `content`, returning the new text and per-rule counts.
pub fn apply_rules(content: &str, rules: &[RewriteRule]) -> (String, RewriteReport) {
    let mut text = content.to_string();
    let mut report = RewriteReport::default();

    for rule in rules {
        let count = text.matches(rule.pattern.as_str()).count();
        if count > 0 {
            text = text.replace(rule.pattern.as_str(), &rule.replacement);
        }
        report.replacements.push(count);
    }

    (text, report)
}

/// Rewrite the manifest at `root/manifest` in place.
///
/// A missing manifest is [`Error::ManifestNotFound`]. The file is only
/// written when at least one rule matched.
pub fn execute(root: &Path, manifest: &Path, rules: &[RewriteRule]) -> Result<RewriteReport> {
    let path = root.join(manifest);
    if !path.is_file() {
        return Err(Error::ManifestNotFound { path });
    }

    let content = fs::read_to_string(&path)?;
    let (rewritten, report) = apply_rules(&content, rules);

    for (rule, count) in rules.iter().zip(&report.replacements) {
        if *count == 0 {
            debug!("{}: pattern not present: {}", manifest.display(), rule.pattern);
        } else {
            debug!(
                "{}: replaced {} occurrence(s) of {}",
                manifest.display(),
                count,
                rule.pattern
            );
        }
    }

    if rewritten != content {
        fs::write(&path, rewritten)?;
    }

    info!(
        "Rewrote {}: {} of {} rules applied",
        manifest.display(),
        report.rules_applied(),
        rules.len()
    );
    Ok(report)
}
