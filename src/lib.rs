//! # Publish Example Library
//!
//! This library turns an internal source tree into a publishable example
//! repository. It is designed to be used by the `publish-example`
//! command-line tool but the pipeline can be driven directly as well.
//!
//! ## Quick Example
//!
//! ```
//! use publish_example::config::RewriteRule;
//! use publish_example::phases::{filter, rewrite};
//!
//! let source = "a\n// !publish: remove\nsecret\nb\n";
//! let filtered = filter::filter_text(source, "// !publish: remove").unwrap();
//! assert_eq!(filtered.text, "a\nb\n");
//!
//! let rules = [RewriteRule::new("\"lib\": \"file:..\"", "\"lib\": \"^1.2.0\"")];
//! let (manifest, report) = rewrite::apply_rules("{ \"lib\": \"file:..\" }", &rules);
//! assert_eq!(manifest, "{ \"lib\": \"^1.2.0\" }");
//! assert_eq!(report.rules_applied(), 1);
//! ```
//!
//! ## Core Concepts
//!
//! - **Profile (`config`, `defaults`)**: Everything a run needs: source tree,
//!   excluded directories, marker token, manifest rewrite rules, excluded
//!   paths, and the target repository and branch.
//! - **Workspace (`workspace`)**: A uniquely named temporary copy of the
//!   source tree. It is removed when the run ends, whatever the outcome.
//! - **Phases (`phases`)**: The marker filter, manifest rewriter and exclusion
//!   pruner that mutate the workspace, and the orchestrator that sequences
//!   them and owns failure and cleanup policy.
//! - **Version control (`vcs`)**: The capability interface for init, commit,
//!   remote lookup and branch replacement, with a `git` implementation.
//!
//! ## Execution Flow
//!
//! `phases::orchestrator` runs: preflight, stage, filter, rewrite, prune,
//! commit, push, cleanup. The target branch ends up holding exactly one
//! commit; its previous history is discarded.

pub mod config;
pub mod defaults;
pub mod error;
pub mod output;
pub mod phases;
pub mod vcs;
pub mod version;
pub mod workspace;

#[cfg(test)]
mod filter_proptest;
