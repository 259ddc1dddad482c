//! The stages of a publish run.
//!
//! ## Overview
//!
//! A run moves through these stages, each operating on the staged workspace
//! in place:
//! 1. Staging - Copy the source tree into a fresh workspace ([`crate::workspace`])
//! 2. Filtering - Remove marker lines and the line after each ([`filter`])
//! 3. Rewriting - Replace internal dependency declarations in the manifest ([`rewrite`])
//! 4. Pruning - Delete paths that must never be published ([`prune`])
//! 5. Commit and push - Record the workspace as a single commit and replace
//!    the target branch with it ([`orchestrator`])
//! 6. Cleanup - Remove the workspace
//!
//! The order is fixed. Pruning runs last among the transforms so that excluded
//! files can never influence what the filter or rewriter produce.

pub mod filter;
pub mod orchestrator;
pub mod prune;
pub mod rewrite;
