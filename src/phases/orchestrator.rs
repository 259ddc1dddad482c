//! Orchestrator for a complete publish run
//!
//! A [`PublishRun`] drives the pipeline through a fixed sequence of states:
//!
//! ```text
//! Created -> Staged -> Filtered -> Rewritten -> Pruned -> Committed -> Pushed -> CleanedUp
//! ```
//!
//! Any failure moves the run to `Aborted`, naming the stage that failed. The
//! workspace is torn down on every path out of the run; the one exception is
//! [`RunOptions::keep_workspace`], which hands the directory to the caller
//! for inspection instead. Nothing is retried, and a new run always starts
//! from a fresh workspace.
//!
//! The commit and the push are separate steps. If the process dies between
//! them the commit only ever existed in the (now removed) workspace.
//!
//! With [`PushPolicy::Lease`] the remote tip observed during preflight is the
//! only tip the push may replace, so a concurrent run that landed in between
//! makes this run abort instead of silently overwriting it. With
//! [`PushPolicy::Force`] concurrent runs race and the last push wins.

use std::fs;
use std::path::PathBuf;

use log::{info, warn};

use super::{filter, prune, rewrite};
use crate::config::{Profile, PushPolicy};
use crate::error::{Error, Result, Stage};
use crate::vcs::{PushMode, VersionControl};
use crate::workspace::{self, StageReport, Workspace};

/// Lifecycle of a publish run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Created,
    Staged,
    Filtered,
    Rewritten,
    Pruned,
    Committed,
    Pushed,
    CleanedUp,
    Aborted { stage: Stage },
}

/// Per-invocation knobs that are not part of the profile.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory the workspace is created under.
    pub temp_base: PathBuf,
    /// Stop after pruning: nothing is committed or pushed.
    pub dry_run: bool,
    /// Leave the workspace on disk and report its path.
    pub keep_workspace: bool,
}

impl RunOptions {
    pub fn new(temp_base: impl Into<PathBuf>) -> Self {
        Self {
            temp_base: temp_base.into(),
            dry_run: false,
            keep_workspace: false,
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub staged: StageReport,
    pub filter: filter::FilterReport,
    pub rewrite: rewrite::RewriteReport,
    pub prune: prune::PruneReport,
    /// Remote tip observed before the run, when a lease was taken.
    pub previous_tip: Option<String>,
    /// The published commit; `None` for dry runs.
    pub commit: Option<String>,
    /// Location of the workspace when it was kept.
    pub kept_workspace: Option<PathBuf>,
}

/// One publish run of a profile.
pub struct PublishRun<'a> {
    profile: &'a Profile,
    vcs: &'a dyn VersionControl,
    options: RunOptions,
    history: Vec<RunState>,
    kept_workspace: Option<PathBuf>,
}

impl<'a> PublishRun<'a> {
    pub fn new(profile: &'a Profile, vcs: &'a dyn VersionControl, options: RunOptions) -> Self {
        Self {
            profile,
            vcs,
            options,
            history: vec![RunState::Created],
            kept_workspace: None,
        }
    }

    /// The current state.
    pub fn state(&self) -> RunState {
        *self.history.last().unwrap_or(&RunState::Created)
    }

    /// Every state the run has passed through, in order.
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    /// Workspace left on disk by `keep_workspace`, including after a failure.
    pub fn kept_workspace(&self) -> Option<&PathBuf> {
        self.kept_workspace.as_ref()
    }

    fn advance(&mut self, next: RunState) {
        info!("{:?} -> {:?}", self.state(), next);
        self.history.push(next);
    }

    fn abort(&mut self, error: Error, stage: Stage) -> Error {
        let error = error.in_stage(stage);
        let stage = error.stage().unwrap_or(stage);
        self.advance(RunState::Aborted { stage });
        error
    }

    /// Execute the run to completion.
    ///
    /// Returns the first error, attributed to the stage it happened in, after
    /// the workspace has been torn down.
    pub fn execute(&mut self) -> Result<RunReport> {
        if self.state() != RunState::Created {
            return Err(Error::Config {
                message: "a publish run can only be executed once".to_string(),
                hint: None,
            });
        }

        let mut report = RunReport::default();

        report.previous_tip = self
            .preflight()
            .map_err(|e| self.abort(e, Stage::Preflight))?;

        let workspace = workspace::stage(
            &self.profile.source,
            &self.options.temp_base,
            &self.profile.exclude_dirs,
        )
        .map_err(|e| self.abort(e, Stage::Staging))?;
        report.staged = workspace.report();
        self.advance(RunState::Staged);

        let outcome = self.transform_and_publish(&workspace, &mut report);
        self.finish(workspace, outcome, report)
    }

    /// Checks made before anything is written. Returns the remote tip the
    /// push is allowed to replace when a lease is used.
    fn preflight(&self) -> Result<Option<String>> {
        if !self.vcs.is_available() {
            return Err(Error::VersionControl {
                command: "--version".to_string(),
                stderr: "version control client is not available".to_string(),
                hint: Some("install git and make sure it is on PATH".to_string()),
            });
        }

        let source = &self.profile.source;
        fs::read_dir(source).map_err(|e| Error::Staging {
            message: format!("source tree {} is not readable: {}", source.display(), e),
        })?;

        if self.options.dry_run || self.profile.target.push != PushPolicy::Lease {
            return Ok(None);
        }

        let target = &self.profile.target;
        let tip = self.vcs.remote_tip(&target.url, &target.branch)?;
        info!(
            "Remote {} ({}) is at {}",
            target.url,
            target.branch,
            tip.as_deref().unwrap_or("<absent>")
        );
        Ok(tip)
    }

    fn transform_and_publish(&mut self, workspace: &Workspace, report: &mut RunReport) -> Result<()> {
        let root = workspace.path();
        let profile = self.profile;

        report.filter = filter::execute(root, &profile.marker).map_err(|e| e.in_stage(Stage::Filter))?;
        self.advance(RunState::Filtered);

        report.rewrite = rewrite::execute(root, &profile.manifest.file, &profile.manifest.rules)
            .map_err(|e| e.in_stage(Stage::Rewrite))?;
        self.advance(RunState::Rewritten);

        report.prune = prune::execute(root, &profile.exclude_paths).map_err(|e| e.in_stage(Stage::Prune))?;
        self.advance(RunState::Pruned);

        if self.options.dry_run {
            info!("Dry run: skipping commit and push");
            return Ok(());
        }

        let commit = self
            .vcs
            .init(root)
            .and_then(|()| {
                self.vcs
                    .commit_all(root, &profile.commit_message(), profile.author.as_ref())
            })
            .map_err(|e| e.in_stage(Stage::Commit))?;
        info!("Committed {}", commit);
        report.commit = Some(commit);
        self.advance(RunState::Committed);

        let mode = match profile.target.push {
            PushPolicy::Force => PushMode::Force,
            PushPolicy::Lease => PushMode::Lease {
                expected: report.previous_tip.clone(),
            },
        };
        self.vcs
            .push(root, &profile.target.url, &profile.target.branch, &mode)
            .map_err(|e| e.in_stage(Stage::Push))?;
        info!(
            "Pushed to {} ({})",
            profile.target.url, profile.target.branch
        );
        self.advance(RunState::Pushed);

        Ok(())
    }

    fn finish(
        &mut self,
        workspace: Workspace,
        outcome: Result<()>,
        mut report: RunReport,
    ) -> Result<RunReport> {
        match outcome {
            Ok(()) => {
                if self.options.keep_workspace {
                    let path = workspace.keep();
                    info!("Workspace kept at {}", path.display());
                    self.kept_workspace = Some(path.clone());
                    report.kept_workspace = Some(path);
                    return Ok(report);
                }

                workspace.close().map_err(|e| self.abort(e, Stage::Cleanup))?;
                self.advance(RunState::CleanedUp);
                Ok(report)
            }
            Err(error) => {
                if self.options.keep_workspace {
                    let path = workspace.keep();
                    warn!("Workspace kept for inspection at {}", path.display());
                    self.kept_workspace = Some(path);
                } else if let Err(cleanup) = workspace.close() {
                    warn!("{}", cleanup);
                }

                let stage = error.stage().unwrap_or(Stage::Staging);
                self.advance(RunState::Aborted { stage });
                Err(error)
            }
        }
    }
}

/// Execute a complete publish run of `profile`.
pub fn execute(
    profile: &Profile,
    vcs: &dyn VersionControl,
    options: RunOptions,
) -> Result<RunReport> {
    PublishRun::new(profile, vcs, options).execute()
}
