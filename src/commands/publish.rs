//! Publish command implementation
//!
//! Runs the full pipeline:
//! 1. Preflight checks (git available, source readable, remote tip for the lease)
//! 2. Staging the source tree into a fresh workspace
//! 3. Marker filtering, manifest rewriting and exclusion pruning
//! 4. Committing the workspace as a single commit
//! 5. Replacing the target branch with that commit
//! 6. Removing the workspace

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

use publish_example::config::{Profile, PushPolicy};
use publish_example::defaults::default_temp_base;
use publish_example::output::{OutputConfig, Symbol};
use publish_example::phases::orchestrator::{PublishRun, RunOptions};
use publish_example::vcs::GitCli;

/// Arguments for the publish command
#[derive(Args, Debug, Default)]
pub struct PublishArgs {
    /// Path to the publish profile
    #[arg(short, long, value_name = "FILE", env = "PUBLISH_EXAMPLE_PROFILE")]
    pub profile: Option<PathBuf>,

    /// Override the source tree to publish
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Override the target repository URL
    #[arg(long, value_name = "URL")]
    pub target_url: Option<String>,

    /// Override the target branch
    #[arg(long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Directory to create the temporary workspace in
    #[arg(long, value_name = "DIR", env = "PUBLISH_EXAMPLE_TMPDIR")]
    pub temp_dir: Option<PathBuf>,

    /// Replace the target branch even if it changed since the run started
    #[arg(long)]
    pub force: bool,

    /// Stage and transform only; do not commit or push
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Keep the workspace on disk and print its path
    #[arg(long)]
    pub keep_workspace: bool,
}

impl PublishArgs {
    fn apply_overrides(&self, profile: &mut Profile) {
        if let Some(source) = &self.source {
            profile.source = source.clone();
        }
        if let Some(url) = &self.target_url {
            profile.target.url = url.clone();
        }
        if let Some(branch) = &self.branch {
            profile.target.branch = branch.clone();
        }
        if self.force {
            profile.target.push = PushPolicy::Force;
        }
    }
}

/// Execute the publish command
pub fn execute(args: PublishArgs, output: &OutputConfig) -> Result<()> {
    let start_time = Instant::now();

    let mut profile = super::load_profile(args.profile.as_deref())?;
    args.apply_overrides(&mut profile);
    profile.validate()?;

    output.status(
        Symbol::Start,
        format!(
            "Publishing {} to {} ({})",
            profile.source.display(),
            profile.target.url,
            profile.target.branch
        ),
    );
    if args.dry_run {
        output.status(Symbol::DryRun, "DRY RUN MODE - nothing will be committed or pushed");
    }

    let options = RunOptions {
        temp_base: args.temp_dir.clone().unwrap_or_else(default_temp_base),
        dry_run: args.dry_run,
        keep_workspace: args.keep_workspace,
    };

    let git = GitCli::new();
    let mut run = PublishRun::new(&profile, &git, options);

    match run.execute() {
        Ok(report) => {
            let duration = start_time.elapsed();
            match &report.commit {
                Some(commit) => output.status(
                    Symbol::Success,
                    format!("Published {} in {:.2}s", commit, duration.as_secs_f64()),
                ),
                None => output.status(
                    Symbol::Success,
                    format!("Dry run complete in {:.2}s", duration.as_secs_f64()),
                ),
            }
            output.detail(format!("{} files staged", report.staged.files));
            output.detail(format!(
                "{} lines removed from {} files",
                report.filter.lines_removed, report.filter.files_changed
            ));
            if report.filter.dangling_markers > 0 {
                output.status(
                    Symbol::Warning,
                    format!(
                        "{} marker(s) on a last line had nothing to remove",
                        report.filter.dangling_markers
                    ),
                );
            }
            output.detail(format!(
                "{} of {} rewrite rules applied",
                report.rewrite.rules_applied(),
                profile.manifest.rules.len()
            ));
            output.detail(format!("{} paths pruned", report.prune.removed.len()));
            if let Some(path) = &report.kept_workspace {
                output.status(Symbol::Info, format!("Workspace kept at {}", path.display()));
            }
            Ok(())
        }
        Err(e) => {
            output.status(Symbol::Failure, "Publish failed");
            if let Some(path) = run.kept_workspace() {
                output.status(Symbol::Info, format!("Workspace kept at {}", path.display()));
            }
            Err(e.into())
        }
    }
}
