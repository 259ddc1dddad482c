//! # Version Control
//!
//! The pipeline needs four capabilities from version control: create a fresh
//! repository, commit everything in it, look up a remote branch tip, and
//! replace a remote branch with the local commit. They are expressed by the
//! [`VersionControl`] trait so the orchestrator can be exercised with mock
//! implementations in tests.
//!
//! [`GitCli`] is the real implementation. It shells out to the system `git`,
//! which automatically picks up:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Personal access tokens
//! - Any configuration in ~/.gitconfig

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Output};

use log::debug;

use crate::config::Author;
use crate::error::{Error, Result};

/// How a push treats the current remote branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushMode {
    /// Replace the branch unconditionally.
    Force,
    /// Replace the branch only if its tip is still `expected`
    /// (`None`: only if the branch does not exist).
    Lease { expected: Option<String> },
}

/// Trait for version-control operations - allows mocking in tests
pub trait VersionControl {
    /// Whether the tool can be invoked at all.
    fn is_available(&self) -> bool;

    /// Create an empty repository in `dir`.
    fn init(&self, dir: &Path) -> Result<()>;

    /// Stage every file in `dir` and create one commit, returning its id.
    fn commit_all(&self, dir: &Path, message: &str, author: Option<&Author>) -> Result<String>;

    /// Current tip of `branch` at `url`, or `None` when the branch is absent.
    fn remote_tip(&self, url: &str, branch: &str) -> Result<Option<String>>;

    /// Point `branch` at `url` to the commit checked out in `dir`, discarding
    /// whatever history the branch had.
    fn push(&self, dir: &Path, url: &str, branch: &str, mode: &PushMode) -> Result<()>;
}

/// `VersionControl` backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: OsString,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: OsString::from("git"),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific git executable.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, dir: Option<&Path>) -> Command {
        let mut cmd = Command::new(&self.program);
        // Inherited repository overrides (e.g. from a git hook) would redirect
        // every command away from the workspace.
        cmd.env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .env_remove("GIT_INDEX_FILE");
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn run(&self, mut cmd: Command, name: &str) -> Result<Output> {
        debug!("Running git {}", name);
        let output = cmd.output().map_err(|e| Error::VersionControl {
            command: name.to_string(),
            stderr: e.to_string(),
            hint: Some("is git installed and on PATH?".to_string()),
        })?;

        if !output.status.success() {
            let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            // Some failures, like `commit` with nothing to commit, only explain
            // themselves on stdout.
            if stderr.is_empty() {
                stderr = String::from_utf8_lossy(&output.stdout).trim().to_string();
            }
            return Err(Error::VersionControl {
                command: name.to_string(),
                hint: auth_hint(&stderr),
                stderr,
            });
        }

        Ok(output)
    }
}

/// Provide a helpful hint for common authentication failures.
fn auth_hint(stderr: &str) -> Option<String> {
    if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
    {
        Some(
            "make sure you have push access to the target repository \
             (SSH key in ssh-agent, credential helper, or personal access token)"
                .to_string(),
        )
    } else {
        None
    }
}

impl VersionControl for GitCli {
    fn is_available(&self) -> bool {
        self.command(None)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn init(&self, dir: &Path) -> Result<()> {
        let mut cmd = self.command(Some(dir));
        cmd.args(["init", "--quiet"]);
        self.run(cmd, "init")?;
        Ok(())
    }

    fn commit_all(&self, dir: &Path, message: &str, author: Option<&Author>) -> Result<String> {
        let mut add = self.command(Some(dir));
        add.args(["add", "--all"]);
        self.run(add, "add")?;

        let mut commit = self.command(Some(dir));
        if let Some(author) = author {
            commit
                .arg("-c")
                .arg(format!("user.name={}", author.name))
                .arg("-c")
                .arg(format!("user.email={}", author.email));
        }
        commit.args(["commit", "--quiet", "-m", message]);
        self.run(commit, "commit")?;

        let mut rev_parse = self.command(Some(dir));
        rev_parse.args(["rev-parse", "HEAD"]);
        let output = self.run(rev_parse, "rev-parse")?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn remote_tip(&self, url: &str, branch: &str) -> Result<Option<String>> {
        let refname = format!("refs/heads/{}", branch);
        let mut cmd = self.command(None);
        cmd.args(["ls-remote", url, &refname]);
        let output = self.run(cmd, "ls-remote")?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_ls_remote(&stdout, &refname))
    }

    fn push(&self, dir: &Path, url: &str, branch: &str, mode: &PushMode) -> Result<()> {
        let refspec = format!("HEAD:refs/heads/{}", branch);
        let mut cmd = self.command(Some(dir));
        cmd.arg("push");
        match mode {
            PushMode::Force => {
                cmd.arg("--force");
            }
            PushMode::Lease { expected } => {
                cmd.arg(format!(
                    "--force-with-lease=refs/heads/{}:{}",
                    branch,
                    expected.as_deref().unwrap_or("")
                ));
            }
        }
        cmd.arg(url).arg(&refspec);

        let result = self.run(cmd, "push");
        if let (Err(Error::VersionControl { stderr, .. }), PushMode::Lease { expected }) =
            (&result, mode)
        {
            if stderr.contains("stale info") {
                return Err(Error::LeaseRejected {
                    url: url.to_string(),
                    branch: branch.to_string(),
                    expected: expected.clone(),
                });
            }
        }
        result.map(|_| ())
    }
}

/// Find the object id for `refname` in `git ls-remote` output.
///
/// Each line has the form `<hash>\t<ref>`.
fn parse_ls_remote(stdout: &str, refname: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let (hash, name) = line.split_once('\t')?;
        (name.trim() == refname).then(|| hash.trim().to_string())
    })
}
