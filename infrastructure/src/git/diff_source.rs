//! Git diff source using the `git` CLI.
//!
//! Staged changes when no reference is given, otherwise the three-dot diff
//! `<base>...<ref>` (changes on `ref` since it branched from `base`).

use async_trait::async_trait;
use codequorum_application::ports::diff_source::{DiffSource, DiffSourceError};
use std::path::PathBuf;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Default unified diff context
pub const DEFAULT_CONTEXT_LINES: u32 = 10;

/// Preferred base when none is configured; avoids a stale local `main`
const REMOTE_MAIN: &str = "origin/main";
const LOCAL_MAIN: &str = "main";

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("{0}")]
    Failed(String),
}

impl From<GitError> for DiffSourceError {
    fn from(e: GitError) -> Self {
        match e {
            GitError::Spawn(e) => DiffSourceError::Unavailable(e.to_string()),
            GitError::Failed(stderr) => DiffSourceError::Failed(stderr),
        }
    }
}

/// Reads diffs from a local git checkout
#[derive(Debug, Clone)]
pub struct GitDiffSource {
    working_dir: Option<PathBuf>,
    context_lines: u32,
    default_base: Option<String>,
}

impl Default for GitDiffSource {
    fn default() -> Self {
        Self {
            working_dir: None,
            context_lines: DEFAULT_CONTEXT_LINES,
            default_base: None,
        }
    }
}

impl GitDiffSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run git in this directory instead of the current one
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_context_lines(mut self, lines: u32) -> Self {
        self.context_lines = lines;
        self
    }

    /// Base used when a review names none
    pub fn with_default_base(mut self, base: Option<String>) -> Self {
        self.default_base = base;
        self
    }

    fn git(&self) -> Command {
        let mut cmd = Command::new("git");
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd.kill_on_drop(true);
        cmd
    }

    async fn resolves(&self, revision: &str) -> bool {
        self.git()
            .args(["rev-parse", "--verify", "--quiet", revision])
            .output()
            .await
            .is_ok_and(|o| o.status.success())
    }

    /// Explicit base, else the configured one, else `origin/main` when it
    /// exists, else `main`.
    async fn base(&self, base: Option<&str>) -> String {
        if let Some(base) = base.or(self.default_base.as_deref()) {
            return base.to_string();
        }
        if self.resolves(REMOTE_MAIN).await {
            REMOTE_MAIN.to_string()
        } else {
            LOCAL_MAIN.to_string()
        }
    }

    fn diff_args(&self, range: Option<&str>) -> Vec<String> {
        let mut args = vec!["diff".to_string()];
        match range {
            None => {
                args.push("--staged".to_string());
                args.push(format!("-U{}", self.context_lines));
            }
            Some(range) => {
                args.push(format!("-U{}", self.context_lines));
                args.push(range.to_string());
            }
        }
        args
    }

    pub async fn get_diff(
        &self,
        reference: Option<&str>,
        base: Option<&str>,
    ) -> Result<String, GitError> {
        let range = match reference {
            Some(reference) => Some(format!("{}...{}", self.base(base).await, reference)),
            None => None,
        };
        let args = self.diff_args(range.as_deref());
        debug!("Running git {}", args.join(" "));

        let output = self.git().args(&args).output().await?;
        if !output.status.success() {
            return Err(GitError::Failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl DiffSource for GitDiffSource {
    async fn diff(
        &self,
        reference: Option<&str>,
        base: Option<&str>,
    ) -> Result<String, DiffSourceError> {
        Ok(self.get_diff(reference, base).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::process::Command as StdCommand;

    fn git(dir: &Path, args: &[&str]) {
        let status = StdCommand::new("git")
            .args(args)
            .current_dir(dir)
            .env("GIT_AUTHOR_NAME", "Test")
            .env("GIT_AUTHOR_EMAIL", "test@example.com")
            .env("GIT_COMMITTER_NAME", "Test")
            .env("GIT_COMMITTER_EMAIL", "test@example.com")
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    }

    /// Repository on `main` with one commit, or `None` without git
    fn repo() -> Option<tempfile::TempDir> {
        which::which("git").ok()?;
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q", "-b", "main"]);
        std::fs::write(dir.path().join("app.py"), "x = 1\n").unwrap();
        git(dir.path(), &["add", "app.py"]);
        git(dir.path(), &["commit", "-q", "-m", "init"]);
        Some(dir)
    }

    #[test]
    fn test_diff_args() {
        let source = GitDiffSource::new().with_context_lines(3);
        assert_eq!(source.diff_args(None), vec!["diff", "--staged", "-U3"]);
        assert_eq!(
            source.diff_args(Some("main...feature")),
            vec!["diff", "-U3", "main...feature"]
        );
    }

    #[tokio::test]
    async fn test_staged_diff() {
        let Some(dir) = repo() else { return };
        std::fs::write(dir.path().join("app.py"), "x = 2\n").unwrap();
        git(dir.path(), &["add", "app.py"]);

        let diff = GitDiffSource::new()
            .with_working_dir(dir.path())
            .diff(None, None)
            .await
            .unwrap();
        assert!(diff.contains("+++ b/app.py"));
        assert!(diff.contains("+x = 2"));
    }

    #[tokio::test]
    async fn test_branch_diff_falls_back_to_local_main() {
        let Some(dir) = repo() else { return };
        git(dir.path(), &["checkout", "-q", "-b", "feature"]);
        std::fs::write(dir.path().join("new.py"), "y = 1\n").unwrap();
        git(dir.path(), &["add", "new.py"]);
        git(dir.path(), &["commit", "-q", "-m", "feature"]);

        let source = GitDiffSource::new().with_working_dir(dir.path());
        assert_eq!(source.base(None).await, "main");

        let diff = source.diff(Some("feature"), None).await.unwrap();
        assert!(diff.contains("+++ b/new.py"));
    }

    #[tokio::test]
    async fn test_unknown_reference_fails() {
        let Some(dir) = repo() else { return };
        let err = GitDiffSource::new()
            .with_working_dir(dir.path())
            .diff(Some("no-such-branch"), Some("main"))
            .await
            .unwrap_err();
        assert!(matches!(err, DiffSourceError::Failed(_)));
    }

    #[tokio::test]
    async fn test_configured_base_wins() {
        let source = GitDiffSource::new().with_default_base(Some("develop".into()));
        assert_eq!(source.base(None).await, "develop");
        assert_eq!(source.base(Some("release")).await, "release");
    }
}
