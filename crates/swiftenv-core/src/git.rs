//! Publishing catalog changes through version control.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to run git {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {command} exited with {status}")]
    Failed { command: String, status: String },
}

/// Records catalog changes in a history and publishes them.
pub trait VersionControl {
    /// Stage `path` and commit it on its own with `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if staging or committing fails.
    fn commit(&self, path: &Path, message: &str) -> Result<(), GitError>;

    /// Publish committed changes to the remote.
    ///
    /// # Errors
    ///
    /// Returns an error if the push fails.
    fn push(&self) -> Result<(), GitError>;
}

impl<T: VersionControl + ?Sized> VersionControl for &T {
    fn commit(&self, path: &Path, message: &str) -> Result<(), GitError> {
        (**self).commit(path, message)
    }

    fn push(&self) -> Result<(), GitError> {
        (**self).push()
    }
}

/// The `git` executable, run inside the catalog's working tree.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
    remote: String,
    branch: String,
}

impl Git {
    /// Default remote pushed to after new versions were committed.
    pub const DEFAULT_REMOTE: &'static str = "origin";
    /// Default branch pushed to after new versions were committed.
    pub const DEFAULT_BRANCH: &'static str = "master";

    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            remote: Self::DEFAULT_REMOTE.to_string(),
            branch: Self::DEFAULT_BRANCH.to_string(),
        }
    }

    pub fn with_remote(mut self, remote: impl Into<String>, branch: impl Into<String>) -> Self {
        self.remote = remote.into();
        self.branch = branch.into();
        self
    }

    fn run(&self, args: &[&str]) -> Result<(), GitError> {
        let command = args.join(" ");
        debug!(%command, workdir = %self.workdir.display(), "running git");

        let status = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .status()
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(GitError::Failed {
                command,
                status: status.to_string(),
            })
        }
    }
}

impl VersionControl for Git {
    fn commit(&self, path: &Path, message: &str) -> Result<(), GitError> {
        let path = path.strip_prefix(&self.workdir).unwrap_or(path);
        let path = path.to_string_lossy();
        self.run(&["add", "--", &path])?;
        self.run(&["commit", "-m", message, "--", &path])
    }

    fn push(&self) -> Result<(), GitError> {
        self.run(&["push", &self.remote, &self.branch])
    }
}

/// Version control that does nothing, for runs that neither commit nor push.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVersionControl;

impl VersionControl for NoVersionControl {
    fn commit(&self, _: &Path, _: &str) -> Result<(), GitError> {
        Ok(())
    }

    fn push(&self) -> Result<(), GitError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_failed_command_reports_status() {
        // Not a repository, so any git command fails (or git is absent).
        let temp = TempDir::new().unwrap();
        let git = Git::new(temp.path());
        let err = git.commit(&temp.path().join("versions/3/3.0.1.yaml"), "chore: Add 3.0.1");
        assert!(err.is_err());
    }

    #[test]
    fn test_with_remote_overrides_defaults() {
        let git = Git::new(".").with_remote("upstream", "main");
        assert_eq!(git.remote, "upstream");
        assert_eq!(git.branch, "main");
    }
}
