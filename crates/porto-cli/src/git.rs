//! Minimal git queries used by the pre-commit hook.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git {args} exited with {status}: {stderr}")]
    Failed {
        args: String,
        status: String,
        stderr: String,
    },
}

/// Read-only view of the working tree's git state.
pub trait GitQueries {
    /// Paths under `pathspecs` that are staged for commit.
    fn staged_paths(&self, pathspecs: &[&str]) -> Result<Vec<String>, GitError>;

    /// Paths under `pathspecs` with unstaged modifications.
    fn modified_paths(&self, pathspecs: &[&str]) -> Result<Vec<String>, GitError>;
}

/// Answers by running `git diff` in the project root.
#[derive(Debug, Clone)]
pub struct ProcessGit {
    root: PathBuf,
}

impl ProcessGit {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn diff_names(&self, cached: bool, pathspecs: &[&str]) -> Result<Vec<String>, GitError> {
        let mut args = vec!["diff"];
        if cached {
            args.push("--cached");
        }
        args.push("--name-only");
        args.push("--");
        args.extend_from_slice(pathspecs);

        let out = Command::new("git")
            .args(&args)
            .current_dir(&self.root)
            .output()?;
        if !out.status.success() {
            return Err(GitError::Failed {
                args: args.join(" "),
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&out.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }
}

impl GitQueries for ProcessGit {
    fn staged_paths(&self, pathspecs: &[&str]) -> Result<Vec<String>, GitError> {
        self.diff_names(true, pathspecs)
    }

    fn modified_paths(&self, pathspecs: &[&str]) -> Result<Vec<String>, GitError> {
        self.diff_names(false, pathspecs)
    }
}

/// True when `answer` reports any path. Git failures count as "nothing" and
/// are logged, so the hook still works outside a repository.
pub fn any_paths(answer: Result<Vec<String>, GitError>, what: &str) -> bool {
    match answer {
        Ok(paths) => !paths.is_empty(),
        Err(e) => {
            tracing::warn!(error = %e, "git query for {what} failed; treating as empty");
            false
        }
    }
}
