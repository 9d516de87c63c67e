use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};

/// Lists files changed between local refs, to seed primary files
pub struct GitAnalyzer {
    repo_path: PathBuf,
}

/// Information about a changed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path relative to the repository root, `/`-separated
    pub path: String,
    pub status: ChangeStatus,
}

/// Type of change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl ChangeStatus {
    pub fn from_git_status(status: &str) -> Option<Self> {
        match status.chars().next()? {
            'A' => Some(ChangeStatus::Added),
            'M' => Some(ChangeStatus::Modified),
            'D' => Some(ChangeStatus::Deleted),
            'R' => Some(ChangeStatus::Renamed),
            '?' => Some(ChangeStatus::Added), // Untracked
            _ => Some(ChangeStatus::Modified),
        }
    }
}

impl GitAnalyzer {
    pub fn new(repo_path: impl AsRef<Path>) -> Result<Self> {
        let repo_path = repo_path.as_ref().to_path_buf();

        // Verify it's a git repository
        let output = Command::new("git")
            .args(["rev-parse", "--is-inside-work-tree"])
            .current_dir(&repo_path)
            .output()
            .map_err(|e| AuditError::Git(format!("Failed to run git: {}", e)))?;

        if !output.status.success() {
            return Err(AuditError::Git(format!(
                "{} is not a git repository",
                repo_path.display()
            )));
        }

        Ok(Self { repo_path })
    }

    /// Files changed between `base` and `head`, or between `base` and the
    /// working tree when `head` is `None`.
    pub fn changed_files(&self, base: &str, head: Option<&str>) -> Result<Vec<ChangedFile>> {
        let mut args = vec!["diff", "--name-status", base];
        if let Some(head) = head {
            args.push(head);
        }

        let output = Command::new("git")
            .args(&args)
            .current_dir(&self.repo_path)
            .output()
            .map_err(|e| AuditError::Git(format!("Failed to run git diff: {}", e)))?;

        if !output.status.success() {
            return Err(AuditError::Git(format!(
                "git diff {} failed: {}",
                args[2..].join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for line in stdout.lines() {
            if let Some((status, path)) = Self::parse_diff_line(line) {
                if seen.insert(path.clone()) {
                    files.push(ChangedFile { path, status });
                }
            }
        }

        tracing::debug!("git reports {} changed files since {}", files.len(), base);
        Ok(files)
    }

    /// Changed files that still exist, relative to the repository root
    pub fn changed_paths(&self, base: &str, head: Option<&str>) -> Result<Vec<PathBuf>> {
        Ok(self
            .changed_files(base, head)?
            .into_iter()
            .filter(|f| f.status != ChangeStatus::Deleted)
            .map(|f| PathBuf::from(f.path))
            .filter(|p| self.repo_path.join(p).is_file())
            .collect())
    }

    fn parse_diff_line(line: &str) -> Option<(ChangeStatus, String)> {
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() >= 2 {
            let status = ChangeStatus::from_git_status(parts[0].trim())?;
            let path = parts.last()?.trim().to_string();
            if path.is_empty() {
                return None;
            }
            Some((status, path))
        } else {
            None
        }
    }
}
