//! Workspace root handling.
//!
//! Every path the analyzer reports or filters is expressed against the
//! workspace root: symlinks are resolved, separators are normalized to `/`
//! and the macOS `/private` prefix on temp directories is dropped, so that
//! globs written against repository-relative paths behave the same
//! everywhere.

pub mod detector;

pub use detector::{WorkspaceDetector, PACKAGE_MANIFEST};

use std::path::{Component, Path, PathBuf};

use crate::error::{AuditError, Result};

/// Path segments that mark a shared temp directory when a file cannot be
/// expressed relative to the workspace root.
const TEMP_ANCHORS: &[&str] = &["tmp", "Temp", "var"];

/// A local checkout under analysis
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    root_normalized: String,
}

impl Workspace {
    /// Opens a workspace rooted at `root`, which must be an existing directory
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(AuditError::InvalidWorkspace(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let root = canonical(root);
        let root_normalized = normalize_path(&root);
        Ok(Self {
            root,
            root_normalized,
        })
    }

    /// Canonical absolute root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins relative paths onto the root; absolute paths pass through
    pub fn absolutize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Workspace-relative, forward-slash form of `path`.
    ///
    /// Falls back to the suffix after a shared temp-directory anchor, and
    /// finally to the normalized absolute path.
    pub fn relative_path(&self, path: &Path) -> String {
        let normalized = normalize_path(&self.absolutize(path));

        if let Ok(rel) = Path::new(&normalized).strip_prefix(&self.root_normalized) {
            return rel.to_string_lossy().replace('\\', "/");
        }

        relative_by_temp_anchor(&self.root_normalized, &normalized).unwrap_or(normalized)
    }

    /// Normalized absolute form of `path`, resolved against the root
    pub fn normalized(&self, path: &Path) -> String {
        normalize_path(&self.absolutize(path))
    }
}

/// Resolves symlinks when the path exists, otherwise cleans it lexically.
///
/// Used for every path stored in visited sets and results, so that the
/// same file reached through different spellings compares equal.
pub fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| clean_path(&make_absolute(path)))
}

/// String form of `path` with symlinks resolved, `/` separators and the
/// `/private` temp prefix removed.
pub fn normalize_path(path: &Path) -> String {
    let resolved = canonical(path);
    let mut normalized = resolved.to_string_lossy().replace('\\', "/");

    if let Some(rest) = normalized.strip_prefix("//?/") {
        normalized = rest.to_string();
    }
    if let Some(rest) = normalized.strip_prefix("/private/") {
        normalized = format!("/{}", rest);
    }

    normalized
}

fn make_absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// Removes `.` and folds `..` without touching the filesystem
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn relative_by_temp_anchor(root: &str, file: &str) -> Option<String> {
    let root_parts: Vec<&str> = root.split('/').collect();
    let file_parts: Vec<&str> = file.split('/').collect();

    let anchor = root_parts
        .iter()
        .zip(file_parts.iter())
        .position(|(r, f)| r == f && TEMP_ANCHORS.contains(r))?;

    Some(file_parts[anchor + 1..].join("/"))
}
