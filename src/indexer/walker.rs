use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use walkdir::WalkDir;

use crate::error::{AuditError, Result};

/// Lists candidate primary files under a workspace root
pub struct FileWalker {
    respect_gitignore: bool,
}

impl FileWalker {
    pub fn new(respect_gitignore: bool) -> Self {
        Self { respect_gitignore }
    }

    /// Every regular file under `root`, in directory order (entries sorted
    /// by name within each directory)
    pub fn walk(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(AuditError::InvalidWorkspace(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        if self.respect_gitignore {
            Ok(self.walk_ignoring(root))
        } else {
            Ok(self.walk_all(root))
        }
    }

    fn walk_all(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                Ok(_) => {}
                Err(e) => tracing::warn!("Skipping unreadable entry: {}", e),
            }
        }

        files
    }

    fn walk_ignoring(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .ignore(true)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker.flatten() {
            let path = entry.path();
            if path.is_file() {
                files.push(path.to_path_buf());
            }
        }

        files
    }
}

impl Default for FileWalker {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| {
                f.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_walk_recursive_in_order() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "b.sol", "");
        create_file(temp_dir.path(), "a/z.sol", "");
        create_file(temp_dir.path(), "a/deep/y.rs", "");
        create_file(temp_dir.path(), "README.md", "# Readme");

        let files = FileWalker::default().walk(temp_dir.path()).unwrap();

        assert_eq!(
            names(temp_dir.path(), &files),
            vec!["README.md", "a/deep/y.rs", "a/z.sol", "b.sol"]
        );
    }

    #[test]
    fn test_walk_includes_hidden_files_by_default() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), ".hidden.sol", "");
        create_file(temp_dir.path(), "visible.sol", "");

        let files = FileWalker::default().walk(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_walk_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let files = FileWalker::default().walk(temp_dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_walk_missing_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileWalker::default().walk(&temp_dir.path().join("nope"));
        assert!(matches!(result, Err(AuditError::InvalidWorkspace(_))));
    }

    #[test]
    fn test_walk_respects_gitignore() {
        let temp_dir = TempDir::new().unwrap();

        // Initialize git repo so .gitignore is respected
        std::process::Command::new("git")
            .args(["init"])
            .current_dir(temp_dir.path())
            .output()
            .ok();

        create_file(temp_dir.path(), ".gitignore", "out/\n");
        create_file(temp_dir.path(), "src/Token.sol", "");
        create_file(temp_dir.path(), "out/Token.sol", "");

        let files = FileWalker::new(true).walk(temp_dir.path()).unwrap();

        let main_found = files.iter().any(|f| f.ends_with("src/Token.sol"));
        assert!(main_found, "src/Token.sol should be found");
        assert!(files.iter().all(|f| !f.ends_with(".gitignore")));
    }
}
