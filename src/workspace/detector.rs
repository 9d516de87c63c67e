//! Package root detection.

use std::path::{Path, PathBuf};

/// Marker file that makes a directory a package (crate) root
pub const PACKAGE_MANIFEST: &str = "Cargo.toml";

/// Locates package roots for module-path resolution
pub struct WorkspaceDetector;

impl WorkspaceDetector {
    /// Check whether `dir` holds a package manifest
    pub fn is_package_root(dir: &Path) -> bool {
        dir.join(PACKAGE_MANIFEST).is_file()
    }

    /// Nearest ancestor of `file` (inside `workspace_root`) holding a package
    /// manifest, or `workspace_root` when there is none.
    pub fn find_package_root(file: &Path, workspace_root: &Path) -> PathBuf {
        let mut current = file.parent();

        while let Some(dir) = current {
            if Self::is_package_root(dir) {
                return dir.to_path_buf();
            }
            if dir == workspace_root || !dir.starts_with(workspace_root) {
                break;
            }
            current = dir.parent();
        }

        workspace_root.to_path_buf()
    }

    /// Directories that `crate::` paths are resolved from, in order.
    ///
    /// The package root comes first, then its `src/` directory when one
    /// exists.
    pub fn crate_roots(file: &Path, workspace_root: &Path) -> Vec<PathBuf> {
        let package_root = Self::find_package_root(file, workspace_root);
        let src = package_root.join("src");

        if src.is_dir() {
            vec![package_root, src]
        } else {
            vec![package_root]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn root_of(temp_dir: &TempDir) -> PathBuf {
        fs::canonicalize(temp_dir.path()).unwrap()
    }

    #[test]
    fn test_find_package_root_nested_crate() {
        let temp_dir = TempDir::new().unwrap();
        let root = root_of(&temp_dir);
        fs::create_dir_all(root.join("crates/core/src/util")).unwrap();
        fs::write(root.join("crates/core/Cargo.toml"), "[package]\nname = \"core\"\n").unwrap();

        let file = root.join("crates/core/src/util/mod.rs");
        assert_eq!(
            WorkspaceDetector::find_package_root(&file, &root),
            root.join("crates/core")
        );
    }

    #[test]
    fn test_find_package_root_falls_back_to_workspace() {
        let temp_dir = TempDir::new().unwrap();
        let root = root_of(&temp_dir);
        fs::create_dir_all(root.join("src")).unwrap();

        let file = root.join("src/lib.rs");
        assert_eq!(WorkspaceDetector::find_package_root(&file, &root), root);
    }

    #[test]
    fn test_crate_roots_package_root_first() {
        let temp_dir = TempDir::new().unwrap();
        let root = root_of(&temp_dir);
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("Cargo.toml"), "[package]\nname = \"app\"\n").unwrap();

        assert_eq!(
            WorkspaceDetector::crate_roots(&root.join("src/main.rs"), &root),
            vec![root.clone(), root.join("src")]
        );
    }

    #[test]
    fn test_crate_roots_without_src_dir() {
        let temp_dir = TempDir::new().unwrap();
        let root = root_of(&temp_dir);
        fs::write(root.join("Cargo.toml"), "[package]\nname = \"app\"\n").unwrap();

        assert_eq!(
            WorkspaceDetector::crate_roots(&root.join("main.rs"), &root),
            vec![root]
        );
    }
}
