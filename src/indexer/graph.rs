//! Depth-first dependency expansion.
//!
//! This is the only place that recurses: extractors produce references,
//! resolvers map them to files, and [`DependencyGraph`] walks the result
//! with a single visited set and depth counter shared by every language.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use crate::languages::LanguageRegistry;
use crate::workspace::{canonical, Workspace};

use super::import_resolver::ImportResolverRegistry;

/// Deepest expansion level; primary files sit at depth 0
pub const MAX_DEPTH: usize = 10;

/// One dependency-graph build
pub struct DependencyGraph<'a> {
    workspace: &'a Workspace,
    languages: &'a LanguageRegistry,
    resolvers: &'a ImportResolverRegistry,
    max_depth: usize,
    visited: HashSet<PathBuf>,
    dependencies: BTreeSet<PathBuf>,
}

impl<'a> DependencyGraph<'a> {
    pub fn new(
        workspace: &'a Workspace,
        languages: &'a LanguageRegistry,
        resolvers: &'a ImportResolverRegistry,
    ) -> Self {
        Self {
            workspace,
            languages,
            resolvers,
            max_depth: MAX_DEPTH,
            visited: HashSet::new(),
            dependencies: BTreeSet::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Expands every root and returns all files reached, roots included
    /// when another root imports them.
    pub fn build<I, P>(mut self, roots: I) -> BTreeSet<PathBuf>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for root in roots {
            let root = canonical(&self.workspace.absolutize(root.as_ref()));
            self.expand(&root, 0);
        }

        tracing::debug!(
            visited = self.visited.len(),
            found = self.dependencies.len(),
            "dependency expansion finished"
        );
        self.dependencies
    }

    fn expand(&mut self, file: &Path, depth: usize) {
        if depth > self.max_depth {
            tracing::trace!(file = %file.display(), depth, "depth limit reached");
            return;
        }
        if !self.visited.insert(file.to_path_buf()) {
            tracing::trace!(file = %file.display(), "already visited");
            return;
        }

        let content = match std::fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Error processing {}: {}", file.display(), e);
                return;
            }
        };

        let imports = self.languages.extract_imports(&content, file);
        for import in &imports {
            for resolved in self.resolvers.resolve(import, self.workspace) {
                if resolved.as_path() == file {
                    continue;
                }
                tracing::debug!(
                    from = %file.display(),
                    to = %resolved.display(),
                    kind = import.kind.as_str(),
                    "found dependency"
                );
                self.dependencies.insert(resolved.clone());
                self.expand(&resolved, depth + 1);
            }
        }
    }
}
