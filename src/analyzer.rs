//! Primary file selection and dependency discovery.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::FilterConfig;
use crate::error::Result;
use crate::filter::{FileClassifier, FileRole};
use crate::indexer::{DependencyGraph, FileWalker, ImportResolverRegistry};
use crate::languages::LanguageRegistry;
use crate::workspace::{canonical, Workspace};

/// Entry point used by callers: pick primary files, then follow their imports
pub struct FileAnalyzer {
    workspace: Workspace,
    config: FilterConfig,
    classifier: FileClassifier,
    languages: LanguageRegistry,
    resolvers: ImportResolverRegistry,
}

impl FileAnalyzer {
    pub fn new(root: impl AsRef<Path>, config: FilterConfig) -> Result<Self> {
        let workspace = Workspace::new(root)?;
        let classifier = FileClassifier::new(workspace.clone(), &config);

        Ok(Self {
            workspace,
            config,
            classifier,
            languages: LanguageRegistry::new(),
            resolvers: ImportResolverRegistry::new(),
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn classifier(&self) -> &FileClassifier {
        &self.classifier
    }

    /// Selects primary files.
    ///
    /// With `changed_files`, keeps the entries that pass the primary filters,
    /// in the given order (relative entries are taken from the workspace
    /// root). Without it, walks the whole workspace.
    pub fn find_primary_files(&self, changed_files: Option<&[PathBuf]>) -> Result<Vec<PathBuf>> {
        let primary: Vec<PathBuf> = match changed_files {
            Some(files) => files
                .iter()
                .map(|f| self.workspace.absolutize(f))
                .filter(|f| self.classifier.is_included(f, FileRole::Primary))
                .collect(),
            None => {
                let all = FileWalker::new(self.config.respect_gitignore).walk(self.workspace.root())?;
                tracing::debug!("Scanning {} files in workspace", all.len());
                all.into_par_iter()
                    .filter(|f| self.classifier.is_included(f, FileRole::Primary))
                    .collect()
            }
        };

        tracing::info!("Found {} primary files", primary.len());
        Ok(primary)
    }

    /// Transitive dependencies of `primary_files`: sorted, without the
    /// primary files themselves, filtered for the dependency role.
    pub fn find_dependencies(&self, primary_files: &[PathBuf]) -> Vec<PathBuf> {
        let found = DependencyGraph::new(&self.workspace, &self.languages, &self.resolvers)
            .build(primary_files);

        let primary: HashSet<PathBuf> = primary_files
            .iter()
            .map(|f| canonical(&self.workspace.absolutize(f)))
            .collect();

        let dependencies: Vec<PathBuf> = found
            .into_iter()
            .filter(|dep| !primary.contains(dep))
            .filter(|dep| self.classifier.is_included(dep, FileRole::Dependency))
            .collect();

        tracing::info!("Found {} dependency files", dependencies.len());
        dependencies
    }
}
