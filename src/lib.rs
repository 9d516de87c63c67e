pub mod analyzer;
pub mod config;
pub mod error;
pub mod filter;
pub mod git;
pub mod indexer;
pub mod languages;
pub mod report;
pub mod workspace;

pub use analyzer::FileAnalyzer;
pub use config::{FilterConfig, CONFIG_FILENAME, DEFAULT_EXTENSIONS};
pub use error::{AuditError, Result};
pub use filter::{Decision, FileClassifier, FileRole, GlobPattern};
pub use git::{ChangeStatus, ChangedFile, GitAnalyzer};
pub use indexer::{DependencyGraph, FileWalker, ImportResolverRegistry, MAX_DEPTH};
pub use languages::{ImportKind, ImportRef, LanguageRegistry, LanguageSupport};
pub use report::{ReportFormat, ScopeReport};
pub use workspace::{Workspace, WorkspaceDetector};
