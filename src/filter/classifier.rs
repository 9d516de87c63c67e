//! Primary/dependency file classification.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::FilterConfig;
use crate::workspace::Workspace;

use super::pattern::{compile_patterns, GlobPattern};

/// Role a file is being classified for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    /// Explicitly selected file: extension, exclude and include checks
    Primary,
    /// File reached through imports: extension and exclude checks only
    Dependency,
}

impl FileRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileRole::Primary => "primary",
            FileRole::Dependency => "dependency",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "primary" => Some(FileRole::Primary),
            "dependency" | "dep" => Some(FileRole::Dependency),
            _ => None,
        }
    }
}

/// Why a file was accepted or rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Included { rule: String },
    Excluded { rule: String },
}

impl Decision {
    pub fn is_included(&self) -> bool {
        matches!(self, Decision::Included { .. })
    }

    pub fn rule(&self) -> &str {
        match self {
            Decision::Included { rule } | Decision::Excluded { rule } => rule,
        }
    }
}

/// Applies the extension filter and include/exclude globs
#[derive(Debug, Clone)]
pub struct FileClassifier {
    workspace: Workspace,
    extensions: Vec<String>,
    include: Vec<GlobPattern>,
    exclude: Vec<GlobPattern>,
    has_include: bool,
}

impl FileClassifier {
    pub fn new(workspace: Workspace, config: &FilterConfig) -> Self {
        let include = compile_patterns(&config.include);
        let exclude = if config.exclude.is_empty() {
            Vec::new()
        } else {
            compile_patterns(&config.exclude)
        };

        Self {
            workspace,
            extensions: config.extensions.iter().map(|e| e.to_lowercase()).collect(),
            has_include: !include.is_empty(),
            include,
            exclude,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn is_included(&self, path: &Path, role: FileRole) -> bool {
        self.classify(path, role).is_included()
    }

    /// Classifies `path`, reporting the rule that decided it
    pub fn classify(&self, path: &Path, role: FileRole) -> Decision {
        let normalized = self.workspace.normalized(path);
        let rel_path = self.workspace.relative_path(path);

        let decision = self.decide(&normalized, &rel_path, role);

        tracing::debug!(
            path = %rel_path,
            role = role.as_str(),
            included = decision.is_included(),
            rule = decision.rule(),
            "classified file"
        );

        decision
    }

    fn decide(&self, normalized: &str, rel_path: &str, role: FileRole) -> Decision {
        if !self.extensions.is_empty() {
            let lower = normalized.to_lowercase();
            if !self.extensions.iter().any(|ext| lower.ends_with(ext.as_str())) {
                return Decision::Excluded {
                    rule: format!("extension not in {:?}", self.extensions),
                };
            }
        }

        if let Some(pattern) = self.exclude.iter().find(|p| p.is_match(rel_path)) {
            return Decision::Excluded {
                rule: format!("exclude pattern {}", pattern.glob()),
            };
        }

        match role {
            FileRole::Dependency => Decision::Included {
                rule: "dependency check".to_string(),
            },
            FileRole::Primary => {
                if !self.has_include {
                    return Decision::Included {
                        rule: "no include patterns".to_string(),
                    };
                }
                match self.include.iter().find(|p| p.is_match(rel_path)) {
                    Some(pattern) => Decision::Included {
                        rule: format!("include pattern {}", pattern.glob()),
                    },
                    None => Decision::Excluded {
                        rule: "no include pattern matched".to_string(),
                    },
                }
            }
        }
    }
}
