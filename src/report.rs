//! Scope report rendering.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::workspace::Workspace;

/// Output format for a scope report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// One path per line, primary files then dependencies
    #[default]
    Text,
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "markdown",
        }
    }
}

/// Primary files and their dependencies, as workspace-relative paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeReport {
    pub root: String,
    pub primary: Vec<String>,
    pub dependencies: Vec<String>,
}

#[derive(Default)]
struct TreeNode {
    children: BTreeMap<String, TreeNode>,
}

impl ScopeReport {
    pub fn new(workspace: &Workspace, primary: &[PathBuf], dependencies: &[PathBuf]) -> Self {
        let relative = |files: &[PathBuf]| -> Vec<String> {
            files.iter().map(|f| workspace.relative_path(f)).collect()
        };

        Self {
            root: workspace.normalized(workspace.root()),
            primary: relative(primary),
            dependencies: relative(dependencies),
        }
    }

    /// Sorted union of primary and dependency files
    pub fn all_files(&self) -> Vec<String> {
        self.primary
            .iter()
            .chain(self.dependencies.iter())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(self.to_text()),
            ReportFormat::Json => self.to_json(),
            ReportFormat::Markdown => Ok(self.to_markdown(Some("Audit Scope"))),
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Primary files ({}):", self.primary.len());
        for path in &self.primary {
            let _ = writeln!(out, "  {}", path);
        }
        let _ = writeln!(out, "Dependencies ({}):", self.dependencies.len());
        for path in &self.dependencies {
            let _ = writeln!(out, "  {}", path);
        }

        out
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// File list followed by a directory tree of every file in scope
    pub fn to_markdown(&self, title: Option<&str>) -> String {
        let files = self.all_files();
        let mut lines = Vec::new();

        if let Some(title) = title {
            lines.push(format!("# {}\n", title));
        }

        lines.push("### Included Files:\n".to_string());
        for path in &files {
            lines.push(format!("- {}", path));
        }

        lines.push("\n### File Tree:\n".to_string());
        let mut tree = TreeNode::default();
        for path in &files {
            let mut node = &mut tree;
            for part in path.split('/').filter(|p| !p.is_empty()) {
                node = node.children.entry(part.to_string()).or_default();
            }
        }
        write_tree(&tree, "", &mut lines);

        lines.join("\n") + "\n"
    }

    /// Renders in `format` and writes the result to `path`
    pub fn write(&self, path: &Path, format: ReportFormat) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.render(format)?)?;
        tracing::info!("{} report written to {}", format.as_str(), path.display());
        Ok(())
    }
}

fn write_tree(node: &TreeNode, prefix: &str, lines: &mut Vec<String>) {
    let count = node.children.len();
    for (i, (name, child)) in node.children.iter().enumerate() {
        let is_last = i + 1 == count;
        let branch = if is_last { "└── " } else { "├── " };
        lines.push(format!("{}{}{}", prefix, branch, name));

        if !child.children.is_empty() {
            let extension = if is_last { "    " } else { "│   " };
            write_tree(child, &format!("{}{}", prefix, extension), lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn report() -> ScopeReport {
        ScopeReport {
            root: "/work".to_string(),
            primary: vec!["contracts/Vault.sol".to_string()],
            dependencies: vec![
                "contracts/Ownable.sol".to_string(),
                "lib/oz/Pausable.sol".to_string(),
            ],
        }
    }

    #[test]
    fn test_report_format_from_str() {
        assert_eq!(ReportFormat::from_str("JSON"), Some(ReportFormat::Json));
        assert_eq!(ReportFormat::from_str("md"), Some(ReportFormat::Markdown));
        assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
        assert_eq!(ReportFormat::from_str("yaml"), None);
    }

    #[test]
    fn test_all_files_sorted_union() {
        let mut r = report();
        r.dependencies.push("contracts/Vault.sol".to_string());
        assert_eq!(
            r.all_files(),
            vec!["contracts/Ownable.sol", "contracts/Vault.sol", "lib/oz/Pausable.sol"]
        );
    }

    #[test]
    fn test_markdown_tree() {
        let md = report().to_markdown(None);
        let expected = "\
### Included Files:

- contracts/Ownable.sol
- contracts/Vault.sol
- lib/oz/Pausable.sol

### File Tree:

├── contracts
│   ├── Ownable.sol
│   └── Vault.sol
└── lib
    └── oz
        └── Pausable.sol
";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_markdown_title() {
        let md = report().to_markdown(Some("Scope"));
        assert!(md.starts_with("# Scope\n\n### Included Files:"));
    }

    #[test]
    fn test_json_fields() {
        let json = report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["primary"][0], "contracts/Vault.sol");
        assert_eq!(value["dependencies"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_new_uses_relative_paths() {
        let temp_dir = TempDir::new().unwrap();
        let ws = Workspace::new(temp_dir.path()).unwrap();
        let root = ws.root().to_path_buf();

        let r = ScopeReport::new(
            &ws,
            &[root.join("contracts/Vault.sol")],
            &[root.join("lib/Ownable.sol")],
        );
        assert_eq!(r.primary, vec!["contracts/Vault.sol"]);
        assert_eq!(r.dependencies, vec!["lib/Ownable.sol"]);
    }

    #[test]
    fn test_write_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out/scope.md");

        report().write(&out, ReportFormat::Markdown).unwrap();
        let written = std::fs::read_to_string(out).unwrap();
        assert!(written.contains("### File Tree:"));
    }
}
