//! Filter configuration.
//!
//! Settings are layered: an optional `audit-metrics.toml` file, then the
//! `EXTENSIONS`, `INCLUDE` and `EXCLUDE` environment variables
//! (comma-separated), then whatever the caller sets explicitly.
//!
//! ```toml
//! extensions = [".sol", ".rs"]
//! include = ["contracts/**/*.sol"]
//! exclude = ["test/**", "*/mocks/*"]
//! respect_gitignore = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};

/// Name of the config file looked up in the workspace root
pub const CONFIG_FILENAME: &str = "audit-metrics.toml";

/// Extensions analyzed when nothing else is configured
pub const DEFAULT_EXTENSIONS: &[&str] = &[".sol"];

/// Extension and glob filters shared by primary selection and dependency admission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// File suffixes to keep, matched case-insensitively. Empty keeps every file.
    pub extensions: Vec<String>,

    /// Globs a primary file must match. Empty matches everything.
    pub include: Vec<String>,

    /// Globs that reject a file in either role. Empty rejects nothing.
    pub exclude: Vec<String>,

    /// Skip files ignored by `.gitignore` during a full workspace walk
    pub respect_gitignore: bool,

    /// Verbose classification and resolution logging
    pub debug: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            include: Vec::new(),
            exclude: Vec::new(),
            respect_gitignore: false,
            debug: false,
        }
    }
}

impl FilterConfig {
    /// Config with no filters at all
    pub fn unfiltered() -> Self {
        Self {
            extensions: Vec::new(),
            ..Self::default()
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Parses config from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| AuditError::Config(format!("Invalid {}: {}", CONFIG_FILENAME, e)))
    }

    /// Loads config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Loads `explicit` if given, otherwise `audit-metrics.toml` from the
    /// workspace root when present, otherwise the defaults.
    pub fn load(workspace_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let candidate = workspace_root.join(CONFIG_FILENAME);
        if candidate.is_file() {
            tracing::debug!("Loading config from {}", candidate.display());
            return Self::from_file(&candidate);
        }

        Ok(Self::default())
    }

    /// Applies `EXTENSIONS`, `INCLUDE` and `EXCLUDE` from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// Unset or blank variables leave the current value alone.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(list) = lookup("EXTENSIONS").and_then(|v| split_list(&v)) {
            self.extensions = list;
        }
        if let Some(list) = lookup("INCLUDE").and_then(|v| split_list(&v)) {
            self.include = list;
        }
        if let Some(list) = lookup("EXCLUDE").and_then(|v| split_list(&v)) {
            self.exclude = list;
        }
    }
}

/// Splits a comma-separated list, trimming entries and dropping empty ones.
/// Returns `None` when nothing is left.
pub fn split_list(value: &str) -> Option<Vec<String>> {
    let items: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_extensions() {
        let config = FilterConfig::default();
        assert_eq!(config.extensions, vec![".sol".to_string()]);
        assert!(config.include.is_empty());
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = FilterConfig::from_toml(
            r#"
exclude = ["test/**"]
"#,
        )
        .unwrap();

        assert_eq!(config.extensions, vec![".sol".to_string()]);
        assert_eq!(config.exclude, vec!["test/**".to_string()]);
        assert!(!config.respect_gitignore);
    }

    #[test]
    fn test_from_toml_invalid() {
        let err = FilterConfig::from_toml("extensions = 3").unwrap_err();
        assert!(matches!(err, AuditError::Config(_)));
    }

    #[test]
    fn test_load_from_workspace_root() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILENAME),
            "extensions = [\".rs\"]\ninclude = [\"src/**\"]\n",
        )
        .unwrap();

        let config = FilterConfig::load(temp_dir.path(), None).unwrap();
        assert_eq!(config.extensions, vec![".rs".to_string()]);
        assert_eq!(config.include, vec!["src/**".to_string()]);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = FilterConfig::load(temp_dir.path(), None).unwrap();
        assert_eq!(config, FilterConfig::default());
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");
        assert!(FilterConfig::load(temp_dir.path(), Some(&missing)).is_err());
    }

    #[test]
    fn test_apply_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("EXTENSIONS", ".sol, .rs"),
            ("INCLUDE", ""),
            ("EXCLUDE", " test/** ,, */mocks/* "),
        ]
        .into_iter()
        .collect();

        let mut config = FilterConfig::default().with_include(["src/**"]);
        config.apply_env_with(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.extensions, vec![".sol".to_string(), ".rs".to_string()]);
        assert_eq!(config.include, vec!["src/**".to_string()]);
        assert_eq!(
            config.exclude,
            vec!["test/**".to_string(), "*/mocks/*".to_string()]
        );
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" , ,"), None);
        assert_eq!(
            split_list("a,b"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }
}
