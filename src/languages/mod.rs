pub mod cairo;
pub mod rust;
pub mod solidity;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Quoted literals come first so comment markers inside them are skipped
static COMMENT_OR_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'|/\*.*?\*/|//[^\n]*"#).unwrap()
});

/// What produced an import reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// Quoted import statement operand (`import "./A.sol";`)
    Import,
    /// Base named in an inheritance list (`contract A is B`)
    Inherits,
    /// `use` path
    Use,
    /// `mod name;` declaration
    ModuleDecl,
    /// `extern crate name`
    ExternCrate,
}

impl ImportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::Import => "import",
            ImportKind::Inherits => "inherits",
            ImportKind::Use => "use",
            ImportKind::ModuleDecl => "module_decl",
            ImportKind::ExternCrate => "extern_crate",
        }
    }
}

/// A raw reference found in source text, not yet resolved to a file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportRef {
    pub specifier: String,
    pub kind: ImportKind,
    pub language: String,
    pub source_file: PathBuf,
}

impl ImportRef {
    pub fn new(
        specifier: impl Into<String>,
        kind: ImportKind,
        language: &str,
        source_file: &Path,
    ) -> Self {
        Self {
            specifier: specifier.into(),
            kind,
            language: language.to_string(),
            source_file: source_file.to_path_buf(),
        }
    }
}

/// Per-format import extraction.
///
/// Implementations are pure: they scan text and never touch the filesystem.
pub trait LanguageSupport: Send + Sync {
    fn name(&self) -> &'static str;
    fn file_extensions(&self) -> &[&'static str];

    /// Extracts references in source order, without duplicates
    fn extract_imports(&self, content: &str, file_path: &Path) -> Vec<ImportRef>;
}

pub struct LanguageRegistry {
    languages: HashMap<String, Arc<dyn LanguageSupport>>,
    extension_map: HashMap<String, String>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            languages: HashMap::new(),
            extension_map: HashMap::new(),
        };

        registry.register(Arc::new(solidity::SoliditySupport));
        registry.register(Arc::new(rust::RustSupport));
        registry.register(Arc::new(cairo::CairoSupport));

        registry
    }

    pub fn register(&mut self, language: Arc<dyn LanguageSupport>) {
        let name = language.name().to_string();
        for ext in language.file_extensions() {
            self.extension_map.insert(ext.to_string(), name.clone());
        }
        self.languages.insert(name, language);
    }

    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn LanguageSupport>> {
        self.extension_map
            .get(ext)
            .and_then(|name| self.languages.get(name))
            .cloned()
    }

    pub fn get_for_file(&self, path: &Path) -> Option<Arc<dyn LanguageSupport>> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.get_by_extension(ext))
    }

    /// Extracts references from `content`; unsupported extensions yield nothing
    pub fn extract_imports(&self, content: &str, file_path: &Path) -> Vec<ImportRef> {
        match self.get_for_file(file_path) {
            Some(language) => language.extract_imports(content, file_path),
            None => Vec::new(),
        }
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Blanks out `//` and `/* */` comments, keeping line breaks and
/// leaving string literals untouched
pub(crate) fn strip_comments(content: &str) -> String {
    COMMENT_OR_LITERAL
        .replace_all(content, |caps: &regex::Captures| {
            let text = &caps[0];
            if text.starts_with('"') || text.starts_with('\'') {
                return text.to_string();
            }
            text.chars()
                .map(|c| if c == '\n' { '\n' } else { ' ' })
                .collect::<String>()
        })
        .into_owned()
}

/// Order-preserving dedup by specifier and kind
pub(crate) fn push_unique(refs: &mut Vec<ImportRef>, import: ImportRef) {
    if !refs
        .iter()
        .any(|r| r.specifier == import.specifier && r.kind == import.kind)
    {
        refs.push(import);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_dispatch_by_extension() {
        let registry = LanguageRegistry::new();

        assert_eq!(
            registry.get_for_file(Path::new("contracts/A.sol")).map(|l| l.name()),
            Some("solidity")
        );
        assert_eq!(
            registry.get_for_file(Path::new("src/lib.rs")).map(|l| l.name()),
            Some("rust")
        );
        assert_eq!(
            registry.get_for_file(Path::new("src/main.cairo")).map(|l| l.name()),
            Some("cairo")
        );
        assert!(registry.get_for_file(Path::new("README.md")).is_none());
        assert!(registry.get_for_file(Path::new("Makefile")).is_none());
    }

    #[test]
    fn test_unsupported_extension_yields_nothing() {
        let registry = LanguageRegistry::new();
        let refs = registry.extract_imports("import \"./A.sol\";", Path::new("notes.txt"));
        assert!(refs.is_empty());
    }

    #[test]
    fn test_strip_comments() {
        let stripped = strip_comments("a // use x;\n/* use y;\n */b");
        assert!(!stripped.contains("use"));
        assert!(stripped.starts_with('a'));
        assert!(stripped.ends_with('b'));
        assert_eq!(stripped.lines().count(), 3);
    }

    #[test]
    fn test_strip_comments_keeps_string_literals() {
        let stripped = strip_comments("import \"https://x.org/A.sol\"; // old\nb = '//';");
        assert_eq!(stripped, "import \"https://x.org/A.sol\";       \nb = '//';");
    }
}
