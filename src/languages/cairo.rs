use std::path::Path;

use super::{ImportRef, LanguageSupport};

/// Cairo sources are recognized so they pass through the walker and the
/// classifier, but their imports are not followed yet.
pub struct CairoSupport;

impl LanguageSupport for CairoSupport {
    fn name(&self) -> &'static str {
        "cairo"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["cairo"]
    }

    fn extract_imports(&self, _content: &str, _file_path: &Path) -> Vec<ImportRef> {
        Vec::new()
    }
}
