use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{push_unique, strip_comments, ImportKind, ImportRef, LanguageSupport};

/// `use a::b::c;` and `use a::b::{c, d};`. Group 1 is the path, group 2 the
/// brace group body when present.
static USE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\buse\s+((?:::)?[A-Za-z_]\w*(?:::[A-Za-z_]\w*)*)(?:::\{([^}]*)\})?").unwrap()
});

static MOD_DECL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bmod\s+([A-Za-z_]\w*)\s*;").unwrap());

static EXTERN_CRATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bextern\s+crate\s+([A-Za-z_]\w*)").unwrap());

static MODULE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_]\w*(?:::[A-Za-z_]\w*)*$").unwrap());

pub struct RustSupport;

impl LanguageSupport for RustSupport {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["rs"]
    }

    fn extract_imports(&self, content: &str, file_path: &Path) -> Vec<ImportRef> {
        let content = strip_comments(content);
        let mut found: Vec<(usize, String, ImportKind)> = Vec::new();

        for caps in USE_PATH.captures_iter(&content) {
            let Some(path) = caps.get(1) else { continue };
            let start = path.start();
            let prefix = path.as_str().trim_start_matches("::");
            found.push((start, prefix.to_string(), ImportKind::Use));

            if let Some(group) = caps.get(2) {
                for member in brace_members(group.as_str()) {
                    found.push((start, format!("{}::{}", prefix, member), ImportKind::Use));
                }
            }
        }

        for caps in MOD_DECL.captures_iter(&content) {
            if let Some(name) = caps.get(1) {
                found.push((name.start(), name.as_str().to_string(), ImportKind::ModuleDecl));
            }
        }

        for caps in EXTERN_CRATE.captures_iter(&content) {
            if let Some(name) = caps.get(1) {
                found.push((name.start(), name.as_str().to_string(), ImportKind::ExternCrate));
            }
        }

        // Stable sort keeps a brace group's members after its prefix
        found.sort_by_key(|(start, _, _)| *start);

        let mut refs = Vec::new();
        for (_, specifier, kind) in found {
            push_unique(&mut refs, ImportRef::new(specifier, kind, self.name(), file_path));
        }
        refs
    }
}

/// Simple paths inside a `{...}` use group; `self`, globs and nested
/// groups are skipped, aliases are dropped.
fn brace_members(group: &str) -> Vec<String> {
    group
        .split(',')
        .filter_map(|member| {
            let member = member.split(" as ").next().unwrap_or("").trim();
            if member == "self" || !MODULE_PATH.is_match(member) {
                None
            } else {
                Some(member.to_string())
            }
        })
        .collect()
}
