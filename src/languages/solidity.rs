use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{push_unique, strip_comments, ImportKind, ImportRef, LanguageSupport};

/// `contract A is B, C {`, `abstract contract A is B {`, `interface IA is IB {`
static INHERITANCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:abstract\s+contract|contract|interface)\s+(\w+)\s+is\s+([^{]+)").unwrap()
});

/// Plain, named (`{A, B} from`), wildcard (`* as X from`) and aliased
/// imports, single or double quoted.
static IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\bimport\s*(?:\{[^}]*\}\s*from\s*|\*\s*as\s+\w+\s+from\s*)?["']([^"'\n]+)["']"#,
    )
    .unwrap()
});

static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][\w$]*$").unwrap());

pub struct SoliditySupport;

impl LanguageSupport for SoliditySupport {
    fn name(&self) -> &'static str {
        "solidity"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["sol"]
    }

    fn extract_imports(&self, content: &str, file_path: &Path) -> Vec<ImportRef> {
        let content = strip_comments(content);
        let mut refs = Vec::new();

        for caps in INHERITANCE.captures_iter(&content) {
            let contract = &caps[1];
            let bases = split_bases(&caps[2]);
            tracing::debug!(contract, ?bases, "found inheritance");

            for base in bases {
                push_unique(
                    &mut refs,
                    ImportRef::new(base, ImportKind::Inherits, self.name(), file_path),
                );
            }
        }

        for caps in IMPORT.captures_iter(&content) {
            let path = caps[1].trim();
            if path.is_empty() {
                continue;
            }
            push_unique(
                &mut refs,
                ImportRef::new(path, ImportKind::Import, self.name(), file_path),
            );
        }

        refs
    }
}

/// Splits an inheritance list into base names.
///
/// Constructor arguments are dropped (`Ownable(msg.sender)` becomes
/// `Ownable`) and qualified bases keep their last segment.
pub fn split_bases(list: &str) -> Vec<String> {
    let mut bases = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in list.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                push_base(&mut bases, &current);
                current.clear();
            }
            _ if depth == 0 => current.push(c),
            _ => {}
        }
    }
    push_base(&mut bases, &current);

    bases
}

fn push_base(bases: &mut Vec<String>, raw: &str) {
    let name = raw.trim().rsplit('.').next().unwrap_or("").trim();
    if IDENT.is_match(name) && !bases.iter().any(|b| b == name) {
        bases.push(name.to_string());
    }
}

/// Ranked file names tried for an inherited base
pub fn base_candidates(base: &str) -> Vec<String> {
    vec![
        format!("{}.sol", base),
        format!("I{}.sol", base),
        format!("{}Storage.sol", base),
        format!("{}Logic.sol", base),
        format!("contracts/{}.sol", base),
        format!("src/{}.sol", base),
        format!("interfaces/I{}.sol", base),
    ]
}
