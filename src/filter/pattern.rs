//! Glob to regex translation for include/exclude filters.

use once_cell::sync::Lazy;
use regex::Regex;

static MATCH_ALL: Lazy<Regex> = Lazy::new(|| Regex::new(".*").unwrap());

/// A word boundary that is also not a word boundary: never matches
static MATCH_NONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\B").unwrap());

/// A glob compiled into a path predicate.
///
/// Matching uses search semantics: the pattern may match anywhere
/// in the candidate path.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    glob: String,
    regex: Regex,
}

impl GlobPattern {
    /// Compiles a single glob.
    ///
    /// Every character outside the wildcards is escaped, so the result is
    /// valid syntax. A regex the engine still refuses (size limits) falls
    /// back to matching the glob text literally.
    pub fn new(glob: &str) -> Self {
        let regex = compile_or_literal(glob, &glob_to_regex(glob));
        Self {
            glob: glob.to_string(),
            regex,
        }
    }

    /// Pattern that matches every path
    pub fn match_all() -> Self {
        Self {
            glob: "**".to_string(),
            regex: MATCH_ALL.clone(),
        }
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The glob this pattern was compiled from
    pub fn glob(&self) -> &str {
        &self.glob
    }

}

fn compile_or_literal(glob: &str, source: &str) -> Regex {
    Regex::new(source)
        .or_else(|e| {
            tracing::warn!("Pattern {} could not be compiled, matching it literally: {}", glob, e);
            Regex::new(&regex::escape(glob))
        })
        .unwrap_or_else(|_| MATCH_NONE.clone())
}

/// Compiles a list of globs.
///
/// An empty list yields a single match-all pattern. Whitespace-only
/// entries are dropped.
pub fn compile_patterns(patterns: &[String]) -> Vec<GlobPattern> {
    if patterns.is_empty() {
        return vec![GlobPattern::match_all()];
    }

    patterns
        .iter()
        .filter(|p| !p.trim().is_empty())
        .map(|p| GlobPattern::new(p))
        .collect()
}

/// Translates a glob into regex source.
///
/// `**/` matches zero or more directories, `*/` exactly one,
/// `*` a run of non-separator characters and `?` a single one.
/// A `**` that is not followed by `/` matches the rest of the path.
pub fn glob_to_regex(glob: &str) -> String {
    let glob = glob.replace('\\', "/");
    let chars: Vec<char> = glob.chars().collect();

    let mut out = String::with_capacity(glob.len() * 2);
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();

                if c == '?' {
                    out.push_str("[^/]");
                    i += 1;
                } else if chars.get(i + 1) == Some(&'*') {
                    if chars.get(i + 2) == Some(&'/') {
                        out.push_str("(?:.*/)?");
                        i += 3;
                    } else {
                        out.push_str(".*");
                        i += 2;
                    }
                } else if chars.get(i + 1) == Some(&'/') {
                    out.push_str("[^/]*/");
                    i += 2;
                } else {
                    out.push_str("[^/]*");
                    i += 1;
                }
            }
            _ => {
                literal.push(c);
                i += 1;
            }
        }
    }

    out.push_str(&regex::escape(&literal));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(glob: &str) -> GlobPattern {
        GlobPattern::new(glob)
    }

    #[test]
    fn test_double_star_matches_any_depth() {
        let p = pattern("tests/**/*.sol");
        assert!(p.is_match("tests/unit/Foo.sol"));
        assert!(p.is_match("tests/Foo.sol"));
        assert!(p.is_match("tests/a/b/c/Foo.sol"));
        assert!(!p.is_match("tests/Foo.rs"));
    }

    #[test]
    fn test_single_star_dir_needs_leading_segment() {
        let p = pattern("*/mocks/*");
        assert!(!p.is_match("mocks/Mock.sol"));
        assert!(p.is_match("contracts/mocks/Mock.sol"));
    }

    #[test]
    fn test_star_does_not_cross_separator() {
        let p = pattern("^src/*.sol");
        assert!(p.is_match("^src/Token.sol"));
        assert!(!p.is_match("^src/sub/Token.sol"));
    }

    #[test]
    fn test_question_mark() {
        let p = pattern("V?.sol");
        assert!(p.is_match("contracts/V1.sol"));
        assert!(!p.is_match("contracts/V/.sol"));
        assert!(!p.is_match("contracts/V10.sol"));
    }

    #[test]
    fn test_search_semantics() {
        let p = pattern("mocks");
        assert!(p.is_match("contracts/mocks/Mock.sol"));
        assert!(p.is_match("mocks/Mock.sol"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let p = pattern("lib/(old)+[v1].sol");
        assert!(p.is_match("lib/(old)+[v1].sol"));
        assert!(!p.is_match("lib/oldd[v1].sol"));

        let dot = pattern("a.sol");
        assert!(!dot.is_match("aXsol"));
    }

    #[test]
    fn test_trailing_double_star() {
        let p = pattern("node_modules/**");
        assert!(p.is_match("node_modules/a/b/c.sol"));
    }

    #[test]
    fn test_backslashes_normalized() {
        let p = pattern("contracts\\*.sol");
        assert!(p.is_match("contracts/Token.sol"));
    }

    #[test]
    fn test_glob_to_regex_output() {
        assert_eq!(glob_to_regex("a/**/b"), "a/(?:.*/)?b");
        assert_eq!(glob_to_regex("*/x"), "[^/]*/x");
        assert_eq!(glob_to_regex("*.sol"), "[^/]*\\.sol");
    }

    #[test]
    fn test_compile_empty_matches_everything() {
        let patterns = compile_patterns(&[]);
        assert_eq!(patterns.len(), 1);
        assert!(patterns[0].is_match("anything/at/all.txt"));
        assert!(patterns[0].is_match(""));
    }

    #[test]
    fn test_uncompilable_pattern_matches_literally() {
        let regex = compile_or_literal("contracts/(*.sol", "contracts/([^/]*\\.sol");
        assert!(regex.is_match("contracts/(*.sol"));
        assert!(!regex.is_match("contracts/Token.sol"));
        assert!(!MATCH_NONE.is_match(""));
        assert!(!MATCH_NONE.is_match("anything"));
    }

    #[test]
    fn test_compile_drops_blank_patterns() {
        let patterns = compile_patterns(&["  ".to_string(), "*.sol".to_string()]);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].glob(), "*.sol");
    }
}
