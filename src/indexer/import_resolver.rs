//! Import Resolution for mapping import references to files
//!
//! This module provides language-specific resolution of the raw
//! references produced by the extractors in [`crate::languages`] to
//! files that exist in the workspace. Resolution never fails: a reference
//! that matches nothing resolves to an empty list.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::languages::solidity::base_candidates;
use crate::languages::{ImportKind, ImportRef};
use crate::workspace::{canonical, Workspace, WorkspaceDetector};

/// Trait for language-specific import resolution
pub trait ImportResolver: Send + Sync {
    /// Resolves a reference to the existing files it points at
    fn resolve(&self, import: &ImportRef, workspace: &Workspace) -> Vec<PathBuf>;

    /// Returns the language this resolver handles
    fn language(&self) -> &'static str;
}

/// Solidity import resolver
///
/// Handles:
/// - relative imports: `import "./Ownable.sol";`, `import "../lib/Math.sol";`
/// - root-relative imports: `import "contracts/token/ERC20.sol";`
/// - inherited bases: `contract Vault is Ownable` looks for `Ownable.sol`,
///   `IOwnable.sol`, `OwnableStorage.sol` and friends
pub struct SolidityImportResolver;

const SOLIDITY_EXT: &str = ".sol";

/// Workspace subdirectories searched for non-relative imports
const ROOT_DIRS: &[&str] = &["src", "contracts", "interfaces", "lib"];

/// Subdirectories of the importing file's directory searched last
const LOCAL_DIRS: &[&str] = &["interfaces", "libraries"];

impl ImportResolver for SolidityImportResolver {
    fn resolve(&self, import: &ImportRef, workspace: &Workspace) -> Vec<PathBuf> {
        match import.kind {
            ImportKind::Inherits => {
                for candidate in base_candidates(&import.specifier) {
                    if let Some(path) =
                        self.resolve_path(&candidate, &import.source_file, workspace.root())
                    {
                        tracing::debug!(
                            base = %import.specifier,
                            path = %path.display(),
                            "resolved inherited contract"
                        );
                        return vec![path];
                    }
                }
                tracing::warn!(
                    "Could not find contract file for {} (inherited in {})",
                    import.specifier,
                    import.source_file.display()
                );
                Vec::new()
            }
            _ => match self.resolve_path(&import.specifier, &import.source_file, workspace.root()) {
                Some(path) => vec![path],
                None => {
                    tracing::debug!(
                        import = %import.specifier,
                        file = %import.source_file.display(),
                        "unresolved import"
                    );
                    Vec::new()
                }
            },
        }
    }

    fn language(&self) -> &'static str {
        "solidity"
    }
}

impl SolidityImportResolver {
    /// First existing file among the candidates for `specifier`
    pub fn resolve_path(&self, specifier: &str, source_file: &Path, root: &Path) -> Option<PathBuf> {
        let file_dir = source_file.parent().unwrap_or(root);

        self.candidate_paths(specifier, file_dir, root)
            .iter()
            .find_map(|candidate| existing_with_extension(candidate, SOLIDITY_EXT))
            .map(|path| canonical(&path))
    }

    /// Candidate locations for `specifier`, in lookup order
    pub fn candidate_paths(&self, specifier: &str, file_dir: &Path, root: &Path) -> Vec<PathBuf> {
        let specifier = specifier.replace('\\', "/");

        if specifier.starts_with("./") || specifier.starts_with("../") {
            return vec![file_dir.join(&specifier)];
        }

        let mut candidates = vec![root.join(&specifier)];
        candidates.extend(ROOT_DIRS.iter().map(|dir| root.join(dir).join(&specifier)));
        candidates.push(file_dir.join(&specifier));
        candidates.push(file_dir.join("..").join(&specifier));
        candidates.extend(LOCAL_DIRS.iter().map(|dir| file_dir.join(dir).join(&specifier)));

        let without_ext = specifier.strip_suffix(SOLIDITY_EXT).unwrap_or(&specifier);
        let file_name = specifier.rsplit('/').next().unwrap_or(&specifier);
        candidates.push(root.join(without_ext).join(file_name));

        candidates
    }
}

/// `candidate` if it is a regular file, else `candidate` + `ext` when the
/// candidate lacks that extension and the result is a regular file
fn existing_with_extension(candidate: &Path, ext: &str) -> Option<PathBuf> {
    if candidate.is_file() {
        return Some(candidate.to_path_buf());
    }

    if candidate.to_string_lossy().ends_with(ext) {
        return None;
    }

    let mut with_ext = OsString::from(candidate.as_os_str());
    with_ext.push(ext);
    let with_ext = PathBuf::from(with_ext);
    if with_ext.is_file() {
        Some(with_ext)
    } else {
        None
    }
}

/// Rust import resolver
///
/// Walks `::`-separated module paths over the filesystem:
/// - `use crate::a::b;` starts at the package root, then at its `src/`
/// - `use super::a;` climbs one directory per `super` from the importing
///   file's directory, then from its module directory
/// - `use self::a;` and `mod a;` start at the importing module's directory,
///   then at the file's directory
///
/// Every file found along the walk is reported, not just the last one.
pub struct RustImportResolver;

const RUST_EXT: &str = "rs";

impl ImportResolver for RustImportResolver {
    fn resolve(&self, import: &ImportRef, workspace: &Workspace) -> Vec<PathBuf> {
        let source = &import.source_file;
        let file_dir = source.parent().unwrap_or(workspace.root()).to_path_buf();
        let module_dir = module_dir(source);

        let mut segments: Vec<&str> = import
            .specifier
            .trim_start_matches("::")
            .split("::")
            .filter(|s| !s.is_empty())
            .collect();

        let mut bases = match segments.first().copied() {
            Some("crate") => {
                segments.remove(0);
                WorkspaceDetector::crate_roots(source, workspace.root())
            }
            Some("super") => {
                let mut levels = 0;
                while segments.first() == Some(&"super") {
                    segments.remove(0);
                    levels += 1;
                }
                vec![ascend(&file_dir, levels), ascend(&module_dir, levels)]
            }
            Some("self") => {
                segments.remove(0);
                vec![module_dir, file_dir]
            }
            _ if import.kind == ImportKind::ModuleDecl => vec![module_dir, file_dir],
            _ => vec![file_dir],
        };
        dedup_dirs(&mut bases);

        for base in &bases {
            let found = self.walk_segments(base, &segments);
            if !found.is_empty() {
                return found;
            }
        }

        tracing::debug!(
            import = %import.specifier,
            file = %source.display(),
            "no module files found"
        );
        Vec::new()
    }

    fn language(&self) -> &'static str {
        "rust"
    }
}

impl RustImportResolver {
    /// Resolves `segments` left to right starting in `start`.
    ///
    /// Each segment tries `<seg>.rs`, `<seg>/mod.rs` and `<seg>/lib.rs`. A
    /// hit keeps the walk in the directory holding the hit; a miss descends
    /// into `<seg>/` anyway so unresolved namespaces don't stop the walk.
    /// When the next segment misses after a `<seg>.rs` hit, the `<seg>/`
    /// directory of that file module is tried before descending.
    pub fn walk_segments(&self, start: &Path, segments: &[&str]) -> Vec<PathBuf> {
        let mut current = start.to_path_buf();
        let mut file_module_dir: Option<PathBuf> = None;
        let mut found = Vec::new();

        for segment in segments {
            if matches!(*segment, "self" | "crate" | "super") {
                continue;
            }

            let hit = module_file(&current, segment).or_else(|| {
                file_module_dir
                    .as_deref()
                    .and_then(|dir| module_file(dir, segment))
            });

            match hit {
                Some(hit) => {
                    let containing = hit.parent().map(Path::to_path_buf).unwrap_or_default();
                    let nested = containing.join(segment);
                    file_module_dir = (hit.file_stem().and_then(|s| s.to_str()) == Some(*segment)
                        && nested.is_dir())
                    .then_some(nested);
                    current = containing;
                    found.push(canonical(&hit));
                }
                None => {
                    current = current.join(segment);
                    file_module_dir = None;
                }
            }
        }

        found
    }
}

/// First of `<seg>.rs`, `<seg>/mod.rs`, `<seg>/lib.rs` that exists in `dir`
fn module_file(dir: &Path, segment: &str) -> Option<PathBuf> {
    [
        dir.join(format!("{}.{}", segment, RUST_EXT)),
        dir.join(segment).join(format!("mod.{}", RUST_EXT)),
        dir.join(segment).join(format!("lib.{}", RUST_EXT)),
    ]
    .into_iter()
    .find(|c| c.is_file())
}

fn ascend(dir: &Path, levels: usize) -> PathBuf {
    let mut dir = dir.to_path_buf();
    for _ in 0..levels {
        if let Some(parent) = dir.parent() {
            dir = parent.to_path_buf();
        }
    }
    dir
}

/// Drops repeated and missing directories, keeping first occurrences
fn dedup_dirs(dirs: &mut Vec<PathBuf>) {
    let mut seen = Vec::new();
    dirs.retain(|d| {
        if !d.is_dir() || seen.contains(d) {
            return false;
        }
        seen.push(d.clone());
        true
    });
}

/// Directory holding the child modules of `file`.
///
/// `mod.rs`, `lib.rs` and `main.rs` own their directory; any other
/// `foo.rs` owns `foo/` next to it.
fn module_dir(file: &Path) -> PathBuf {
    let parent = file.parent().map(Path::to_path_buf).unwrap_or_default();
    match file.file_stem().and_then(|s| s.to_str()) {
        Some("mod") | Some("lib") | Some("main") | None => parent,
        Some(stem) => parent.join(stem),
    }
}

/// Registry of import resolvers
pub struct ImportResolverRegistry {
    resolvers: Vec<Box<dyn ImportResolver>>,
}

impl Default for ImportResolverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportResolverRegistry {
    pub fn new() -> Self {
        Self {
            resolvers: vec![Box::new(SolidityImportResolver), Box::new(RustImportResolver)],
        }
    }

    pub fn get(&self, language: &str) -> Option<&dyn ImportResolver> {
        self.resolvers.iter().find(|r| r.language() == language).map(|r| r.as_ref())
    }

    /// Resolves `import` with the resolver for its language; languages
    /// without a resolver resolve to nothing
    pub fn resolve(&self, import: &ImportRef, workspace: &Workspace) -> Vec<PathBuf> {
        match self.get(&import.language) {
            Some(resolver) => resolver.resolve(import, workspace),
            None => Vec::new(),
        }
    }
}
