//! Include/exclude filtering for primary files and dependencies.

pub mod classifier;
pub mod pattern;

pub use classifier::{Decision, FileClassifier, FileRole};
pub use pattern::{compile_patterns, glob_to_regex, GlobPattern};
