pub mod graph;
pub mod import_resolver;
pub mod walker;

pub use graph::{DependencyGraph, MAX_DEPTH};
pub use import_resolver::{
    ImportResolver, ImportResolverRegistry, RustImportResolver, SolidityImportResolver,
};
pub use walker::FileWalker;
