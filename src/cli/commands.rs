use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use audit_metrics::config::{split_list, FilterConfig};
use audit_metrics::error::Result;
use audit_metrics::filter::{FileClassifier, FileRole};
use audit_metrics::git::GitAnalyzer;
use audit_metrics::report::{ReportFormat, ScopeReport};
use audit_metrics::workspace::Workspace;
use audit_metrics::FileAnalyzer;

#[derive(Parser)]
#[command(name = "audit-metrics")]
#[command(about = "Select audit scope files and resolve their transitive dependencies")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Every .sol file in the current directory plus its dependencies
    audit-metrics scan

    # Only files under contracts/, skipping mocks
    audit-metrics scan ./repo --include 'contracts/**' --exclude '*/mocks/*'

    # Files changed since main, as a markdown report
    audit-metrics scan --base main --format markdown --output scope.md

    # Rust sources reached from an explicit entry point
    audit-metrics scan --ext .rs --files src/lib.rs

    # Why is a file in or out of scope?
    audit-metrics check-path test/Vault.t.sol --role primary
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose classification and resolution logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Select primary files and resolve their dependencies
    Scan(ScanArgs),

    /// Show whether a path passes the filters, and which rule decided it
    CheckPath {
        /// File to classify, relative to the workspace root or absolute
        path: PathBuf,

        /// Role to classify the file in (primary or dependency)
        #[arg(long, default_value = "primary", value_parser = ["primary", "dependency", "dep"])]
        role: String,

        /// Workspace root
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Args)]
pub struct ScanArgs {
    /// Workspace root
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Primary files to start from instead of walking the workspace
    #[arg(long, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Use files changed since this git ref as primary files
    #[arg(long, conflicts_with = "files")]
    pub base: Option<String>,

    /// Compare against this ref instead of the working tree
    #[arg(long, requires = "base")]
    pub head: Option<String>,

    /// Skip files ignored by .gitignore when walking the workspace
    #[arg(long)]
    pub gitignore: bool,

    /// Output format (text, json or markdown)
    #[arg(long, default_value = "text", value_parser = ["text", "json", "markdown"])]
    pub format: String,

    /// Write the report to a file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Filter overrides shared by every command
#[derive(Args)]
pub struct FilterArgs {
    /// File extensions to analyze (e.g. .sol .rs)
    #[arg(long = "ext", num_args = 1..)]
    pub extensions: Vec<String>,

    /// Globs a primary file must match
    #[arg(long, num_args = 1..)]
    pub include: Vec<String>,

    /// Globs that exclude a file
    #[arg(long, num_args = 1..)]
    pub exclude: Vec<String>,

    /// Config file (defaults to audit-metrics.toml in the workspace root)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Builds the effective filter config: file, then environment, then flags.
pub fn load_config(root: &Path, filter: &FilterArgs, debug: bool) -> Result<FilterConfig> {
    let mut config = FilterConfig::load(root, filter.config.as_deref())?;
    config.apply_env();

    let extensions = flatten_list(&filter.extensions);
    if !extensions.is_empty() {
        config.extensions = extensions.iter().map(|e| normalize_extension(e)).collect();
    }
    let include = flatten_list(&filter.include);
    if !include.is_empty() {
        config.include = include;
    }
    let exclude = flatten_list(&filter.exclude);
    if !exclude.is_empty() {
        config.exclude = exclude;
    }

    config.debug |= debug;
    Ok(config)
}

pub fn scan(args: &ScanArgs, mut config: FilterConfig) -> Result<()> {
    config.respect_gitignore |= args.gitignore;
    let analyzer = FileAnalyzer::new(&args.dir, config)?;

    let seed: Option<Vec<PathBuf>> = if !args.files.is_empty() {
        Some(args.files.clone())
    } else if let Some(base) = &args.base {
        let git = GitAnalyzer::new(analyzer.workspace().root())?;
        let changed = git.changed_paths(base, args.head.as_deref())?;
        tracing::info!("{} files changed since {}", changed.len(), base);
        Some(changed)
    } else {
        None
    };

    let primary = analyzer.find_primary_files(seed.as_deref())?;
    let dependencies = analyzer.find_dependencies(&primary);

    let report = ScopeReport::new(analyzer.workspace(), &primary, &dependencies);
    let format = ReportFormat::from_str(&args.format).unwrap_or_default();

    match &args.output {
        Some(path) => report.write(path, format)?,
        None => print!("{}", report.render(format)?),
    }

    Ok(())
}

pub fn check_path(path: &Path, role: &str, dir: &Path, config: FilterConfig) -> Result<()> {
    let workspace = Workspace::new(dir)?;
    let role = FileRole::from_str(role).unwrap_or(FileRole::Primary);
    let classifier = FileClassifier::new(workspace, &config);

    let decision = classifier.classify(path, role);
    let verdict = if decision.is_included() {
        "included"
    } else {
        "excluded"
    };

    println!(
        "{} [{}]: {} ({})",
        classifier.workspace().relative_path(path),
        role.as_str(),
        verdict,
        decision.rule()
    );

    Ok(())
}

/// Accepts both repeated flags and comma-separated values
fn flatten_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| split_list(v))
        .flatten()
        .collect()
}

fn normalize_extension(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn filter_args() -> FilterArgs {
        FilterArgs {
            extensions: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            config: None,
        }
    }

    #[test]
    fn test_cli_parses_scan() {
        let cli = Cli::parse_from([
            "audit-metrics",
            "scan",
            "repo",
            "--ext",
            "sol",
            ".rs",
            "--exclude",
            "test/**,*/mocks/*",
            "--format",
            "json",
            "--debug",
        ]);

        assert!(cli.debug);
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.dir, PathBuf::from("repo"));
                assert_eq!(args.filter.extensions, vec!["sol", ".rs"]);
                assert_eq!(args.format, "json");
            }
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn test_cli_head_requires_base() {
        let result = Cli::try_parse_from(["audit-metrics", "scan", "--head", "HEAD"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_flag_overrides() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("audit-metrics.toml"),
            "extensions = [\".sol\"]\ninclude = [\"src/**\"]\n",
        )
        .unwrap();

        let mut filter = filter_args();
        filter.extensions = vec!["rs, sol".to_string()];
        filter.exclude = vec!["test/**".to_string()];

        let config = load_config(temp_dir.path(), &filter, true).unwrap();
        assert_eq!(config.extensions, vec![".rs", ".sol"]);
        assert_eq!(config.include, vec!["src/**"]);
        assert_eq!(config.exclude, vec!["test/**"]);
        assert!(config.debug);
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("sol"), ".sol");
        assert_eq!(normalize_extension(".rs"), ".rs");
    }
}
