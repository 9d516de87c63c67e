mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "audit_metrics=debug"
    } else {
        "audit_metrics=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => {
            let config = cli::load_config(&args.dir, &args.filter, cli.debug)?;
            init_tracing(config.debug);
            cli::scan(&args, config)?;
        }
        Commands::CheckPath {
            path,
            role,
            dir,
            filter,
        } => {
            let config = cli::load_config(&dir, &filter, cli.debug)?;
            init_tracing(config.debug);
            cli::check_path(&path, &role, &dir, config)?;
        }
    }

    Ok(())
}
