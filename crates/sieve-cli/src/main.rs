use anyhow::Context;
use clap::{Parser, Subcommand};
use sieve_core::RewriteConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::rewrite::RewriteArgs;

#[derive(Parser, Debug)]
#[command(name = "sieve", version, about = "Sieve SQL rewrite engine")]
struct Cli {
    /// Log filter (e.g. `debug`, `sieve_rewrite=trace`). Defaults to the
    /// rules file's `logging.level`; `RUST_LOG` takes precedence.
    #[arg(long, global = true, env = "SIEVE_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rewrite one SQL statement with the rules from a rules file.
    Rewrite(RewriteArgs),

    /// Validate a rules file against the schema and report problems.
    Check {
        /// Path to the rules file (YAML)
        #[arg(long, short = 'c', env = "SIEVE_CONFIG")]
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Rewrite(args) => {
            let config = RewriteConfig::load(&args.config).with_context(|| {
                format!("Failed to load rules file {}", args.config.display())
            })?;
            init_logging(cli.log_level.as_deref().unwrap_or(&config.logging.level));
            commands::rewrite::run(&config, args)?
        }

        Command::Check { config } => {
            init_logging(cli.log_level.as_deref().unwrap_or("warn"));
            commands::check::run(&config)?
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout only carries rewritten SQL.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
