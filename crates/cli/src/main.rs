//! Gatekeep CLI
//!
//! Lints rule text and runs rule fixtures against stub predicates.

mod commands;
mod fixture;
mod stubs;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

use gatekeep_core::GatekeepConfig;
use gatekeep_rules::{ParserConfig, TracingSink};

/// Gatekeep CLI: check access rules without a running host.
#[derive(Parser, Debug)]
#[command(name = "gatekeep", version, about)]
struct Cli {
    /// Path to a gatekeep TOML config file.
    #[arg(long, env = "GATEKEEP_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile rule text and show what it compiles to.
    Lint(commands::lint::LintArgs),
    /// Run a YAML rule fixture.
    Test(commands::test::TestArgs),
}

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let config = GatekeepConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            debug!(path = %path.display(), "loaded config");
            config
        }
        None => GatekeepConfig::default(),
    };
    let parser = ParserConfig::from_config(&config);
    let parser = if config.warnings.log_file.is_some() {
        parser
    } else {
        parser.with_warning_sink(Arc::new(TracingSink))
    };

    match cli.command {
        Command::Lint(args) => commands::lint::run(&args, &parser, &cli.format),
        Command::Test(args) => commands::test::run(&args, &parser, &cli.format),
    }
}
