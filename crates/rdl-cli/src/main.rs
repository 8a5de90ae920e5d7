//! RDL command-line tool
//!
//! Parses RDL schemas, reporting errors and warnings the way the library
//! renders them, and optionally dumps the parsed schema as JSON.

mod commands;
mod output;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rdl_parser::ParseOptions;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rdl")]
#[command(about = "Resource Description Language schema tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Show surrounding source lines in diagnostics
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Reject legacy syntax and conflicting redefinitions
    #[arg(short, long, global = true)]
    pub pedantic: bool,

    /// Suppress warnings
    #[arg(long, global = true)]
    pub nowarn: bool,

    /// When to use colored output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,
}

impl GlobalArgs {
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            verbose: self.verbose,
            pedantic: self.pedantic,
            nowarn: self.nowarn,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a schema and report problems
    Check {
        /// Schema file
        file: PathBuf,
    },

    /// Parse a schema and print it as JSON
    Json {
        /// Schema file
        file: PathBuf,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let parsed = match cli.command {
        Commands::Check { file } => commands::check::execute(&file, &cli.global)?,
        Commands::Json { file, output } => {
            commands::json::execute(&file, output.as_deref(), &cli.global)?
        }
    };
    if !parsed {
        std::process::exit(1);
    }
    Ok(())
}
