//! asmdiff - Structural diff for compiled module metadata
//!
//! Compares two metadata snapshots of a .NET assembly and reports created,
//! removed and modified entities, flagging the changes that can break
//! consumers compiled against the old build.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use asmdiff_core::differ::Subject;
use asmdiff_core::TypeKey;
use commands::*;
use config::AsmdiffConfig;
use output::{OutputConfig, OutputFormat};

/// Exit status when `--fail-on-breaking` is set and breaking changes were found.
const EXIT_BREAKING: i32 = 2;

/// Structural diff for compiled module metadata.
///
/// asmdiff pairs references, types, fields, methods, properties and
/// attributes by identity and reports what changed between two builds.
#[derive(Parser)]
#[command(name = "asmdiff")]
#[command(author, version)]
#[command(about = "Structural diff for compiled module metadata")]
#[command(propagate_version = true)]
#[command(next_help_heading = "Options")]
#[command(after_help = "Examples:
  asmdiff compare old.json new.json                 Show all changes
  asmdiff compare old.json new.json --breaking-only Only what can break callers
  asmdiff compare a.json b.json --subject type,method --format csv
  asmdiff signatures new.json                       List canonical signatures")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format (overrides config default)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Compact output (less whitespace)
    #[arg(long, global = true)]
    compact: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Never wrap tables to the terminal width
    #[arg(long, global = true)]
    no_truncate: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two metadata snapshots
    #[command(visible_alias = "c")]
    Compare {
        /// Snapshot of the old build
        old: PathBuf,

        /// Snapshot of the new build
        new: PathBuf,

        /// Compare compiler-generated members too
        #[arg(long)]
        include_generated: bool,

        /// Skip property signature and attribute comparison
        #[arg(long)]
        no_property_modifications: bool,

        /// Compare types on a single thread
        #[arg(long)]
        sequential: bool,

        /// How types are paired: name or full-name
        #[arg(long)]
        type_key: Option<TypeKey>,

        /// Only show these subjects (comma-separated, e.g. type,method)
        #[arg(short, long, value_delimiter = ',')]
        subject: Vec<Subject>,

        /// Only show changes that can break consumers
        #[arg(short, long)]
        breaking_only: bool,

        /// Exit with status 2 when breaking changes remain
        #[arg(long)]
        fail_on_breaking: bool,

        /// Fail on snapshots with duplicate identities instead of keeping the first
        #[arg(long)]
        strict: bool,
    },

    /// List the canonical signature of every entity in a snapshot
    #[command(visible_alias = "sig")]
    Signatures {
        /// Snapshot file
        path: PathBuf,

        /// Include compiler-generated members
        #[arg(long)]
        include_generated: bool,

        /// Fail on snapshots with duplicate identities
        #[arg(long)]
        strict: bool,

        /// How types are keyed for --strict: name or full-name
        #[arg(long)]
        type_key: Option<TypeKey>,
    },

    /// Print a shell completion script to stdout
    #[command(after_help = completions::INSTALL_HELP)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Initialize logging based on verbosity flags
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Load configuration from .asmdiffrc.toml
    let config = AsmdiffConfig::load(std::path::Path::new("."));

    // Resolve output format: CLI flag > config default > Table
    let format = cli.format.unwrap_or_else(|| {
        config
            .default_format()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Table)
    });

    let mut output_config = OutputConfig::detect(format, config.use_color());
    if cli.no_color {
        output_config.color = false;
    }
    if cli.no_truncate {
        output_config.wrap = false;
    }
    output_config.compact = cli.compact;
    colored::control::set_override(output_config.color);

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            let _ = Cli::command().print_help();
            println!();
            return Ok(());
        }
    };

    match command {
        Commands::Compare {
            old,
            new,
            include_generated,
            no_property_modifications,
            sequential,
            type_key,
            subject,
            breaking_only,
            fail_on_breaking,
            strict,
        } => {
            let args = compare::CompareArgs {
                include_generated,
                no_property_modifications,
                sequential,
                type_key,
                subjects: subject,
                breaking_only,
                strict,
            };
            let has_breaking = compare::run(&old, &new, config.diff, &args, output_config)?;
            if fail_on_breaking && has_breaking {
                std::process::exit(EXIT_BREAKING);
            }
            Ok(())
        }
        Commands::Signatures {
            path,
            include_generated,
            strict,
            type_key,
        } => signatures::run(
            &path,
            include_generated || config.diff.include_generated,
            strict,
            type_key.unwrap_or(config.diff.type_key),
            output_config,
        ),
        Commands::Completions { shell } => completions::run(shell, &mut Cli::command()),
    }
}
