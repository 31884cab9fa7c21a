//! # simplemind CLI
//!
//! Command-line front end for resolving and rendering content.

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "simplemind")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "simplemind.yml")]
    config: PathBuf,

    /// Content directory (overrides the configured one)
    #[arg(long, env = "SIMPLEMIND_CONTENT")]
    content: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the store path an identifier resolves to
    Resolve {
        /// Content identifier, e.g. article/rust-notes
        uri: String,
    },

    /// Render an article or journal
    Render {
        /// Content identifier
        uri: String,

        /// Lookup mode
        #[arg(long, value_enum, default_value_t = RenderMode::Article)]
        mode: RenderMode,

        /// Prefix the body with the extracted metadata
        #[arg(long)]
        with_metadata: bool,

        /// Emit JSON instead of HTML
        #[arg(long)]
        json: bool,
    },

    /// List the categories below an identifier
    Section {
        /// Content identifier
        uri: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List every file, newest first
    List {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Copy, Clone, ValueEnum)]
pub enum RenderMode {
    Article,
    Journal,
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    init_tracing(cli.verbose)?;

    let site = commands::load_site(&cli.config, cli.content.as_deref())?;

    match cli.command {
        Commands::Resolve { uri } => commands::resolve_uri(&site, &uri),
        Commands::Render {
            uri,
            mode,
            with_metadata,
            json,
        } => commands::render_uri(&site, &uri, mode, with_metadata, json),
        Commands::Section { uri, json } => commands::show_section(&site, &uri, json),
        Commands::List { json } => commands::list_recent(&site, json),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let not_found = err
                .downcast_ref::<simplemind_core::Error>()
                .is_some_and(simplemind_core::Error::is_not_found);
            if not_found {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
