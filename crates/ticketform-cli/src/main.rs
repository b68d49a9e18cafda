//! Ticket form CLI
//!
//! Runs the ticket form engine against configuration and value files.
//!
//! # Usage
//!
//! ```bash
//! ticketform config init
//! ticketform validate --values values.json
//! ticketform preview --config form.toml --values values.json
//! ticketform admit report.pdf:204800:application/pdf setup.exe:1024:application/x-msdownload
//! ticketform draft show --dir ./drafts --format json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "ticketform")]
#[command(version)]
#[command(about = "Ticket form command line interface", long_about = None)]
struct Cli {
    /// Output format
    #[arg(long, short, global = true)]
    format: Option<output::OutputFormat>,

    /// Profile name from config file
    #[arg(long, short, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate field values against the form rules
    Validate {
        /// Form configuration (TOML or JSON); the built-in ticket form if omitted
        #[arg(long, short)]
        config: Option<PathBuf>,
        /// JSON object of field name to value
        #[arg(long)]
        values: PathBuf,
    },
    /// Render the read-only preview
    Preview {
        #[arg(long, short)]
        config: Option<PathBuf>,
        #[arg(long)]
        values: PathBuf,
    },
    /// Run the file admission policy over a batch
    Admit {
        #[arg(long, short)]
        config: Option<PathBuf>,
        /// Files as name:size:mime
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Inspect saved drafts
    Draft {
        #[command(subcommand)]
        action: DraftCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum DraftCommands {
    /// Show the stored draft and whether it is still fresh
    Show {
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Remove the stored draft
    Clear {
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write the built-in ticket form and point the profile at it
    Init {
        #[arg(long, default_value = "ticket-form.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective form configuration
    Show {
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let profile = config::CliConfig::load(cli.profile.as_deref()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring unreadable profile");
        config::CliConfig::default()
    });
    let format = cli.format.or_else(|| profile.format()).unwrap_or_default();
    let ctx = commands::Context { profile, profile_name: cli.profile, format };

    let result = match cli.command {
        Commands::Validate { config, values } => commands::validate::handle(&ctx, config, values),
        Commands::Preview { config, values } => commands::preview::handle(&ctx, config, values),
        Commands::Admit { config, files } => commands::admit::handle(&ctx, config, files),
        Commands::Draft { action } => commands::draft::handle(&ctx, action),
        Commands::Config { action } => commands::config::handle(&ctx, action),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
