//! Binary entry point for planet-patrol.
//!
//! This binary runs the sync engine and its one-shot maintenance commands.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use planet_patrol::PatrolConfig;
use planet_patrol::cli::{self, PatrolApp};
use planet_patrol::models::{CandidateId, ReviewerKey};
use planet_patrol::observability::{self, ObservabilityConfig};
use planet_patrol::services::Submission;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// Planet Patrol - sync and aggregation engine for TIC reviews.
#[derive(Parser)]
#[command(name = "planet-patrol")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "PLANET_PATROL_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the refresh loops until Ctrl-C.
    Serve,

    /// Export dispositions as CSV.
    Export {
        /// Include candidates the designated reviewer has not answered.
        #[arg(long)]
        all: bool,

        /// Output file or directory (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the folder index and list it.
    Folders,

    /// Locate evidence files for a candidate.
    Files {
        /// Candidate (TIC) identifier.
        candidate: String,
    },

    /// Show which candidates a reviewer has answered.
    Pending {
        /// Reviewer key (`user:<email>`) or email.
        #[arg(short, long)]
        reviewer: String,
    },

    /// Record a disposition.
    Submit {
        /// Candidate (TIC) identifier.
        candidate: String,

        /// Submitting reviewer key (`user:<email>`) or email.
        #[arg(short, long)]
        reviewer: String,

        /// Disposition, e.g. PC or EB.
        #[arg(short, long)]
        disposition: String,

        /// Comments.
        #[arg(long, default_value = "")]
        comments: String,

        /// Record on behalf of the group.
        #[arg(long)]
        group: bool,
    },

    /// Show a candidate with named reviewers.
    Show {
        /// Candidate (TIC) identifier.
        candidate: String,
    },

    /// Search disposition abbreviations.
    Glossary {
        /// Term to search for (default: all).
        term: Option<String>,
    },
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Commands::Glossary { term } = &cli.command {
        return match cli::cmd_glossary(term.as_deref(), &mut io::stdout().lock()) {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            },
        };
    }

    let config = match PatrolConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    let expose_metrics = matches!(cli.command, Commands::Serve);
    let _observability = match observability::init(ObservabilityConfig::from_config(
        &config,
        cli.verbose,
        expose_metrics,
    )) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to initialize observability: {e}");
            return ExitCode::FAILURE;
        },
    };

    match run_command(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
async fn run_command(command: Commands, config: PatrolConfig) -> anyhow::Result<()> {
    let app = PatrolApp::connect(config)?;
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Serve => cli::cmd_serve(&app, cli::ctrl_c()).await,

        Commands::Export { all, output } => {
            cli::cmd_export(&app, all, output.as_deref(), &mut stdout)
                .await
                .map(|_| ())
        },

        Commands::Folders => cli::cmd_folders(&app, &mut stdout).await.map(|_| ()),

        Commands::Files { candidate } => {
            cli::cmd_files(&app, &CandidateId::new(candidate), &mut stdout)
                .await
                .map(|_| ())
        },

        Commands::Pending { reviewer } => {
            cli::cmd_pending(&app, &ReviewerKey::from_input(&reviewer)?, &mut stdout).await
        },

        Commands::Submit {
            candidate,
            reviewer,
            disposition,
            comments,
            group,
        } => {
            let submission = Submission::new(disposition, comments);
            let submission = if group {
                submission.on_behalf_of_group()
            } else {
                submission
            };
            cli::cmd_submit(
                &app,
                &ReviewerKey::from_input(&reviewer)?,
                &CandidateId::new(candidate),
                &submission,
                &mut stdout,
            )
            .await
            .map(|_| ())
        },

        Commands::Show { candidate } => {
            cli::cmd_show(&app, &CandidateId::new(candidate), &mut stdout).await
        },

        Commands::Glossary { term } => cli::cmd_glossary(term.as_deref(), &mut stdout)
            .map(|_| ())
            .map_err(Into::into),
    }
}
