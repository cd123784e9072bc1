use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

use commands::Context;

const DEFAULT_LOG_FILTER: &str =
    "warn,registro_cli=info,registro_application=info,registro_infrastructure=info";

#[derive(Parser)]
#[command(name = "registro")]
#[command(about = "Registro - live access report of student sessions", long_about = None)]
struct Cli {
    /// Sessions file (default: <data_dir>/registro/sessions.toml)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Config file (default: <config_dir>/registro/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the access report of a teacher, grouped by day and student
    Report {
        #[arg(long)]
        owner: String,
        /// Print the report snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Open a session for a student
    Login {
        #[arg(long)]
        student: String,
        #[arg(long)]
        teacher: String,
    },
    /// Close a session
    Logout { session_id: String },
    /// Record a student action
    Activity {
        #[arg(long)]
        student: String,
        #[arg(long)]
        teacher: Option<String>,
    },
    /// Delete sessions of a teacher together with their activities
    Delete {
        #[arg(long)]
        owner: String,
        #[arg(required = true)]
        session_ids: Vec<String>,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Run a live report against an in-memory store with scripted events
    Demo {
        /// Pause between scripted steps, in milliseconds
        #[arg(long, default_value_t = 1_500)]
        pace_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report { owner, json } => {
            let ctx = Context::load(cli.store, cli.config)?;
            commands::report::run(&ctx, &owner, json).await?
        }
        Commands::Login { student, teacher } => {
            let ctx = Context::load(cli.store, cli.config)?;
            commands::record::login(&ctx, &student, &teacher).await?
        }
        Commands::Logout { session_id } => {
            let ctx = Context::load(cli.store, cli.config)?;
            commands::record::logout(&ctx, &session_id).await?
        }
        Commands::Activity { student, teacher } => {
            let ctx = Context::load(cli.store, cli.config)?;
            commands::record::activity(&ctx, &student, teacher.as_deref()).await?
        }
        Commands::Delete {
            owner,
            session_ids,
            yes,
        } => {
            let ctx = Context::load(cli.store, cli.config)?;
            commands::delete::run(&ctx, &owner, &session_ids, yes).await?
        }
        Commands::Demo { pace_ms } => {
            let ctx = Context::in_memory(cli.config)?;
            commands::demo::run(&ctx, pace_ms).await?
        }
    }

    Ok(())
}
