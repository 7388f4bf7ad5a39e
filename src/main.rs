mod commands;
mod config;
mod provider;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use store::TaskStore;

#[derive(Parser)]
#[command(name = "tasksync")]
#[command(about = "Reconcile your local task directory with external task providers")]
struct Cli {
    /// Increase log output (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file to use instead of ~/.config/tasksync/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every linked task in the task directory with its fetched payload
    Sync {
        /// Task directory (defaults to task_dir from config)
        #[arg(short, long)]
        dir: Option<String>,

        /// Show what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Reconcile a single task file against a payload file
    Reconcile {
        /// Task record (.toml)
        #[arg(short, long)]
        task: PathBuf,

        /// Payload fetched from the provider (.json)
        #[arg(short, long)]
        remote: PathBuf,

        /// Payload as of the last successful sync (.json)
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Save the merged task back to the task file
        #[arg(short, long)]
        write: bool,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the payload a task would be pushed as
    Export {
        /// Task record (.toml)
        task: PathBuf,
    },
    /// Show how a provider's fields map to task fields
    Fields {
        /// Provider name (e.g., "google", "outlook")
        provider: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let cfg = match &cli.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config()?,
    };

    match cli.command {
        Commands::Sync { dir, dry_run } => {
            let root = config::expand_path(dir.as_deref().unwrap_or(&cfg.task_dir));
            commands::sync::run(
                TaskStore::new(root),
                cfg.policy.to_policy()?,
                dry_run,
                cli.verbose > 0,
            )
            .await
        }
        Commands::Reconcile {
            task,
            remote,
            snapshot,
            write,
            json,
        } => {
            let args = commands::reconcile::Args {
                task: &task,
                remote: &remote,
                snapshot: snapshot.as_deref(),
                write,
                json,
            };
            commands::reconcile::run(args, cfg.policy.to_policy()?).await
        }
        Commands::Export { task } => commands::export::run(&task).await,
        Commands::Fields { provider } => commands::fields::run(&provider),
    }
}

/// Log to stderr; RUST_LOG overrides the verbosity flag.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
