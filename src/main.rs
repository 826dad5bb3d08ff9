use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use twig::commands;

#[derive(Parser)]
#[command(name = "twig")]
#[command(about = "Minimal content-addressable version control")]
#[command(version = "0.1.0")]
struct Cli {
    /// Run as if started in <dir>
    #[arg(short = 'C', global = true, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty repository
    Init,
    /// Stage file contents for the next commit
    Add {
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Record the staged files as a new commit
    Commit { message: String },
    /// Show commit history, newest first
    Log {
        #[arg(long)]
        oneline: bool,
        #[arg(short = 'n', long = "max-count")]
        max_count: Option<usize>,
    },
    /// Show a commit's changes against its parent
    Show { commit: String },
    /// Show HEAD and the staged files
    Status,
    /// Read or write settings
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root = cli.dir.as_path();

    match cli.command {
        Commands::Init => commands::init::run(root).await,
        Commands::Add { files } => commands::add::run(root, files).await,
        Commands::Commit { message } => commands::commit::run(root, message).await,
        Commands::Log { oneline, max_count } => commands::log::run(root, oneline, max_count).await,
        Commands::Show { commit } => commands::show::run(root, &commit).await,
        Commands::Status => commands::status::run(root).await,
        Commands::Config { action } => commands::config::run(root, &action).await,
    }
}
