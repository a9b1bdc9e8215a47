//! facelog - face attendance from the command line.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{ConfigCommand, IdentifyCommand, LogsCommand, RegisterCommand, RunCommand, UsersCommand};

/// facelog - face attendance from the command line.
///
/// Embeddings are read as JSON; producing them (camera capture, face
/// detection, model inference) is up to the caller.
///
/// Configuration is stored in ~/.facelog/config.yaml.
#[derive(Parser)]
#[command(name = "facelog")]
#[command(about = "Face embedding matching and attendance logging")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.facelog/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Database file (overrides config file)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Output as JSON (default: YAML)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show or initialize configuration
    Config(ConfigCommand),
    /// Enroll a person from embedding samples
    Register(RegisterCommand),
    /// Match a single probe embedding
    Identify(IdentifyCommand),
    /// Run an attendance session over a stream of frames
    Run(RunCommand),
    /// List registered people
    Users(UsersCommand),
    /// List attendance records, newest first
    Logs(LogsCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Config(cmd) => cmd.run(&cli),
        Commands::Register(cmd) => cmd.run(&cli).await,
        Commands::Identify(cmd) => cmd.run(&cli).await,
        Commands::Run(cmd) => cmd.run(&cli).await,
        Commands::Users(cmd) => cmd.run(&cli).await,
        Commands::Logs(cmd) => cmd.run(&cli).await,
    }
}
