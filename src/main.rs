use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fixpls::commands::{login, logout, parse_invocation, run_repair, split_args};
use fixpls::core::FileCredentialStore;
use fixpls::error::FixplsError;
use fixpls::models::ConfigOverrides;

/// fixpls - run a command and let a completion model fix what it reports
#[derive(Parser)]
#[command(name = "fixpls")]
#[command(author, version, about, long_about = None)]
#[command(override_usage = "fixpls [OPTIONS] -- <COMMAND> [ARGS]...\n       fixpls <login|logout>")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Override the model to use
    #[arg(long)]
    model: Option<String>,

    /// Override the completion service base URL
    #[arg(long)]
    url: Option<String>,

    /// Override the request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Override the maximum number of runs of the wrapped command
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Run even when the git working tree has uncommitted changes
    #[arg(long)]
    allow_dirty: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Store the completion service API key
    Login,

    /// Remove the stored API key
    Logout,
}

#[tokio::main]
async fn main() {
    let (own, wrapped) = split_args(std::env::args());

    let cli = match Cli::try_parse_from(own) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            // `fixpls tsc` without the separator is reported as a missing separator
            match wrapped {
                None => {
                    if let Err(usage) = parse_invocation(None) {
                        eprintln!("Error: {}", usage);
                    }
                }
                Some(_) => eprintln!("{}", e),
            }
            std::process::exit(1);
        }
    };

    // Set up logging
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run(cli, wrapped).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli, wrapped: Option<Vec<String>>) -> Result<(), FixplsError> {
    match cli.command {
        Some(Commands::Login) => login(&FileCredentialStore::default_location()?),
        Some(Commands::Logout) => logout(&FileCredentialStore::default_location()?),
        None => {
            let project_root = std::env::current_dir()?;
            let overrides = ConfigOverrides {
                model: cli.model,
                url: cli.url,
                timeout: cli.timeout,
                max_iterations: cli.max_iterations,
                allow_dirty: cli.allow_dirty,
            };
            run_repair(
                &project_root,
                wrapped,
                overrides,
                FileCredentialStore::default_location,
            )
            .await?;
            Ok(())
        }
    }
}
