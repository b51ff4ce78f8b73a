use std::path::PathBuf;

use bookings_sync::transfer::{LocalClient, SftpClient, TransferClient};
use bookings_sync::{Pipeline, Result, RunSummary, Settings, ToolError};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging() {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
    if let Err(error) = run(cli) {
        error!(%error, "run failed");
        std::process::exit(error.exit_code());
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(&cli.config)?;
    let summary = match cli.local_root {
        Some(root) => execute(LocalClient::new(root), settings)?,
        None => execute(SftpClient::new(), settings)?,
    };
    if cli.summary {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn execute<C: TransferClient>(client: C, settings: Settings) -> Result<RunSummary> {
    Pipeline::new(client, settings).run()
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Merge booking-export workbooks from an SFTP drop into one CSV."
)]
struct Cli {
    /// JSON file mapping configuration keys to string values.
    #[arg(long, default_value = "bookings.json")]
    config: PathBuf,

    /// Serve the remote paths from this local directory instead of SFTP.
    #[arg(long)]
    local_root: Option<PathBuf>,

    /// Print the run summary as JSON on success.
    #[arg(long)]
    summary: bool,
}
