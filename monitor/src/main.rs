use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use common::logger::init_logger;
use monitor::AppConfig;
use monitor::startup::{self, EXIT_STARTUP_FAILURE};

#[derive(Debug, Parser)]
#[clap(name = "spread-alert", version)]
struct Cli {
    /// Load variables from this file instead of `./.env`
    #[clap(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Before logging so APP_ENV and RUST_LOG can come from the file.
    let env_file = startup::load_env_file(cli.env_file.as_deref());

    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    init_logger("spread-alert", is_production);

    match env_file {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "environment file loaded"),
        Ok(None) => tracing::debug!("no .env file; using process environment"),
        Err(e) => {
            tracing::error!(error = %e, "cannot load environment file");
            return ExitCode::from(EXIT_STARTUP_FAILURE);
        }
    }

    let outcome = startup::run(AppConfig::from_env()).await;
    if let Err(e) = &outcome {
        tracing::error!(error = ?e, "startup failed");
    }

    ExitCode::from(startup::exit_status(&outcome))
}
