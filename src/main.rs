//! ssh-exec - Entry point
//!
//! Parses CLI arguments, validates configuration, runs the command on the
//! remote host and prints the report. Any failure is logged to stderr and
//! the process exits non-zero with nothing written to stdout.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ssh_exec::config::{normalize_flag_style, Args, Config};
use ssh_exec::error::Result;
use ssh_exec::runner::Runner;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr (stdout is for the command output)
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse_from(normalize_flag_style(std::env::args_os()));

    // Validate and create config
    let config = Config::from_args(args)?;

    let report = Runner::ssh().run(&config).await?;

    report.write_to(std::io::stdout().lock())?;

    Ok(())
}
