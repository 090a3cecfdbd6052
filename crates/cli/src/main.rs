//! # Triton Smoke - Main Entry Point

use clap::Parser;
use std::process::ExitCode;
use triton_smoke::SmokeCliOptions;
use triton_smoke_shared::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = SmokeCliOptions::parse();
    cli.logging.init_logging();

    let code = cli.run().await?;
    Ok(ExitCode::from(code))
}
