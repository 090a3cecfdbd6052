//! CLI options for the Triton smoke-test client
//!
//! The positional model name selects the scenario; everything else has a
//! default so a bare `triton-smoke python` runs against a local server.

use crate::client::{InferenceServerClient, InferenceService};
use crate::config::{SmokeConfig, DEFAULT_SERVER};
use crate::report::write_report;
use crate::scenario::Scenario;
use clap::Parser;
use std::io::Write;
use tracing::{info, warn};
use triton_smoke_shared::{LoggingOptions, Result, SmokeError};

/// Message printed when the model argument names no known scenario
pub const UNSUPPORTED_MODEL_MESSAGE: &str = "Failed finding supported model";

/// Triton smoke tests - validate a model backend with one inference call
#[derive(Parser, Debug, Clone)]
#[command(name = "triton-smoke", author, version, about, long_about = None)]
pub struct SmokeCliOptions {
    /// Model that will be used with the client
    /// (python, openvino, onnxruntime, onnxruntime_gpu, tensorrt)
    pub model: String,

    /// Host that will be used for the gRPC client (e.g.: localhost:8001)
    #[arg(
        short,
        long,
        default_value = DEFAULT_SERVER,
        env = "TRITON_SMOKE_SERVER"
    )]
    pub server: String,

    /// Seed for the random input tensors, for reproducible runs
    #[arg(long, env = "TRITON_SMOKE_SEED")]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub logging: LoggingOptions,
}

impl SmokeCliOptions {
    /// Run the selected scenario and return the process exit code
    ///
    /// An unsupported model name exits with 1 before any connection is
    /// made. Transport errors are returned to the caller.
    pub async fn run(self) -> Result<u8> {
        self.run_to(&mut std::io::stdout()).await
    }

    /// Like [`run`](Self::run), writing the report to `out` instead of stdout
    pub async fn run_to<W>(self, out: &mut W) -> Result<u8>
    where
        W: Write + Send + ?Sized,
    {
        let config = match self.to_config() {
            Ok(config) => config,
            Err(SmokeError::Configuration { message, .. }) => {
                warn!("{}", message);
                writeln!(out, "{}", UNSUPPORTED_MODEL_MESSAGE)?;
                out.flush()?;
                return Ok(1);
            }
            Err(e) => return Err(e),
        };

        info!(
            server = %config.server,
            model = %config.scenario,
            seed = ?config.seed,
            "Starting smoke test"
        );

        let code = {
            let mut client = InferenceServerClient::connect(&config.server).await?;
            run_with_service(&config, &mut client, out).await?
        };
        Ok(code)
    }

    /// Convert CLI options to a validated SmokeConfig
    pub fn to_config(&self) -> Result<SmokeConfig> {
        let scenario: Scenario = self.model.parse()?;
        Ok(SmokeConfig {
            server: self.server.clone(),
            scenario,
            seed: self.seed,
        })
    }
}

/// Runs the configured scenario over an existing service handle, writes the
/// report to `out` and returns the exit code
pub async fn run_with_service<S, W>(
    config: &SmokeConfig,
    service: &mut S,
    out: &mut W,
) -> Result<u8>
where
    S: InferenceService + ?Sized,
    W: Write + Send + ?Sized,
{
    let mut rng = config.rng();
    let outcome = config.scenario.run(service, &mut rng).await?;
    write_report(out, &outcome.records)?;
    Ok(outcome.exit_code())
}
