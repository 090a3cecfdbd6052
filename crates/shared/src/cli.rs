//! Shared CLI functionality
//!
//! Option groups that are flattened into the smoke-test command line.

use clap::Args;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Common logging options
#[derive(Args, Debug, Clone)]
pub struct LoggingOptions {
    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", env = "TRITON_SMOKE_LOG_LEVEL")]
    pub log_level: String,
}

impl LoggingOptions {
    /// Initialize logging with the configured level
    ///
    /// Logs go to stderr; stdout is reserved for the JSON report.
    pub fn init_logging(&self) {
        let level = self.parse_log_level();

        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();

        // A subscriber may already be installed (tests, embedding callers)
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            tracing::debug!("Global tracing subscriber already set");
        }
    }

    /// Parse the log level string into a tracing Level
    pub fn parse_log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::WARN,
        }
    }
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}
