//! Smoke-test run configuration

use crate::scenario::Scenario;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Default gRPC endpoint of a local Triton server
pub const DEFAULT_SERVER: &str = "localhost:8001";

/// Validated configuration for a single run
#[derive(Debug, Clone, PartialEq)]
pub struct SmokeConfig {
    /// Inference server endpoint, `host:port` or a full URI
    pub server: String,
    /// Scenario selected by the model name argument
    pub scenario: Scenario,
    /// Seed for input generation; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            scenario: Scenario::Python,
            seed: None,
        }
    }
}

impl SmokeConfig {
    /// Random source for input tensors
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
