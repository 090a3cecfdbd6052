//! # Triton Smoke
//!
//! Smoke-test client for Triton Inference Server model backends. One run
//! sends a single hand-crafted request to one preconfigured model, checks
//! the returned tensors against a closed-form expectation and prints a JSON
//! pass/fail report.
//!
//! ## Usage
//!
//! ```bash
//! # Sum/difference check against the python backend on a local server
//! triton-smoke python
//!
//! # Shape check against the openvino backend on a remote server
//! triton-smoke openvino --server triton.internal:8001
//! ```
//!
//! Exit status is the number of failed checks (0-2 for `python`, 0-1
//! otherwise), or 1 for an unsupported model name.

pub mod cli_options;
pub mod client;
pub mod config;
pub mod proto;
pub mod report;
pub mod scenario;
pub mod tensor;

pub use cli_options::SmokeCliOptions;
pub use client::{
    InferInput, InferRequestedOutput, InferResult, InferenceServerClient, InferenceService,
};
pub use config::SmokeConfig;
pub use report::ResultRecord;
pub use scenario::{Scenario, ScenarioOutcome};
pub use tensor::Tensor;
pub use triton_smoke_shared::{Result, SmokeError};
