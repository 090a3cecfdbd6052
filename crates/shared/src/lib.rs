//! # Triton Smoke Shared Library
//!
//! Shared error handling and command-line option groups for the Triton
//! smoke-test client.

pub mod cli;
pub mod error;

pub use cli::LoggingOptions;
pub use error::{Result, SmokeError};
