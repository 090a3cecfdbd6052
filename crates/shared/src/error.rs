//! # Shared Error Handling Module
//!
//! Error handling for the Triton smoke-test client with a small, explicit
//! classification of what can go wrong during a run.
//!
//! ## Error Categories
//!
//! - **Configuration Errors**: Unsupported model name, unusable server address
//! - **Network Errors**: The gRPC channel could not be established
//! - **RPC Errors**: The inference server answered with a non-OK status
//! - **Response Errors**: The response lacks a requested output or carries
//!   an unexpected datatype
//! - **Internal Errors**: Local failures such as report serialization
//!
//! Validation failures (numeric or shape mismatch) are *not* errors: they are
//! reported in the result records and reflected in the exit code.

use thiserror::Error;

/// Result type alias for smoke-test operations
pub type Result<T> = std::result::Result<T, SmokeError>;

/// Error types for a single smoke-test run
///
/// Network and RPC errors are never handled locally. They propagate up to
/// `main`, which terminates the process with a nonzero status.
#[derive(Error, Debug)]
pub enum SmokeError {
    /// Configuration validation errors
    ///
    /// Raised before any connection is attempted, e.g. for an unsupported
    /// model name or a server address that is not a valid URI.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// Optional source error for additional context
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Channel-level connectivity errors
    #[error("Network error connecting to {target}: {message}")]
    Network {
        /// Endpoint that failed to connect
        target: String,
        /// Descriptive error message
        message: String,
        /// Underlying transport error for debugging
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Non-OK gRPC status returned by the inference server
    #[error("Inference call failed with {code}: {message}")]
    Rpc {
        /// gRPC status code as reported by tonic
        code: tonic::Code,
        /// Status message from the server
        message: String,
    },

    /// The response did not contain what the request asked for
    #[error("Malformed inference response: {message}")]
    Response {
        /// What was missing or malformed
        message: String,
    },

    /// Internal failures unrelated to the remote server
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal failure
        message: String,
        /// Source error for debugging
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl SmokeError {
    /// Creates a configuration error with context
    ///
    /// # Examples
    ///
    /// ```rust
    /// use triton_smoke_shared::error::SmokeError;
    ///
    /// let error = SmokeError::configuration("Failed finding supported model", None);
    /// ```
    pub fn configuration(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source,
        }
    }

    /// Creates a network error with target and context
    ///
    /// # Examples
    ///
    /// ```rust
    /// use triton_smoke_shared::error::SmokeError;
    ///
    /// let error = SmokeError::network("localhost:8001", "Connection refused", None);
    /// ```
    pub fn network(
        target: impl Into<String>,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Network {
            target: target.into(),
            message: message.into(),
            source,
        }
    }

    /// Creates an RPC error from a status code and message
    pub fn rpc(code: tonic::Code, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    /// Creates a response error
    ///
    /// # Examples
    ///
    /// ```rust
    /// use triton_smoke_shared::error::SmokeError;
    ///
    /// let error = SmokeError::response("output 'OUTPUT0' missing from response");
    /// ```
    pub fn response(message: impl Into<String>) -> Self {
        Self::Response {
            message: message.into(),
        }
    }

    /// Creates an internal error with source context
    pub fn internal(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source,
        }
    }

    /// Checks if this error came from talking to the remote server
    ///
    /// Transport failures are the ones the operator fixes on the server
    /// side; everything else is a local problem.
    pub fn is_transport(&self) -> bool {
        match self {
            SmokeError::Network { .. } => true,
            SmokeError::Rpc { .. } => true,
            SmokeError::Configuration { .. } => false,
            SmokeError::Response { .. } => false,
            SmokeError::Internal { .. } => false,
        }
    }
}

/// Conversion from gRPC status returned by a call
impl From<tonic::Status> for SmokeError {
    fn from(status: tonic::Status) -> Self {
        SmokeError::rpc(status.code(), status.message())
    }
}

/// Conversion from JSON serialization errors
impl From<serde_json::Error> for SmokeError {
    fn from(err: serde_json::Error) -> Self {
        SmokeError::internal("Failed to serialize report", Some(Box::new(err)))
    }
}

/// Conversion from I/O errors
///
/// Only connection-shaped I/O failures map to network errors.
impl From<std::io::Error> for SmokeError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::ConnectionReset => {
                SmokeError::network("unknown", "Connection failed", Some(Box::new(err)))
            }
            _ => SmokeError::internal("I/O error", Some(Box::new(err))),
        }
    }
}
