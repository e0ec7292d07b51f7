//! Common error types for synthd
//!
//! Every failure a compile request can hit is a `ServiceError`. Errors are
//! convertible to gRPC status codes so the server never has to invent a
//! response body for a failed request.

use thiserror::Error;

/// Main error type for synthd
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Request failed validation (empty source, non-positive frequency)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Backend could not produce a timing result
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Status returned by the remote peer
    #[error("gRPC error: {0}")]
    Grpc(#[from] tonic::Status),

    /// gRPC transport errors
    #[error("gRPC transport error: {0}")]
    GrpcTransport(#[from] tonic::transport::Error),

    /// Connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request did not complete within the client's timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<::config::ConfigError> for ServiceError {
    fn from(err: ::config::ConfigError) -> Self {
        ServiceError::Config(err.to_string())
    }
}

impl ServiceError {
    /// Convert error to gRPC status code
    pub fn to_status(&self) -> tonic::Status {
        match self {
            ServiceError::InvalidArgument(msg) => tonic::Status::invalid_argument(msg.clone()),
            ServiceError::Synthesis(msg) => {
                tonic::Status::internal(format!("Synthesis failed: {}", msg))
            }
            ServiceError::Config(msg) => {
                tonic::Status::internal(format!("Configuration error: {}", msg))
            }
            ServiceError::Grpc(status) => status.clone(),
            ServiceError::GrpcTransport(_) => tonic::Status::unavailable("Transport error"),
            ServiceError::Connection(msg) => {
                tonic::Status::unavailable(format!("Connection error: {}", msg))
            }
            ServiceError::Timeout(msg) => {
                tonic::Status::deadline_exceeded(format!("Timeout: {}", msg))
            }
            ServiceError::Io(err) => tonic::Status::internal(format!("I/O error: {}", err)),
            ServiceError::Serialization(err) => {
                tonic::Status::internal(format!("Serialization error: {}", err))
            }
            ServiceError::Internal(msg) => {
                tonic::Status::internal(format!("Internal error: {}", msg))
            }
        }
    }

    /// Status code this error maps to
    pub fn code(&self) -> tonic::Code {
        self.to_status().code()
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        ServiceError::InvalidArgument(msg.into())
    }

    /// Create a synthesis error
    pub fn synthesis(msg: impl Into<String>) -> Self {
        ServiceError::Synthesis(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        ServiceError::Config(msg.into())
    }

    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        ServiceError::Connection(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        ServiceError::Timeout(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        ServiceError::Internal(msg.into())
    }
}

/// Result type alias for synthd operations
pub type Result<T> = std::result::Result<T, ServiceError>;
