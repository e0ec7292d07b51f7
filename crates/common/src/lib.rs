//! synthd common library
//!
//! Shared code for the synthesis server and client: the error taxonomy,
//! layered configuration, frequency values and compile metrics.

pub mod config;
pub mod error;
pub mod frequency;
pub mod metrics;

// Re-export commonly used types
pub use crate::config::{BackendConfig, ClientConfig, ObservabilityConfig, ServerConfig};
pub use error::{Result, ServiceError};
pub use frequency::{Frequency, ParseFrequencyError};
pub use metrics::{MetricsRegistry, RequestGuard, METRICS};
