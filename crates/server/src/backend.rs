//! Timing backends
//!
//! A backend turns a hardware description into the maximum frequency the
//! design can run at. Real synthesis and static timing analysis plug in
//! behind [`TimingModel`]; [`FakeBackend`] reports a fixed frequency and is
//! what `fake_synthesis_server` serves.

use synthd_common::{BackendConfig, Frequency, Result, ServiceError};
use tracing::debug;

/// What a backend is asked to synthesize
#[derive(Debug, Clone, Copy)]
pub struct SynthesisInput<'a> {
    /// Verilog source text
    pub module_text: &'a str,

    /// Top module, if the caller named one
    pub top_module_name: Option<&'a str>,

    /// Clock the caller wants to meet
    pub target_frequency: Frequency,
}

/// Successful backend result
#[derive(Debug, Clone, PartialEq)]
pub struct TimingReport {
    /// Maximum frequency the design achieves
    pub max_frequency: Frequency,

    /// The result would be the same for any target frequency
    pub insensitive_to_target_freq: bool,

    /// Free-form backend diagnostics
    pub diagnostics: Vec<String>,
}

/// Synthesis and timing analysis engine
#[tonic::async_trait]
pub trait TimingModel: Send + Sync + 'static {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// Synthesize the design and report its maximum frequency.
    ///
    /// Returns `ServiceError::Synthesis` when no timing result can be
    /// produced.
    async fn synthesize(&self, input: &SynthesisInput<'_>) -> Result<TimingReport>;
}

/// Deterministic backend reporting one fixed maximum frequency
#[derive(Debug, Clone)]
pub struct FakeBackend {
    max_frequency: Frequency,
    serve_errors: bool,
}

impl FakeBackend {
    /// Create a fake backend; the frequency must be positive
    pub fn new(max_frequency: Frequency, serve_errors: bool) -> Result<Self> {
        if !max_frequency.is_valid() {
            return Err(ServiceError::config(format!(
                "fake backend max frequency must be positive, got {} Hz",
                max_frequency.hz()
            )));
        }
        Ok(Self {
            max_frequency,
            serve_errors,
        })
    }

    /// Create a fake backend from startup configuration
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Self::new(config.max_frequency(), config.serve_errors)
    }

    /// Configured maximum frequency
    pub fn max_frequency(&self) -> Frequency {
        self.max_frequency
    }

    /// Whether every request fails
    pub fn serves_errors(&self) -> bool {
        self.serve_errors
    }
}

#[tonic::async_trait]
impl TimingModel for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    async fn synthesize(&self, input: &SynthesisInput<'_>) -> Result<TimingReport> {
        if self.serve_errors {
            debug!("Fake backend configured to fail");
            return Err(ServiceError::synthesis(
                "fake backend is configured to serve errors",
            ));
        }

        debug!(
            "Fake backend reporting {} for {} bytes of source",
            self.max_frequency,
            input.module_text.len()
        );

        Ok(TimingReport {
            max_frequency: self.max_frequency,
            insensitive_to_target_freq: true,
            diagnostics: Vec::new(),
        })
    }
}
