//! synthd wire protocol
//!
//! Message types for the `synthd.SynthesisService` gRPC service. The messages
//! are declared by hand with prost derives; the service and client stubs are
//! generated by `build.rs`.
//!
//! ```text
//! service SynthesisService {
//!   rpc Compile(CompileRequest) returns (CompileResponse);
//! }
//! ```

use serde::{Deserialize, Serialize};

/// A single synthesis request: a Verilog module and the clock it must meet.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileRequest {
    /// Verilog source text
    #[prost(string, tag = "1")]
    pub module_text: String,

    /// Name of the top module (empty means unspecified)
    #[prost(string, tag = "2")]
    pub top_module_name: String,

    /// Requested clock frequency in Hz
    #[prost(int64, tag = "3")]
    pub target_frequency_hz: i64,
}

/// Timing verdict for a successful compile.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileResponse {
    /// Requested period minus achievable period, in picoseconds.
    /// Non-negative means timing is met.
    #[prost(int64, tag = "1")]
    pub slack_ps: i64,

    /// Maximum frequency the design can achieve, in Hz
    #[prost(int64, tag = "2")]
    pub max_frequency_hz: i64,

    /// True when the backend result does not depend on the target frequency
    #[prost(bool, tag = "3")]
    pub insensitive_to_target_freq: bool,

    /// Wall time spent in the backend
    #[prost(int64, tag = "4")]
    pub elapsed_time_ms: i64,

    /// Backend diagnostics
    #[prost(string, repeated, tag = "5")]
    pub diagnostics: Vec<String>,
}

include!(concat!(env!("OUT_DIR"), "/synthd.SynthesisService.rs"));

pub use synthesis_service_client::SynthesisServiceClient;
pub use synthesis_service_server::{SynthesisService, SynthesisServiceServer};
