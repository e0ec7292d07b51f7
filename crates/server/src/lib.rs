//! synthd server
//!
//! Synthesis estimation service: accepts Verilog plus a target clock, asks a
//! timing backend for the design's maximum frequency and answers with the
//! timing slack at the requested clock.

pub mod backend;
pub mod grpc;
pub mod service;
pub mod slack;

pub use backend::{FakeBackend, SynthesisInput, TimingModel, TimingReport};
pub use grpc::SynthesisServer;
pub use service::SynthesisService;
pub use slack::{slack_ps, timing_met};
