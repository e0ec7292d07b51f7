//! gRPC server for the synthesis service

pub mod server;

pub use server::SynthesisServer;
