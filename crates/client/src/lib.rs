//! synthd client
//!
//! One-shot client for the synthesis service: connect, send a single compile
//! request, render the verdict.

pub mod client;
pub mod render;

pub use client::SynthesisClient;
pub use render::{render, OutputFormat};
