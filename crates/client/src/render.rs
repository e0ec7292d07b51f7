//! Response rendering
//!
//! `Text` mirrors protobuf text format, one `field: value` per line, so the
//! output can be fed back through a text-format parser. `Json` is for
//! scripts.

use clap::ValueEnum;
use std::fmt::Write;
use synthd_common::Result;
use synthd_proto::CompileResponse;

/// Output format for a compile response
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Protobuf text format
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Render a response in the requested format
pub fn render(response: &CompileResponse, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(response)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(response)?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn render_text(response: &CompileResponse) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "slack_ps: {}", response.slack_ps);
    let _ = writeln!(out, "max_frequency_hz: {}", response.max_frequency_hz);
    let _ = writeln!(
        out,
        "insensitive_to_target_freq: {}",
        response.insensitive_to_target_freq
    );
    let _ = writeln!(out, "elapsed_time_ms: {}", response.elapsed_time_ms);
    for diagnostic in &response.diagnostics {
        let _ = writeln!(out, "diagnostics: \"{}\"", escape(diagnostic));
    }
    out
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c => escaped.push(c),
        }
    }
    escaped
}
