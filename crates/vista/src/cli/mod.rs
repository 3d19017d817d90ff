//! Command implementations.

pub mod catalog;
pub mod color;
pub mod config;

use clap::ValueEnum;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// A single JSON document
    Json,
    /// One JSON object per line
    Jsonl,
}

impl From<OutputFormat> for vista_core::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => vista_core::OutputFormat::Json,
            OutputFormat::Jsonl => vista_core::OutputFormat::JsonLines,
        }
    }
}
