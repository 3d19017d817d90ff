//! JSON and JSON Lines output of gallery data.
//!
//! Used by the command line front end to print catalogs and sampled colors.

use serde::Serialize;
use std::io::{self, Write};

use crate::types::{Photo, Rgb};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// A single JSON document (array for catalogs)
    Json,
    /// One JSON object per line
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Sampled color of one image, as printed by `vista color`.
#[derive(Debug, Clone, Serialize)]
pub struct ColorReport {
    pub source: String,
    pub hex: String,
    pub css: String,
}

impl ColorReport {
    pub fn new(source: impl Into<String>, color: Rgb) -> Self {
        Self {
            source: source.into(),
            hex: color.to_string(),
            css: color.to_css(),
        }
    }
}

/// Serializes gallery records to a writer.
pub struct CatalogWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    records_written: usize,
}

impl<W: Write> CatalogWriter<W> {
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            records_written: 0,
        }
    }

    /// Write one record as an object (JSON) or a line (JSONL).
    pub fn write_record<T: Serialize>(&mut self, record: &T) -> io::Result<()> {
        if self.pretty && self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut self.writer, record).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, record).map_err(io::Error::other)?;
        }
        writeln!(self.writer)?;
        self.records_written += 1;
        Ok(())
    }

    /// Write a photo list: one array for JSON, one line per photo for JSONL.
    pub fn write_photos(&mut self, photos: &[Photo]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, photos)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, photos).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
                self.records_written += photos.len();
            }
            OutputFormat::JsonLines => {
                for photo in photos {
                    self.write_record(photo)?;
                }
            }
        }
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
