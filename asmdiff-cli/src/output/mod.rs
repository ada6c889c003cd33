//! Rendering of command reports as table, JSON or CSV.
//!
//! A report is a list of rows, each filed under a group (the type a
//! difference or signature belongs to). Tables print one block per group,
//! CSV flattens the rows, JSON serializes the report itself.

use clap::ValueEnum;
use serde::Serialize;
use std::io::IsTerminal;
use std::str::FromStr;

mod csv;
mod json;
mod table;

pub use self::csv::to_csv;
pub use self::json::to_json;
pub use self::table::{grouped_table, summary_table};

/// Output format for CLI results
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Grouped, colored tables (default)
    #[default]
    Table,
    /// The full report as JSON
    Json,
    /// One line per row
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: '{}'", s)),
        }
    }
}

/// How a report is printed.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color: bool,
    /// Wrap tables to the terminal width
    pub wrap: bool,
    pub compact: bool,
}

impl OutputConfig {
    /// Plain output: no color, no wrapping.
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: false,
            wrap: false,
            compact: false,
        }
    }

    /// Color and wrapping follow whether stdout is a terminal. A configured
    /// color preference overrides the detection.
    pub fn detect(format: OutputFormat, color_override: Option<bool>) -> Self {
        let is_tty = std::io::stdout().is_terminal();
        Self {
            color: color_override.unwrap_or(is_tty),
            wrap: is_tty,
            ..Self::new(format)
        }
    }

    /// Width tables are wrapped to, if wrapping is on.
    pub fn wrap_width(&self) -> Option<usize> {
        if !self.wrap {
            return None;
        }
        let width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(100);
        Some(width)
    }
}

/// One line of tabular output.
pub trait Row {
    const HEADERS: &'static [&'static str];

    /// Heading the row is listed under in tables.
    fn group(&self) -> &str;

    /// Cell text, one per header.
    fn cells(&self) -> Vec<String>;
}

/// A command result printable in every format.
pub trait Report: Serialize {
    fn to_table(&self, config: &OutputConfig) -> String;

    fn to_csv(&self) -> String;

    fn render(&self, config: &OutputConfig) -> String {
        match config.format {
            OutputFormat::Table => self.to_table(config),
            OutputFormat::Json => to_json(self, config.compact),
            OutputFormat::Csv => self.to_csv(),
        }
    }

    fn print(&self, config: &OutputConfig) {
        println!("{}", self.render(config));
    }
}
