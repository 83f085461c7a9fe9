//! Presentation of demo results. Reads return records; this module is the
//! only place that turns them into text or JSON.

use crate::core::db::Record;
use crate::core::Result;
use serde::{Deserialize, Serialize};

const WIDTH: usize = 54;

/// Output format for a rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Banner per section, one tuple per row, separator lines
    #[default]
    Text,
    /// A JSON array of sections
    Json,
}

/// The records returned by one read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub records: Vec<Record>,
}

impl Section {
    pub fn new(title: impl Into<String>, records: Vec<Record>) -> Self {
        Section {
            title: title.into(),
            records,
        }
    }
}

/// Every section produced by a demo run, in execution order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Report {
    pub sections: Vec<Section>,
}

impl Report {
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(render_text(self)),
            OutputFormat::Json => render_json(self),
        }
    }
}

/// Renders the report the way the console scripts printed it
pub fn render_text(report: &Report) -> String {
    let separator = "-".repeat(WIDTH);
    let mut out = String::new();
    for section in &report.sections {
        out.push_str(&format!("{:/^width$}\n", section.title, width = WIDTH));
        for record in &section.records {
            out.push_str(&format!("{record}\n"));
            out.push_str(&separator);
            out.push('\n');
        }
    }
    out
}

pub fn render_json(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
