use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::pipeline::Document;

/// Machine-readable report envelope written at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEnvelope {
    /// Unique id of the pipeline run that produced the report.
    pub run_id: String,
    pub ticker: String,
    /// Domain of the report ("technical" or "esg").
    pub domain: String,
    /// Shape the report document was validated against.
    pub shape: String,
    /// RFC 3339 timestamp of report completion.
    pub generated_at: String,
    /// The root document itself.
    pub report: Value,
}

impl ReportEnvelope {
    pub fn new(ticker: &str, domain: &str, document: &Document) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            ticker: ticker.to_string(),
            domain: domain.to_string(),
            shape: document.shape.clone(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            report: document.value.clone(),
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Human-readable rendering of a report document.
pub struct HumanReport<'a> {
    document: &'a Document,
}

impl<'a> HumanReport<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Format the report as indented text, one line per field.
    pub fn format(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n", self.document.shape));
        out.push_str(&format!("{}\n\n", "=".repeat(self.document.shape.len())));
        render_value(&self.document.value, 0, &mut out);
        out
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

fn render_value(value: &Value, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(map) => {
            for (key, member) in map {
                match member {
                    Value::Object(_) => {
                        out.push_str(&format!("{}{}:\n", indent, key));
                        render_value(member, depth + 1, out);
                    }
                    Value::Null => {}
                    other => out.push_str(&format!("{}{}: {}\n", indent, key, scalar(other))),
                }
            }
        }
        other => out.push_str(&format!("{}{}\n", indent, scalar(other))),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
