//! Console output
//!
//! Human-readable rendering of discovery results plus the structured
//! (JSON/YAML) output modes.

use crate::gcp::bigquery::DatasetInfo;
use crate::gcp::logging::LogSink;
use crate::gcp::organizations::Organization;
use anyhow::Result;
use clap::ValueEnum;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use crossterm::style::Stylize;
use serde::Serialize;
use std::io::{self, Write};

/// Filters longer than this are cut in the sink tree
const MAX_FILTER_DISPLAY: usize = 80;

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

/// Serialize results for the structured output modes
pub fn to_structured<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Json | OutputFormat::Text => serde_json::to_string_pretty(value)?,
    })
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max).collect::<String>())
    }
}

/// Organizations as an aligned table
pub fn write_organizations<W: Write>(out: &mut W, orgs: &[Organization]) -> io::Result<()> {
    if orgs.is_empty() {
        writeln!(out, "{}", "No organizations found or insufficient permissions".yellow())?;
        writeln!(out)?;
        writeln!(out, "Make sure you have:")?;
        writeln!(out, "  1. Run: gcloud auth application-default login")?;
        writeln!(out, "  2. Have roles/resourcemanager.organizationViewer permission")?;
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Organization ID").fg(Color::Magenta),
        Cell::new("Display Name").fg(Color::Magenta),
        Cell::new("State").fg(Color::Magenta),
    ]);
    for org in orgs {
        table.add_row(vec![
            Cell::new(&org.id).fg(Color::Cyan),
            Cell::new(&org.display_name).fg(Color::Green),
            Cell::new(org.state.as_str()).fg(Color::Yellow),
        ]);
    }

    writeln!(out, "{}", "Available GCP Organizations".bold())?;
    writeln!(out, "{}", table)?;
    writeln!(out)?;
    writeln!(out, "{}", format!("Found {} organization(s)", orgs.len()).dim())
}

/// Sinks as an indented tree
pub fn write_sinks<W: Write>(out: &mut W, sinks: &[LogSink], audit_only: bool) -> io::Result<()> {
    if sinks.is_empty() {
        return writeln!(out, "{}", "No log sinks found".yellow());
    }

    let title = if audit_only { "CloudAudit Log Sinks" } else { "All Log Sinks" };
    writeln!(out, "{}", title.bold())?;

    for sink in sinks {
        writeln!(out, "├── {}", sink.name.as_str().cyan())?;
        writeln!(out, "│   ├── {} {}", "Destination:".dim(), sink.destination)?;
        writeln!(out, "│   ├── {} {}", "Include Children:".dim(), sink.include_children)?;
        writeln!(out, "│   ├── {} {}", "Writer Identity:".dim(), sink.writer_identity)?;
        if !sink.filter.is_empty() {
            writeln!(
                out,
                "│   ├── {} {}",
                "Filter:".dim(),
                truncate(&sink.filter, MAX_FILTER_DISPLAY)
            )?;
        }

        if let Some((project_id, dataset_id)) = sink.bigquery_ids() {
            writeln!(out, "│   └── {}", "BigQuery Details".green())?;
            writeln!(out, "│       ├── {} {}", "Project ID:".dim(), project_id)?;
            writeln!(out, "│       ├── {} {}", "Dataset ID:".dim(), dataset_id)?;
            if let Some(info) = &sink.dataset_metadata {
                if let Some(location) = &info.location {
                    writeln!(out, "│       ├── {} {}", "Location:".dim(), location)?;
                }
                writeln!(out, "│       ├── {} {}", "Created:".dim(), format_time(info.created))?;
                if let Some(description) = &info.description {
                    writeln!(out, "│       ├── {} {}", "Description:".dim(), description)?;
                }
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", format!("Found {} log sink(s)", sinks.len()).dim())
}

fn format_time(time: Option<chrono::DateTime<chrono::Utc>>) -> String {
    time.map(|t| t.to_rfc3339()).unwrap_or_else(|| "N/A".to_string())
}

/// One dataset as a property table
pub fn write_dataset<W: Write>(out: &mut W, info: Option<&DatasetInfo>) -> io::Result<()> {
    let Some(info) = info else {
        return writeln!(out, "{}", "Dataset not found or insufficient permissions".yellow());
    };

    let mut rows: Vec<(&str, String)> = vec![
        ("Project ID", info.project_id.clone()),
        ("Dataset ID", info.dataset_id.clone()),
        ("Location", info.location.clone().unwrap_or_else(|| "N/A".to_string())),
        ("Created", format_time(info.created)),
        ("Modified", format_time(info.modified)),
        ("Full Dataset ID", info.full_dataset_id.clone()),
    ];
    if let Some(description) = &info.description {
        rows.push(("Description", description.clone()));
    }
    if let Some(friendly_name) = &info.friendly_name {
        rows.push(("Friendly Name", friendly_name.clone()));
    }
    if let Some(ms) = info.default_table_expiration_ms {
        rows.push(("Table Expiration", format!("{} ms", ms)));
    }
    if !info.labels.is_empty() {
        let labels = info
            .labels
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        rows.push(("Labels", labels));
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    for (property, value) in rows {
        table.add_row(vec![Cell::new(property).fg(Color::Cyan), Cell::new(value)]);
    }

    writeln!(out, "{}", "BigQuery Dataset Information".bold())?;
    writeln!(out, "{}", table)
}
