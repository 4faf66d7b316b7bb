//! Terraform variable snippet for an existing log sink

use crate::gcp::logging::LogSink;

/// Location used when the dataset could not be read
pub const DEFAULT_FALLBACK_LOCATION: &str = "us-east4";

/// Marker written next to values that were not read from the dataset itself
pub const UNVERIFIED_MARKER: &str = "UNVERIFIED";

const RULE: &str = "# =============================================================================";

/// Render the `existing_bigquery_dataset` assignment for a sink.
///
/// With dataset metadata attached the location comes from the dataset; without
/// it, `fallback_location` is used and the output is marked unverified.
pub fn render_tfvars(sink: &LogSink, fallback_location: &str) -> String {
    let metadata = sink.dataset_metadata.as_ref();
    let project_id = sink.bq_project_id.as_deref().unwrap_or("PROJECT_ID");
    let dataset_id = sink.bq_dataset_id.as_deref().unwrap_or("DATASET_ID");

    let mut lines: Vec<String> = vec![
        RULE.to_string(),
        format!("# Configuration for existing log sink: {}", sink.name),
        RULE.to_string(),
        "# Add these to your terraform.tfvars file:".to_string(),
        String::new(),
    ];

    let verified_location = metadata.and_then(|info| info.location.as_deref());
    let location_line = match verified_location {
        Some(location) => format!(
            "  location     = \"{}\"  # Optional: can be omitted to use client_main_location",
            location
        ),
        None => {
            let reason = if metadata.is_some() {
                "dataset details carry no location"
            } else {
                "could not fetch dataset details (access issue or different org)"
            };
            lines.push(format!("# {}: {}", UNVERIFIED_MARKER, reason));
            lines.push("# Verify the location below and adjust values as needed".to_string());
            lines.push(String::new());
            format!(
                "  location     = \"{}\"  # {}: verify this location or omit to use client_main_location",
                fallback_location, UNVERIFIED_MARKER
            )
        }
    };

    lines.extend([
        "# Use existing BigQuery dataset (instead of creating a new one)".to_string(),
        "existing_bigquery_dataset = {".to_string(),
        format!("  dataset_name = \"{}\"", dataset_id),
        format!("  project_id   = \"{}\"", project_id),
        location_line,
        "}".to_string(),
        String::new(),
        "# Optional: Configure organization audit log types".to_string(),
        "# organization_audit_logs = {".to_string(),
        "#   log_configuration = {".to_string(),
        "#     \"ADMIN_READ\"  = true   # Track admin operations (recommended)".to_string(),
        "#     \"DATA_READ\"   = false  # High volume, enable only if needed".to_string(),
        "#     \"DATA_WRITE\"  = true   # Track data modifications (recommended)".to_string(),
        "#   }".to_string(),
        "# }".to_string(),
    ]);

    if let Some(info) = metadata {
        lines.push(String::new());
        lines.push("# Dataset metadata (for reference):".to_string());
        lines.push(format!(
            "#   Created: {}",
            info.created
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "N/A".to_string())
        ));
        lines.push(format!("#   Location: {}", info.location.as_deref().unwrap_or("N/A")));
        if let Some(description) = &info.description {
            push_comment(&mut lines, "#   Description: ", description);
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Free text from the API becomes one comment line per source line so it
/// cannot end up as a live assignment.
fn push_comment(lines: &mut Vec<String>, prefix: &str, text: &str) {
    let mut rest = text.split(['\n', '\r']).filter(|line| !line.is_empty());
    lines.push(format!("{}{}", prefix, rest.next().unwrap_or_default()));
    lines.extend(rest.map(|line| format!("#     {}", line)));
}
