//! Sink destination parsing

/// Marker present in every BigQuery sink destination
pub const BIGQUERY_MARKER: &str = "bigquery.googleapis.com";

/// Dataset a sink exports into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigQueryTarget {
    pub project_id: String,
    pub dataset_id: String,
}

/// Extract `(project, dataset)` from a destination such as
/// `bigquery.googleapis.com/projects/acme/datasets/audit_logs`.
///
/// Storage buckets, Pub/Sub topics and logging buckets are not an error,
/// they just yield `None`.
pub fn parse_destination(destination: &str) -> Option<BigQueryTarget> {
    if !destination.contains(BIGQUERY_MARKER) {
        return None;
    }

    let path = destination.replace(&format!("{}/", BIGQUERY_MARKER), "");
    let parts: Vec<&str> = path.split('/').collect();

    match parts.as_slice() {
        ["projects", project, "datasets", dataset] if !project.is_empty() && !dataset.is_empty() => {
            Some(BigQueryTarget {
                project_id: project.to_string(),
                dataset_id: dataset.to_string(),
            })
        }
        _ => None,
    }
}
