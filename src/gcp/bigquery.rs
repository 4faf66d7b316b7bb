//! BigQuery datasets
//!
//! Dataset metadata lookup through the BigQuery v2 REST API.

use super::client::GcpClient;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Descriptive metadata of one dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetInfo {
    pub project_id: String,
    pub dataset_id: String,
    /// Absent when the response carries no location
    pub location: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub friendly_name: Option<String>,
    /// `project:dataset`
    pub full_dataset_id: String,
    pub default_table_expiration_ms: Option<i64>,
    pub labels: BTreeMap<String, String>,
}

/// BigQuery encodes int64 fields as decimal strings
fn int64_field(value: &Value, key: &str) -> Option<i64> {
    match value.get(key)? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

fn millis_field(value: &Value, key: &str) -> Option<DateTime<Utc>> {
    int64_field(value, key).and_then(DateTime::<Utc>::from_timestamp_millis)
}

impl DatasetInfo {
    /// Decode a `datasets.get` response. `project_id`/`dataset_id` are the
    /// requested ids, not whatever the response echoes back.
    pub fn from_api(project_id: &str, dataset_id: &str, value: &Value) -> Self {
        let opt_str = |key: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        let labels = value
            .get("labels")
            .and_then(|v| v.as_object())
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            project_id: project_id.to_string(),
            dataset_id: dataset_id.to_string(),
            location: opt_str("location"),
            created: millis_field(value, "creationTime"),
            modified: millis_field(value, "lastModifiedTime"),
            description: opt_str("description"),
            friendly_name: opt_str("friendlyName"),
            full_dataset_id: opt_str("id").unwrap_or_else(|| format!("{}:{}", project_id, dataset_id)),
            default_table_expiration_ms: int64_field(value, "defaultTableExpirationMs"),
            labels,
        }
    }
}

/// Fetch one dataset. Absence surfaces as an [`super::http::ApiError`] with status 404.
pub async fn get_dataset(client: &GcpClient, project_id: &str, dataset_id: &str) -> Result<DatasetInfo> {
    let url = client.bigquery_dataset_url(project_id, dataset_id);
    let response = client
        .get(&url)
        .await
        .with_context(|| format!("Failed to get dataset {}:{}", project_id, dataset_id))?;

    Ok(DatasetInfo::from_api(project_id, dataset_id, &response))
}
