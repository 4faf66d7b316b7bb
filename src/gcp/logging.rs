//! Cloud Logging sinks
//!
//! Lists log sinks configured under a parent scope through the Logging v2 API.

use super::bigquery::DatasetInfo;
use super::client::GcpClient;
use crate::discovery::destination::parse_destination;
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

/// A configured export rule routing log entries to a destination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogSink {
    pub name: String,
    /// e.g. `bigquery.googleapis.com/projects/acme/datasets/audit_logs`
    pub destination: String,
    pub filter: String,
    pub include_children: bool,
    pub writer_identity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bq_project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bq_dataset_id: Option<String>,
    #[serde(rename = "bq_dataset_info", skip_serializing_if = "Option::is_none")]
    pub dataset_metadata: Option<DatasetInfo>,
}

impl LogSink {
    /// Build a sink, filling the BigQuery ids when the destination is a dataset
    pub fn new(
        name: &str,
        destination: &str,
        filter: &str,
        include_children: bool,
        writer_identity: &str,
    ) -> Self {
        let target = parse_destination(destination);

        Self {
            name: name.to_string(),
            destination: destination.to_string(),
            filter: filter.to_string(),
            include_children,
            writer_identity: writer_identity.to_string(),
            bq_project_id: target.as_ref().map(|t| t.project_id.clone()),
            bq_dataset_id: target.map(|t| t.dataset_id),
            dataset_metadata: None,
        }
    }

    /// Both BigQuery ids, when the destination parsed as a dataset
    pub fn bigquery_ids(&self) -> Option<(&str, &str)> {
        match (&self.bq_project_id, &self.bq_dataset_id) {
            (Some(project), Some(dataset)) => Some((project, dataset)),
            _ => None,
        }
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(|v| v.as_str()).unwrap_or_default()
}

impl From<&Value> for LogSink {
    fn from(value: &Value) -> Self {
        Self::new(
            str_field(value, "name"),
            str_field(value, "destination"),
            str_field(value, "filter"),
            value
                .get("includeChildren")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            str_field(value, "writerIdentity"),
        )
    }
}

/// List every sink under `organizations/{org_id}`, following pagination
pub async fn list_org_sinks(client: &GcpClient, org_id: &str) -> Result<Vec<LogSink>> {
    let url = client.logging_sinks_url(&format!("organizations/{}", urlencoding::encode(org_id)));
    let items = client.get_all_pages(&url, "sinks").await?;
    Ok(items.iter().map(LogSink::from).collect())
}
