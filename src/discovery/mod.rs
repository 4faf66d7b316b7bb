//! Log sink discovery
//!
//! Composes organization search, sink listing, audit classification and
//! dataset enrichment. Nothing in here fails: every upstream error is logged
//! and degrades to an empty list or `None`, so an interactive run can keep
//! going with partial information.
//!
//! - [`destination`] - BigQuery destination parsing
//! - [`classify`] - Audit sink heuristic

pub mod classify;
pub mod destination;

use crate::gcp::bigquery::{self, DatasetInfo};
use crate::gcp::client::GcpClient;
use crate::gcp::http;
use crate::gcp::logging::{self, LogSink};
use crate::gcp::organizations::{self, Organization};
use anyhow::Result;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

pub use classify::is_audit_sink;
pub use destination::{parse_destination, BigQueryTarget};

/// The upstream services discovery reads from
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CloudDirectory: Send + Sync {
    /// Organizations visible to the caller
    async fn search_organizations(&self) -> Result<Vec<Organization>>;

    /// Every sink under `organizations/{org_id}`
    async fn list_org_sinks(&self, org_id: &str) -> Result<Vec<LogSink>>;

    /// One dataset. A missing dataset is an error for which
    /// [`http::is_not_found`] holds.
    async fn get_dataset(&self, project_id: &str, dataset_id: &str) -> Result<DatasetInfo>;
}

#[async_trait]
impl CloudDirectory for GcpClient {
    async fn search_organizations(&self) -> Result<Vec<Organization>> {
        organizations::search_organizations(self).await
    }

    async fn list_org_sinks(&self, org_id: &str) -> Result<Vec<LogSink>> {
        logging::list_org_sinks(self, org_id).await
    }

    async fn get_dataset(&self, project_id: &str, dataset_id: &str) -> Result<DatasetInfo> {
        bigquery::get_dataset(self, project_id, dataset_id).await
    }
}

/// Discovery workflow over one client handle, held for the whole run
pub struct Discovery<C> {
    client: C,
}

impl<C: CloudDirectory> Discovery<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// List organizations; empty when the search fails
    pub async fn organizations(&self) -> Vec<Organization> {
        match self.client.search_organizations().await {
            Ok(orgs) => {
                tracing::info!("Found {} organization(s)", orgs.len());
                orgs
            }
            Err(e) => {
                tracing::warn!(
                    "Error listing organizations: {} Check roles/resourcemanager.organizationViewer",
                    http::format_gcp_error(&e)
                );
                tracing::debug!("Organization search failed: {:#}", e);
                Vec::new()
            }
        }
    }

    /// All sinks configured at the organization level; empty when listing fails
    pub async fn org_sinks(&self, org_id: &str) -> Vec<LogSink> {
        match self.client.list_org_sinks(org_id).await {
            Ok(sinks) => {
                tracing::info!("Found {} sink(s) in organization {}", sinks.len(), org_id);
                sinks
            }
            Err(e) => {
                tracing::warn!(
                    "Error listing log sinks for org {}: {} Check roles/logging.viewer",
                    org_id,
                    http::format_gcp_error(&e)
                );
                tracing::debug!("Sink listing failed: {:#}", e);
                Vec::new()
            }
        }
    }

    /// Dataset metadata, or `None` when it is missing or unreadable.
    /// The two cases only differ in how they are logged.
    pub async fn dataset_info(&self, project_id: &str, dataset_id: &str) -> Option<DatasetInfo> {
        match self.client.get_dataset(project_id, dataset_id).await {
            Ok(info) => Some(info),
            Err(e) if http::is_not_found(&e) => {
                tracing::info!(
                    "Dataset not found or no access: {}:{} (normal when the project is in a different organization)",
                    project_id,
                    dataset_id
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    "Error getting dataset info for {}:{}: {}",
                    project_id,
                    dataset_id,
                    http::format_gcp_error(&e)
                );
                tracing::debug!("Dataset lookup failed: {:#}", e);
                None
            }
        }
    }

    /// Sinks exporting audit logs to BigQuery, enriched with dataset metadata
    /// where it could be fetched. Lookups run one at a time in listing order.
    pub async fn audit_sinks(&self, org_id: &str) -> Vec<LogSink> {
        let mut sinks: Vec<LogSink> = self
            .org_sinks(org_id)
            .await
            .into_iter()
            .filter(|s| is_audit_sink(&s.filter, &s.destination))
            .collect();

        for sink in &mut sinks {
            let Some((project_id, dataset_id)) = sink
                .bigquery_ids()
                .map(|(p, d)| (p.to_string(), d.to_string()))
            else {
                continue;
            };
            sink.dataset_metadata = self.dataset_info(&project_id, &dataset_id).await;
        }

        tracing::info!("{} audit sink(s) in organization {}", sinks.len(), org_id);
        sinks
    }
}
