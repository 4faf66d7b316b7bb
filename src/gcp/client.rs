//! GCP Client
//!
//! Main client for interacting with GCP APIs, combining authentication
//! and HTTP functionality.

use super::auth::{self, GcpCredentials};
use super::http::GcpHttpClient;
use anyhow::{Context, Result};
use serde_json::Value;

/// Base URLs of the APIs used during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcpEndpoints {
    pub resourcemanager: String,
    pub logging: String,
    pub bigquery: String,
}

impl Default for GcpEndpoints {
    fn default() -> Self {
        Self {
            resourcemanager: "https://cloudresourcemanager.googleapis.com".to_string(),
            logging: "https://logging.googleapis.com".to_string(),
            bigquery: "https://bigquery.googleapis.com".to_string(),
        }
    }
}

impl GcpEndpoints {
    /// Route every API to one base URL (a mock server or an emulator)
    pub fn single(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            resourcemanager: base.clone(),
            logging: base.clone(),
            bigquery: base,
        }
    }
}

/// Main GCP client
#[derive(Clone)]
pub struct GcpClient {
    pub credentials: GcpCredentials,
    pub http: GcpHttpClient,
    pub endpoints: GcpEndpoints,
    /// Project billed for API quota, only when explicitly configured
    pub quota_project: Option<String>,
}

impl GcpClient {
    /// Create a new GCP client using Application Default Credentials.
    /// `billing_project` overrides the environment and ADC quota project.
    pub async fn new(billing_project: Option<&str>) -> Result<Self> {
        let credentials = GcpCredentials::new()
            .await
            .context("Failed to initialize GCP credentials")?;

        let quota_project = auth::resolve_quota_project(billing_project);

        Self::with_parts(credentials, GcpEndpoints::default(), quota_project)
    }

    /// Create a client from explicit credentials and endpoints
    pub fn with_parts(
        credentials: GcpCredentials,
        endpoints: GcpEndpoints,
        quota_project: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            credentials,
            http: GcpHttpClient::new()?,
            endpoints,
            quota_project,
        })
    }

    /// Get the current access token
    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.get(url, &token, self.quota_project.as_deref()).await
    }

    /// GET every page of a list endpoint, concatenating the `items_key` arrays
    pub async fn get_all_pages(&self, url: &str, items_key: &str) -> Result<Vec<Value>> {
        let mut all_items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page_url = with_page_token(url, page_token.as_deref())?;
            let response = self.get(&page_url).await?;

            if let Some(items) = response.get(items_key).and_then(|v| v.as_array()) {
                all_items.extend(items.iter().cloned());
            }

            page_token = response
                .get("nextPageToken")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string());

            if page_token.is_none() {
                break;
            }
        }

        Ok(all_items)
    }

    // =========================================================================
    // Resource Manager API helpers
    // =========================================================================

    /// Build Resource Manager v3 API URL
    pub fn resourcemanager_url(&self, path: &str) -> String {
        format!("{}/v3/{}", self.endpoints.resourcemanager, path)
    }

    // =========================================================================
    // Cloud Logging API helpers
    // =========================================================================

    /// Build Cloud Logging v2 API URL
    pub fn logging_url(&self, path: &str) -> String {
        format!("{}/v2/{}", self.endpoints.logging, path)
    }

    /// Build the sinks collection URL under a parent (`organizations/123`, `projects/x`)
    pub fn logging_sinks_url(&self, parent: &str) -> String {
        self.logging_url(&format!("{}/sinks", parent))
    }

    // =========================================================================
    // BigQuery API helpers
    // =========================================================================

    /// Build BigQuery v2 API URL
    pub fn bigquery_url(&self, path: &str) -> String {
        format!("{}/bigquery/v2/{}", self.endpoints.bigquery, path)
    }

    /// Build BigQuery dataset URL
    pub fn bigquery_dataset_url(&self, project_id: &str, dataset_id: &str) -> String {
        self.bigquery_url(&format!(
            "projects/{}/datasets/{}",
            urlencoding::encode(project_id),
            urlencoding::encode(dataset_id)
        ))
    }
}

/// Append a page token to a list URL
pub fn with_page_token(url: &str, page_token: Option<&str>) -> Result<String> {
    let mut parsed = url::Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
    if let Some(token) = page_token {
        parsed.query_pairs_mut().append_pair("pageToken", token);
    }
    Ok(parsed.into())
}
