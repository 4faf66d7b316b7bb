//! GCP Organizations
//!
//! Organization search through the Resource Manager v3 API.

use super::client::GcpClient;
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Lifecycle state of an organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizationState {
    Active,
    DeleteRequested,
    #[serde(rename = "STATE_UNSPECIFIED")]
    Unspecified,
}

impl OrganizationState {
    pub fn from_api(s: &str) -> Self {
        match s {
            "ACTIVE" => Self::Active,
            "DELETE_REQUESTED" => Self::DeleteRequested,
            _ => Self::Unspecified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::DeleteRequested => "DELETE_REQUESTED",
            Self::Unspecified => "STATE_UNSPECIFIED",
        }
    }
}

impl fmt::Display for OrganizationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Organization information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
    /// Numeric id, e.g. `123456789012`
    pub id: String,
    pub display_name: String,
    pub state: OrganizationState,
    /// Resource name, e.g. `organizations/123456789012`
    pub full_name: String,
}

impl From<&Value> for Organization {
    fn from(value: &Value) -> Self {
        let full_name = value
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Self {
            id: full_name.rsplit('/').next().unwrap_or_default().to_string(),
            display_name: value
                .get("displayName")
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string(),
            state: OrganizationState::from_api(
                value.get("state").and_then(|v| v.as_str()).unwrap_or_default(),
            ),
            full_name,
        }
    }
}

/// Search all organizations visible to the current credentials
pub async fn search_organizations(client: &GcpClient) -> Result<Vec<Organization>> {
    let url = client.resourcemanager_url("organizations:search");
    let items = client.get_all_pages(&url, "organizations").await?;
    Ok(items.iter().map(Organization::from).collect())
}
