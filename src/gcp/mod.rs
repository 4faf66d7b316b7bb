//! GCP API interaction module
//!
//! Thin REST wrappers over the three services discovery reads from.
//!
//! # Module Structure
//!
//! - [`auth`] - GCP authentication using Application Default Credentials
//! - [`client`] - Main GCP client for making API requests
//! - [`http`] - HTTP utilities and the typed [`http::ApiError`]
//! - [`organizations`] - Organization search (Resource Manager v3)
//! - [`logging`] - Log sink listing (Cloud Logging v2)
//! - [`bigquery`] - Dataset metadata (BigQuery v2)
//!
//! # Example
//!
//! ```ignore
//! use sinkscout::gcp::{client::GcpClient, logging};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = GcpClient::new().await?;
//!     let sinks = logging::list_org_sinks(&client, "123456789012").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod bigquery;
pub mod client;
pub mod http;
pub mod logging;
pub mod organizations;
