//! sinkscout
//!
//! Discovers GCP organization log sinks that export audit logs to BigQuery,
//! reads the target dataset's metadata, and renders a `terraform.tfvars`
//! snippet pointing at the existing dataset.
//!
//! - [`gcp`] - REST wrappers for Resource Manager, Cloud Logging and BigQuery
//! - [`discovery`] - The discovery workflow over a [`discovery::CloudDirectory`]
//! - [`emit`] - Terraform snippet rendering
//! - [`render`] - Console and structured output
//! - [`interactive`] - Guided mode
//! - [`cli`] - Argument parsing and command routing
//! - [`config`] - Persistent user configuration

pub mod cli;
pub mod config;
pub mod discovery;
pub mod emit;
pub mod gcp;
pub mod interactive;
pub mod render;
