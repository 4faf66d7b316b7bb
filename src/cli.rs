//! Command-line interface
//!
//! Argument definitions and subcommand routing. [`execute`] takes every
//! collaborator as a parameter so integration tests can drive a whole
//! command against a mock server.

use crate::config::Config;
use crate::discovery::{CloudDirectory, Discovery};
use crate::emit::render_tfvars;
use crate::interactive::{self, Prompter, Session};
use crate::render::{self, OutputFormat};
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::style::Stylize;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

/// Discover GCP log sinks and BigQuery datasets to populate Terraform variables.
///
/// Requires Application Default Credentials (gcloud auth application-default login)
/// and the roles resourcemanager.organizationViewer, logging.viewer and
/// bigquery.dataViewer.
#[derive(Parser, Debug)]
#[command(name = "sinkscout", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Dataset location assumed when dataset metadata cannot be read
    #[arg(long, global = true)]
    pub fallback_location: Option<String>,

    /// Log level for debugging
    #[arg(long, global = true, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Project billed for API quota. Falls back to GOOGLE_CLOUD_QUOTA_PROJECT,
    /// then to quota_project_id in the application default credentials.
    #[arg(long, global = true)]
    pub billing_project: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List all accessible organizations
    Orgs,
    /// List log sinks configured at the organization level
    Sinks {
        /// Organization ID to query (defaults to the last one used)
        #[arg(long)]
        org_id: Option<String>,
        /// Show only sinks exporting audit logs to BigQuery
        #[arg(long, alias = "cloudaudit-only")]
        audit_only: bool,
    },
    /// Show BigQuery dataset metadata
    Dataset {
        /// Dataset as PROJECT_ID:DATASET_ID
        dataset: DatasetRef,
    },
    /// Guided discovery ending in a tfvars snippet
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// `PROJECT_ID:DATASET_ID`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRef {
    pub project_id: String,
    pub dataset_id: String,
}

impl FromStr for DatasetRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((project, dataset)) if !project.is_empty() && !dataset.is_empty() => Ok(Self {
                project_id: project.to_string(),
                dataset_id: dataset.to_string(),
            }),
            _ => Err("format should be PROJECT_ID:DATASET_ID".to_string()),
        }
    }
}

/// Run one command. Results go to `out`, usage errors to `err`. Returns the
/// process exit code; `config` is updated in memory with anything worth
/// remembering (the caller decides whether to save).
pub async fn execute<C, R, W, E>(
    cli: &Cli,
    discovery: &Discovery<C>,
    config: &mut Config,
    input: R,
    mut out: W,
    mut err: E,
) -> Result<i32>
where
    C: CloudDirectory,
    R: BufRead,
    W: Write,
    E: Write,
{
    let fallback_location = config.effective_fallback_location(cli.fallback_location.as_deref());
    let structured = cli.output != OutputFormat::Text;

    match &cli.command {
        Commands::Orgs => {
            let orgs = discovery.organizations().await;
            if structured {
                writeln!(out, "{}", render::to_structured(&orgs, cli.output)?)?;
            } else {
                render::write_organizations(&mut out, &orgs)?;
            }
        }
        Commands::Sinks { org_id, audit_only } => {
            let Some(org_id) = config.effective_org_id(org_id.as_deref()) else {
                writeln!(err, "{}", "Error: --org-id is required (no previous organization saved)".red())?;
                return Ok(2);
            };

            let sinks = if *audit_only {
                discovery.audit_sinks(&org_id).await
            } else {
                discovery.org_sinks(&org_id).await
            };

            if structured {
                writeln!(out, "{}", render::to_structured(&sinks, cli.output)?)?;
            } else {
                render::write_sinks(&mut out, &sinks, *audit_only)?;
                match sinks.as_slice() {
                    [] => {}
                    [only] => {
                        writeln!(out, "\n{}", "=".repeat(80))?;
                        writeln!(out, "{}", render_tfvars(only, &fallback_location))?;
                    }
                    _ => writeln!(
                        out,
                        "\n{}",
                        "Tip: use the interactive command to generate Terraform configuration".dim()
                    )?,
                }
            }
            config.org_id = Some(org_id);
        }
        Commands::Dataset { dataset } => {
            let info = discovery
                .dataset_info(&dataset.project_id, &dataset.dataset_id)
                .await;
            if structured {
                writeln!(out, "{}", render::to_structured(&info, cli.output)?)?;
            } else {
                render::write_dataset(&mut out, info.as_ref())?;
            }
        }
        Commands::Interactive => {
            let tfvars_path = config.effective_tfvars_path();
            let session = Session {
                fallback_location: &fallback_location,
                tfvars_path: &tfvars_path,
            };
            let mut prompter = Prompter::new(input, &mut out);
            let outcome = interactive::run(discovery, &session, &mut prompter).await?;
            tracing::info!("Interactive session finished: {:?}", outcome);

            if let Some(org_id) = outcome.org_id() {
                config.org_id = Some(org_id.to_string());
            }
            return Ok(outcome.exit_code());
        }
    }

    Ok(0)
}
