//! Guided discovery
//!
//! Walks the operator from organization selection to a saved tfvars file.
//! Input and output are injected so the flow can be driven from tests.

use crate::discovery::{CloudDirectory, Discovery};
use crate::emit::render_tfvars;
use crate::gcp::logging::LogSink;
use crate::render::{write_organizations, write_sinks};
use anyhow::{Context, Result};
use crossterm::style::Stylize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// How a guided session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A snippet was generated; `saved_to` is set when it was written to disk
    Generated {
        org_id: String,
        sink_name: String,
        saved_to: Option<PathBuf>,
    },
    /// The organization has no audit sinks exporting to BigQuery
    NoAuditSinks { org_id: String },
    NoOrganizations,
    InvalidOrganization(String),
}

impl Outcome {
    /// Process exit status for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Generated { .. } | Self::NoAuditSinks { .. } => 0,
            Self::NoOrganizations | Self::InvalidOrganization(_) => 1,
        }
    }

    /// Organization the operator settled on, if any
    pub fn org_id(&self) -> Option<&str> {
        match self {
            Self::Generated { org_id, .. } | Self::NoAuditSinks { org_id } => Some(org_id),
            _ => None,
        }
    }
}

/// Settings for a guided session
pub struct Session<'a> {
    pub fallback_location: &'a str,
    pub tfvars_path: &'a Path,
}

/// Console prompts over any reader/writer pair
pub struct Prompter<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let n = self.input.read_line(&mut line).context("Failed to read input")?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Free-form answer; end of input yields an empty string
    pub fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.out, "{}: ", question.bold())?;
        self.out.flush()?;
        Ok(self.read_line()?.unwrap_or_default())
    }

    /// Ask until the answer is one of `choices`
    pub fn choose(&mut self, question: &str, choices: &[&str]) -> Result<String> {
        loop {
            write!(self.out, "{} [{}]: ", question.bold(), choices.join("/"))?;
            self.out.flush()?;
            let Some(answer) = self.read_line()? else {
                anyhow::bail!("Input closed before a choice was made");
            };
            if choices.contains(&answer.as_str()) {
                return Ok(answer);
            }
            writeln!(self.out, "{}", "Please select one of the available options".red())?;
        }
    }

    /// Yes/no question; an empty answer takes the default.
    /// Closed input always answers no.
    pub fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        write!(self.out, "{} [{}]: ", question.bold(), hint)?;
        self.out.flush()?;
        let Some(answer) = self.read_line()? else {
            writeln!(self.out)?;
            return Ok(false);
        };
        Ok(match answer.to_lowercase().as_str() {
            "y" | "yes" => true,
            "n" | "no" => false,
            _ => default,
        })
    }
}

/// Run the guided flow
pub async fn run<C, R, W>(
    discovery: &Discovery<C>,
    session: &Session<'_>,
    prompter: &mut Prompter<R, W>,
) -> Result<Outcome>
where
    C: CloudDirectory,
    R: BufRead,
    W: Write,
{
    writeln!(
        prompter.out(),
        "{}\n{}",
        "GCP Log Sink Discovery - Interactive Mode".bold().cyan(),
        "This tool helps you discover existing log sinks and BigQuery datasets"
    )?;

    writeln!(prompter.out(), "\n{}", "Step 1: Discovering Organizations".bold())?;
    let orgs = discovery.organizations().await;
    write_organizations(prompter.out(), &orgs)?;

    if orgs.is_empty() {
        writeln!(prompter.out(), "\n{}", "Cannot proceed without organization access".red())?;
        return Ok(Outcome::NoOrganizations);
    }

    writeln!(prompter.out(), "\n{}", "Step 2: Select Organization".bold())?;
    let org = if let [only] = orgs.as_slice() {
        writeln!(
            prompter.out(),
            "Using only available organization: {}",
            only.display_name.as_str().cyan()
        )?;
        only.clone()
    } else {
        let org_id = prompter.ask("Enter organization ID")?;
        match orgs.iter().find(|o| o.id == org_id) {
            Some(org) => org.clone(),
            None => {
                writeln!(prompter.out(), "{}", "Invalid organization ID".red())?;
                return Ok(Outcome::InvalidOrganization(org_id));
            }
        }
    };

    writeln!(prompter.out(), "\n{}", "Step 3: Searching for Log Sinks".bold())?;
    let sinks = discovery.audit_sinks(&org.id).await;
    write_sinks(prompter.out(), &sinks, true)?;

    if sinks.is_empty() {
        writeln!(prompter.out(), "\n{}", "No CloudAudit log sinks found".yellow())?;
        if prompter.confirm("Show all log sinks?", false)? {
            let all_sinks = discovery.org_sinks(&org.id).await;
            write_sinks(prompter.out(), &all_sinks, false)?;
        }
        return Ok(Outcome::NoAuditSinks { org_id: org.id });
    }

    writeln!(prompter.out(), "\n{}", "Step 4: Generate Terraform Configuration".bold())?;
    let sink: &LogSink = if let [only] = sinks.as_slice() {
        writeln!(
            prompter.out(),
            "Using only available log sink: {}",
            only.name.as_str().cyan()
        )?;
        only
    } else {
        let names: Vec<&str> = sinks.iter().map(|s| s.name.as_str()).collect();
        let name = prompter.choose("Select log sink", &names)?;
        sinks
            .iter()
            .find(|s| s.name == name)
            .context("Selected sink disappeared")?
    };

    let tfvars = render_tfvars(sink, session.fallback_location);
    writeln!(prompter.out(), "\n{}", tfvars)?;

    let question = format!("Save configuration to file {}?", session.tfvars_path.display());
    let saved_to = if prompter.confirm(&question, true)? {
        std::fs::write(session.tfvars_path, &tfvars)
            .with_context(|| format!("Failed to write {}", session.tfvars_path.display()))?;
        writeln!(
            prompter.out(),
            "{} Configuration saved to: {}",
            "✓".green(),
            session.tfvars_path.display().to_string().cyan()
        )?;
        Some(session.tfvars_path.to_path_buf())
    } else {
        None
    };

    Ok(Outcome::Generated {
        org_id: org.id,
        sink_name: sink.name.clone(),
        saved_to,
    })
}
