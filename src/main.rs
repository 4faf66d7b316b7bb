use anyhow::Result;
use clap::Parser;
use sinkscout::cli::{self, Cli, LogLevel};
use sinkscout::config::Config;
use sinkscout::discovery::Discovery;
use sinkscout::gcp::client::GcpClient;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn setup_logging(level: LogLevel, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    // RUST_LOG wins over --log-level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sinkscout={}", tracing_level.as_str().to_lowercase())));

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
        return Ok(None);
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("sinkscout started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", path);

    Ok(Some(guard))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let log_guard = setup_logging(args.log_level, args.log_file.as_deref())?;

    let mut config = Config::load();
    let loaded = config.clone();
    let client = GcpClient::new(args.billing_project.as_deref()).await?;
    let discovery = Discovery::new(client);

    let stdin = io::stdin();
    let code = cli::execute(
        &args,
        &discovery,
        &mut config,
        stdin.lock(),
        io::stdout(),
        io::stderr(),
    )
    .await?;

    if config != loaded {
        if let Err(e) = config.save() {
            tracing::warn!("Failed to save config: {}", e);
        }
    }

    if code != 0 {
        drop(log_guard);
        std::process::exit(code);
    }
    Ok(())
}
