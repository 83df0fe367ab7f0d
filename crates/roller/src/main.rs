//! Roller - Stream records into rotating output files
//!
//! # Usage
//!
//! ```bash
//! # Read records from stdin
//! tail -F app.log | roller --config configs/roller.toml
//!
//! # Read records from a file
//! roller --config configs/roller.toml --input events.csv
//! ```
//!
//! Runs until the input ends or SIGINT/SIGTERM arrives, then closes the
//! current file and logs a summary. Stdin is read on a detached thread, so a
//! signal ends the process even while the input is idle.

mod builder;
mod input;

use input::LineSource;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use roller_config::Config;
use roller_sinks::{AckEvent, ChannelAcknowledger, LocalFs, RollingSink, RotatingWriter};
use tokio::io::BufReader;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Roller - Stream records into rotating output files
#[derive(Parser, Debug)]
#[command(name = "roller")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "configs/roller.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Read records from this file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_file(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

    init_logging(config.log.filter(cli.log_level.as_deref()))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "roller starting"
    );

    let source = match &cli.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open input {}", path.display()))?;
            LineSource::reader(BufReader::new(file))
        }
        None => LineSource::stdin(config.writer.queue_size)
            .context("failed to start stdin reader")?,
    };

    run(config, source, wait_for_shutdown()).await
}

/// Wire config → writer → sink, feed the input until it ends or `shutdown`
/// resolves
async fn run(config: Config, source: LineSource, shutdown: impl Future<Output = ()>) -> Result<()> {
    let section = config.writer;
    let writer_config = builder::build_writer_config(&section)?;

    let (acker, mut acks) = ChannelAcknowledger::channel();
    let fs = Arc::new(LocalFs::new(section.buffer_size));
    let writer = RotatingWriter::open(fs, writer_config, Arc::new(acker))
        .with_context(|| format!("failed to open output under {}", section.path))?;

    let acked = Arc::new(AtomicU64::new(0));
    let failed = Arc::new(AtomicU64::new(0));
    let ack_task = {
        let acked = Arc::clone(&acked);
        let failed = Arc::clone(&failed);
        tokio::spawn(async move {
            // Ends when the writer, and with it the sender, is dropped
            while let Some(event) = acks.recv().await {
                match event {
                    AckEvent::Ack(_) => acked.fetch_add(1, Ordering::Relaxed),
                    AckEvent::Fail(_) => failed.fetch_add(1, Ordering::Relaxed),
                };
            }
        })
    };

    let (tx, rx) = mpsc::channel(section.queue_size);
    let mut sink = RollingSink::new(writer, rx);
    if let Some(limit) = section.max_rotation_failures {
        sink = sink.with_rotation_failure_limit(limit);
    }
    let sink_task = tokio::spawn(sink.run());

    tokio::select! {
        result = input::feed(source, &section.field_delimiter, tx) => {
            let sent = result?;
            info!(records = sent, "input exhausted");
        }
        _ = shutdown => {
            info!("shutdown signal received");
        }
    }

    let snapshot = sink_task.await.context("sink task panicked")?;
    if let Err(e) = ack_task.await {
        error!(error = %e, "acknowledgment task failed");
    }

    let failed = failed.load(Ordering::Relaxed);
    info!(
        acked = acked.load(Ordering::Relaxed),
        failed,
        bytes = snapshot.bytes_written,
        syncs = snapshot.syncs,
        rotations = snapshot.rotations,
        rotation_failures = snapshot.rotation_failures,
        action_failures = snapshot.action_failures,
        "roller finished"
    );
    if failed > 0 {
        warn!(failed, "some records were not written");
    }

    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();

    Ok(())
}
