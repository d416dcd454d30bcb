//! `run` command implementation.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use contracts::SyncBlueprint;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        mode = blueprint.synchronizer.name(),
        streams = blueprint.streams.len(),
        policies = blueprint.policy_count(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
        info!("Metrics endpoint available on port {}", args.metrics_port);
    }

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        trace_path: args.trace.clone(),
        max_emissions: (args.max_emissions != 0).then_some(args.max_emissions),
        speed: args.speed,
        tick_us: args.tick_us,
    });

    let mut output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create output {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    // Graceful shutdown: the signal task flips the flag, the replay loop checks it
    let (stop_tx, stop_rx) = watch::channel(false);
    let signal_task = tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, stopping replay...");
        let _ = stop_tx.send(true);
    });

    let stats = pipeline
        .run(&mut output, stop_rx)
        .await
        .context("Replay failed")?;
    signal_task.abort();

    info!(
        emissions = stats.emissions_written,
        records = stats.records_read,
        rejected = stats.records_rejected,
        duration_secs = stats.duration.as_secs_f64(),
        "Replay completed"
    );

    if args.output.is_some() {
        stats.print_summary();
    } else {
        // stdout carries the emissions; keep the summary off it
        eprintln!("{}", stats.sync_metrics.summary());
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &SyncBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Synchronizer: {}", blueprint.synchronizer.name());
    if let contracts::PivotStrategy::MinInterval { min_interval } = blueprint.synchronizer {
        println!("  Min interval: {}", min_interval);
    }
    println!("\nStreams ({}):", blueprint.streams.len());
    for stream in &blueprint.streams {
        println!(
            "  - {} ({}, {}) x{}",
            stream.name,
            stream.retrieval.name(),
            stream.attribute,
            stream.sub_streams
        );
    }
    println!();
}
