//! Replay orchestrator - feeds a trace through a configured synchronizer.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use contracts::{ContractError, PushStatus, SyncBlueprint, Timestamp};
use nalgebra::DVector;
use serde::Serialize;
use sync_engine::{ConfiguredSynchronizer, StreamOutputs};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::replay::{pacing_delay, TraceRecord, TraceSource};
use super::PipelineStats;
use crate::error::Result;

type Payload = DVector<f64>;

/// Replay configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Synchronizer blueprint
    pub blueprint: SyncBlueprint,

    /// JSONL trace to replay
    pub trace_path: PathBuf,

    /// Maximum number of emissions (None = unlimited)
    pub max_emissions: Option<u64>,

    /// Replay speed multiplier (<= 0 disables pacing)
    pub speed: f64,

    /// Wall-clock microseconds per timestamp unit at speed 1.0
    pub tick_us: u64,
}

/// One emitted tuple as written to the output.
#[derive(Debug, Serialize)]
struct EmissionRecord<'a> {
    time: Timestamp,
    streams: BTreeMap<&'a str, Vec<Option<Vec<f64>>>>,
}

/// Replay orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Replay the whole trace (or until `shutdown` flips to `true`), writing
    /// one JSON line per emission to `output`.
    pub async fn run<W: Write>(
        self,
        output: &mut W,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let config = &self.config;

        let mut sync = ConfiguredSynchronizer::<Payload>::from_blueprint(&config.blueprint)?;
        let names: Vec<String> = sync.stream_names().map(str::to_string).collect();

        let (emit_tx, mut emit_rx) = mpsc::unbounded_channel();
        sync.register_callback(move |time, outputs| {
            let _ = emit_tx.send((time, outputs));
        });

        let mut source = TraceSource::open(&config.trace_path).await?;
        let mut stats = PipelineStats {
            streams: names.len(),
            ..Default::default()
        };
        let mut previous_time: Option<Timestamp> = None;

        info!(
            trace = %config.trace_path.display(),
            streams = names.len(),
            mode = config.blueprint.synchronizer.name(),
            "Replay started"
        );

        'replay: while let Some(record) = source.next_record().await? {
            if *shutdown.borrow() {
                stats.interrupted = true;
                break;
            }

            if let Some(delay) = previous_time
                .and_then(|prev| pacing_delay(prev, record.time, config.tick_us, config.speed))
            {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shutdown.changed() => {
                        stats.interrupted = true;
                        break 'replay;
                    }
                }
            }
            previous_time = Some(record.time);
            stats.records_read += 1;

            match push_record(&mut sync, &record) {
                Ok(status) => {
                    observability::record_push_status(&record.stream, status);
                    stats.sync_metrics.record_push(&record.stream, status);
                    if let Ok(depth) = sync.queue_size(&record.stream) {
                        observability::record_queue_depth(&record.stream, depth);
                    }
                }
                Err(e) => {
                    warn!(line = source.line_no(), error = %e, "Record rejected");
                    stats.records_rejected += 1;
                    continue;
                }
            }

            while let Ok((time, outputs)) = emit_rx.try_recv() {
                write_emission(output, &names, time, &outputs)?;
                record_emission(&mut stats, time, &outputs);

                if config
                    .max_emissions
                    .is_some_and(|max| stats.emissions_written >= max)
                {
                    info!(emissions = stats.emissions_written, "Reached max emissions limit");
                    break 'replay;
                }
            }
        }

        output.flush()?;
        stats.final_pivot = Some(sync.time_pivot());
        stats.duration = start_time.elapsed();

        info!(
            records = stats.records_read,
            emissions = stats.emissions_written,
            duration_secs = stats.duration.as_secs_f64(),
            "Replay finished"
        );

        Ok(stats)
    }
}

fn push_record(
    sync: &mut ConfiguredSynchronizer<Payload>,
    record: &TraceRecord,
) -> std::result::Result<PushStatus, ContractError> {
    let status = sync.push_values(
        &record.stream,
        record.sub_id,
        record.time,
        record.value.clone(),
    )?;
    debug!(
        stream = %record.stream,
        sub_id = record.sub_id,
        time = record.time,
        status = status.as_str(),
        "Record pushed"
    );
    Ok(status)
}

fn write_emission<W: Write>(
    output: &mut W,
    names: &[String],
    time: Timestamp,
    outputs: &[StreamOutputs<Payload>],
) -> Result<()> {
    let streams: BTreeMap<&str, _> = names
        .iter()
        .zip(outputs)
        .map(|(name, slots)| {
            let values: Vec<Option<Vec<f64>>> = slots
                .iter()
                .map(|slot| slot.as_ref().map(|v| v.iter().copied().collect()))
                .collect();
            (name.as_str(), values)
        })
        .collect();

    serde_json::to_writer(&mut *output, &EmissionRecord { time, streams })?;
    output.write_all(b"\n")?;
    Ok(())
}

fn record_emission(stats: &mut PipelineStats, time: Timestamp, outputs: &[StreamOutputs<Payload>]) {
    let slots: usize = outputs.iter().map(Vec::len).sum();
    let filled: usize = outputs
        .iter()
        .map(|s| s.iter().filter(|v| v.is_some()).count())
        .sum();

    stats.emissions_written += 1;
    stats.sync_metrics.record_emission(time, filled, slots);
    observability::record_emission(time, filled, slots);
}
