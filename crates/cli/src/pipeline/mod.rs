//! Replay pipeline: trace source, orchestration, statistics.

mod orchestrator;
mod replay;
mod stats;

pub use orchestrator::{Pipeline, PipelineConfig};
pub use stats::PipelineStats;
