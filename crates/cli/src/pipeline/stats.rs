//! Replay statistics and metrics.

use std::time::Duration;

use contracts::Timestamp;
use observability::SyncMetricsAggregator;

/// Statistics from a replay run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Trace records read
    pub records_read: u64,

    /// Records refused before reaching the synchronizer (unknown stream, bad shape)
    pub records_rejected: u64,

    /// Emitted tuples written to the output
    pub emissions_written: u64,

    /// Number of configured streams
    pub streams: usize,

    /// Pivot after the last push
    pub final_pivot: Option<Timestamp>,

    /// Replay was interrupted by a shutdown signal
    pub interrupted: bool,

    /// Total duration of the run
    pub duration: Duration,

    /// Synchronizer metrics aggregator
    pub sync_metrics: SyncMetricsAggregator,
}

impl PipelineStats {
    /// Emissions per wall-clock second
    pub fn emissions_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.emissions_written as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Replay Statistics ===\n");

        println!("Overview");
        println!("   |- Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   |- Streams: {}", self.streams);
        println!("   |- Records read: {}", self.records_read);
        println!("   |- Records rejected: {}", self.records_rejected);
        println!("   |- Emissions written: {}", self.emissions_written);
        println!("   |- Emissions/s: {:.2}", self.emissions_per_sec());
        match self.final_pivot {
            Some(pivot) => println!("   `- Final pivot: {pivot}"),
            None => println!("   `- Final pivot: -"),
        }
        if self.interrupted {
            println!("\n(interrupted before the end of the trace)");
        }

        println!("\n{}", self.sync_metrics.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emissions_per_sec() {
        let stats = PipelineStats {
            emissions_written: 50,
            duration: Duration::from_secs(2),
            ..Default::default()
        };
        assert!((stats.emissions_per_sec() - 25.0).abs() < 1e-10);
        assert_eq!(PipelineStats::default().emissions_per_sec(), 0.0);
    }
}
