//! 同步器指标收集模块
//!
//! 记录 push 状态、emission、队列深度，并在内存中聚合运行统计。

use std::collections::HashMap;

use contracts::{PushStatus, Timestamp};
use metrics::{counter, gauge, histogram};

/// 记录一次 push 的结果
///
/// push / emission 总数由同步器自身记录（`stream_sync_push_total` 等），
/// 这里只补充同步器不知道的 stream 名称维度：按 stream 统计丢弃次数。
pub fn record_push_status(stream: &str, status: PushStatus) {
    if status == PushStatus::Dropped {
        counter!("stream_sync_stream_dropped_total", "stream" => stream.to_string()).increment(1);
    }
}

/// 记录一次 emission
///
/// `filled` / `slots`: 本次输出中有值的子流数 / 子流总数。
pub fn record_emission(time: Timestamp, filled: usize, slots: usize) {
    gauge!("stream_sync_last_emission_time").set(time as f64);
    if slots > 0 {
        histogram!("stream_sync_emission_fill_ratio").record(filled as f64 / slots as f64);
    }
}

/// 记录缓冲区深度
pub fn record_queue_depth(stream: &str, depth: usize) {
    gauge!("stream_sync_queue_depth", "stream" => stream.to_string()).set(depth as f64);
}

/// 同步指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct SyncMetricsAggregator {
    /// push 总数
    pub total_pushes: u64,

    /// 被接受但未触发输出的 push
    pub accepted: u64,

    /// 触发了输出的 push
    pub emitting_pushes: u64,

    /// 因时间戳非递增被丢弃的 push
    pub dropped: u64,

    /// emission 总数
    pub total_emissions: u64,

    /// 相邻 emission 的时间间隔
    pub spacing_stats: RunningStats,

    /// 每次 emission 的填充率 (0..=1)
    pub fill_stats: RunningStats,

    /// 各 stream 丢弃次数
    pub dropped_by_stream: HashMap<String, u64>,

    last_emission: Option<Timestamp>,
}

impl SyncMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 统计一次 push
    pub fn record_push(&mut self, stream: &str, status: PushStatus) {
        self.total_pushes += 1;
        match status {
            PushStatus::Accepted => self.accepted += 1,
            PushStatus::Emitted => self.emitting_pushes += 1,
            PushStatus::Dropped => {
                self.dropped += 1;
                *self.dropped_by_stream.entry(stream.to_string()).or_insert(0) += 1;
            }
        }
    }

    /// 统计一次 emission
    pub fn record_emission(&mut self, time: Timestamp, filled: usize, slots: usize) {
        self.total_emissions += 1;
        if let Some(last) = self.last_emission {
            self.spacing_stats.push(time.saturating_sub(last) as f64);
        }
        self.last_emission = Some(time);
        if slots > 0 {
            self.fill_stats.push(filled as f64 / slots as f64);
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_pushes: self.total_pushes,
            accepted: self.accepted,
            emitting_pushes: self.emitting_pushes,
            dropped: self.dropped,
            total_emissions: self.total_emissions,
            drop_rate: if self.total_pushes > 0 {
                self.dropped as f64 / self.total_pushes as f64 * 100.0
            } else {
                0.0
            },
            spacing: StatsSummary::from(&self.spacing_stats),
            fill_ratio: StatsSummary::from(&self.fill_stats),
            dropped_by_stream: self.dropped_by_stream.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_pushes: u64,
    pub accepted: u64,
    pub emitting_pushes: u64,
    pub dropped: u64,
    pub total_emissions: u64,
    pub drop_rate: f64,
    pub spacing: StatsSummary,
    pub fill_ratio: StatsSummary,
    pub dropped_by_stream: HashMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Sync Metrics Summary ===")?;
        writeln!(f, "Total pushes: {}", self.total_pushes)?;
        writeln!(
            f,
            "  accepted: {}, emitting: {}, dropped: {} ({:.2}%)",
            self.accepted, self.emitting_pushes, self.dropped, self.drop_rate
        )?;
        writeln!(f, "Emissions: {}", self.total_emissions)?;
        writeln!(f, "Emission spacing: {}", self.spacing)?;
        writeln!(f, "Fill ratio: {}", self.fill_ratio)?;

        if !self.dropped_by_stream.is_empty() {
            let mut streams: Vec<_> = self.dropped_by_stream.iter().collect();
            streams.sort();
            writeln!(f, "Dropped by stream:")?;
            for (stream, count) in streams {
                writeln!(f, "  {}: {}", stream, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_only_add_stream_dimension() {
        use metrics_exporter_prometheus::PrometheusBuilder;

        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        ::metrics::with_local_recorder(&recorder, || {
            record_push_status("imu", PushStatus::Accepted);
            record_push_status("imu", PushStatus::Emitted);
            record_push_status("imu", PushStatus::Dropped);
            record_emission(42, 1, 2);
            record_queue_depth("imu", 3);
        });

        let rendered = handle.render();
        assert!(rendered.contains("stream_sync_stream_dropped_total{stream=\"imu\"} 1"));
        assert!(rendered.contains("stream_sync_last_emission_time 42"));
        assert!(rendered.contains("stream_sync_emission_fill_ratio"));
        assert!(rendered.contains("stream_sync_queue_depth{stream=\"imu\"} 3"));
        // totals belong to the synchronizer
        assert!(!rendered.contains("pushes_total"));
        assert!(!rendered.contains("emissions_total"));
        assert!(!rendered.contains("stream_syncer_"));
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_pushes() {
        let mut aggregator = SyncMetricsAggregator::new();
        aggregator.record_push("cam", PushStatus::Accepted);
        aggregator.record_push("cam", PushStatus::Dropped);
        aggregator.record_push("imu", PushStatus::Emitted);
        aggregator.record_push("cam", PushStatus::Dropped);

        assert_eq!(aggregator.total_pushes, 4);
        assert_eq!(aggregator.accepted, 1);
        assert_eq!(aggregator.emitting_pushes, 1);
        assert_eq!(aggregator.dropped, 2);
        assert_eq!(aggregator.dropped_by_stream.get("cam"), Some(&2));
        assert!((aggregator.summary().drop_rate - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_emission_spacing() {
        let mut aggregator = SyncMetricsAggregator::new();
        aggregator.record_emission(0, 2, 2);
        aggregator.record_emission(10, 1, 2);
        aggregator.record_emission(30, 2, 2);

        let summary = aggregator.summary();
        assert_eq!(summary.total_emissions, 3);
        assert_eq!(summary.spacing.count, 2);
        assert!((summary.spacing.mean - 15.0).abs() < 1e-10);
        assert!((summary.fill_ratio.min - 0.5).abs() < 1e-10);

        aggregator.reset();
        assert_eq!(aggregator.total_emissions, 0);
        assert_eq!(aggregator.summary().spacing.count, 0);
    }

    #[test]
    fn test_summary_display() {
        let summary = MetricsSummary {
            total_pushes: 100,
            accepted: 60,
            emitting_pushes: 35,
            dropped: 5,
            total_emissions: 40,
            drop_rate: 5.0,
            spacing: StatsSummary {
                count: 39,
                min: 10.0,
                max: 30.0,
                mean: 12.0,
                std_dev: 3.0,
            },
            fill_ratio: StatsSummary::default(),
            dropped_by_stream: HashMap::from([("cam".to_string(), 5)]),
        };

        let output = format!("{}", summary);
        assert!(output.contains("Total pushes: 100"));
        assert!(output.contains("5.00%"));
        assert!(output.contains("Fill ratio: N/A"));
        assert!(output.contains("cam: 5"));
    }
}
