//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 配置文件 → 同步器 → 输出的端到端测试

#[cfg(test)]
mod contract_tests {
    use contracts::{Attribute, PivotStrategy, RetrievalConfig, StreamConfig};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
        assert_eq!(contracts::NO_CANDIDATE, i64::MAX);
        assert_eq!(contracts::BEFORE_ALL_TIME, i64::MIN);
    }

    #[test]
    fn test_attribute_ordering_snapshot() {
        assert!(Attribute::Optional < Attribute::Normal);
        assert!(Attribute::Normal < Attribute::Master);
        assert_eq!(PivotStrategy::MasterSlave.name(), "master_slave");
    }

    #[test]
    fn test_stream_config_json_snapshot() {
        let stream: StreamConfig = serde_json::from_str(
            r#"{"name":"imu","retrieval":"linear_interpolate","predict_window":40}"#,
        )
        .unwrap();
        assert_eq!(
            stream.retrieval,
            RetrievalConfig::LinearInterpolate { predict_window: 40 }
        );
        assert_eq!(stream.attribute, Attribute::Normal);
        assert_eq!(stream.sub_streams, 1);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::{Arc, Mutex};

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ContractError, PushStatus, Timestamp};
    use nalgebra::DVector;
    use observability::SyncMetricsAggregator;
    use sync_engine::{ConfiguredSynchronizer, StreamOutputs};

    type Emissions = Arc<Mutex<Vec<(Timestamp, Vec<StreamOutputs<DVector<f64>>>)>>>;

    fn build(toml: &str) -> (ConfiguredSynchronizer<DVector<f64>>, Emissions) {
        let blueprint = ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap();
        let mut sync = ConfiguredSynchronizer::from_blueprint(&blueprint).unwrap();
        let emissions: Emissions = Arc::default();
        let sink = emissions.clone();
        sync.register_callback(move |time, outputs| sink.lock().unwrap().push((time, outputs)));
        (sync, emissions)
    }

    fn value(outputs: &[StreamOutputs<DVector<f64>>], stream: usize) -> Vec<f64> {
        outputs[stream][0]
            .as_ref()
            .expect("slot should be filled")
            .iter()
            .copied()
            .collect()
    }

    const TWO_EXACT: &str = r#"
[synchronizer]
mode = "min_interval"
min_interval = 1

[[streams]]
name = "a"
retrieval = "exact_time"

[[streams]]
name = "b"
retrieval = "exact_time"
"#;

    /// Config text → loader → synchronizer → emissions, with metrics aggregated
    /// from the push statuses the way the CLI pipeline does.
    #[test]
    fn test_e2e_min_interval_pipeline() {
        let (mut sync, emissions) = build(TWO_EXACT);
        let mut metrics = SyncMetricsAggregator::new();

        let trace: [(&str, Timestamp, f64); 6] = [
            ("a", 10, 1.0),
            ("b", 10, 2.0),
            ("a", 20, 3.0),
            ("b", 30, 4.0),
            ("a", 30, 5.0),
            ("a", 25, 6.0),
        ];
        let mut statuses = Vec::new();
        for (stream, time, v) in trace {
            let status = sync.push_values(stream, 0, time, vec![v]).unwrap();
            metrics.record_push(stream, status);
            statuses.push(status);
        }

        assert_eq!(
            statuses,
            vec![
                PushStatus::Accepted,
                PushStatus::Emitted,
                PushStatus::Accepted,
                PushStatus::Accepted,
                PushStatus::Emitted,
                PushStatus::Dropped,
            ]
        );

        let emitted = emissions.lock().unwrap();
        let times: Vec<Timestamp> = emitted.iter().map(|(t, _)| *t).collect();
        // 20 expired because b skipped it
        assert_eq!(times, vec![10, 30]);
        assert_eq!(value(&emitted[0].1, 0), vec![1.0]);
        assert_eq!(value(&emitted[0].1, 1), vec![2.0]);
        assert_eq!(value(&emitted[1].1, 0), vec![5.0]);
        assert_eq!(value(&emitted[1].1, 1), vec![4.0]);

        assert_eq!(sync.time_pivot(), 30);
        assert_eq!(sync.emitted_count(), 2);

        let summary = metrics.summary();
        assert_eq!(summary.total_pushes, 6);
        assert_eq!(summary.emitting_pushes, 2);
        assert_eq!(summary.dropped, 1);
        assert_eq!(summary.dropped_by_stream.get("a"), Some(&1));
    }

    #[test]
    fn test_e2e_master_slave_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.toml");
        std::fs::write(
            &path,
            r#"
[synchronizer]
mode = "master_slave"

[[streams]]
name = "lidar"
retrieval = "exact_time"
attribute = "master"

[[streams]]
name = "imu"
retrieval = "linear_interpolate"
predict_window = 100
history_window = 1000
dimension = 2
"#,
        )
        .unwrap();

        let blueprint = ConfigLoader::load_from_path(&path).unwrap();
        let mut sync = ConfiguredSynchronizer::<DVector<f64>>::from_blueprint(&blueprint).unwrap();
        let emissions: Emissions = Arc::default();
        let sink = emissions.clone();
        sync.register_callback(move |time, outputs| sink.lock().unwrap().push((time, outputs)));

        // slave data alone never produces a candidate
        assert_eq!(
            sync.push_values("imu", 0, 0, vec![0.0, 0.0]).unwrap(),
            PushStatus::Accepted
        );
        assert_eq!(
            sync.push_values("imu", 0, 10, vec![10.0, 20.0]).unwrap(),
            PushStatus::Accepted
        );

        assert_eq!(
            sync.push_values("lidar", 0, 5, vec![1.0]).unwrap(),
            PushStatus::Emitted
        );
        // past the newest imu sample: extrapolated
        assert_eq!(
            sync.push_values("lidar", 0, 15, vec![2.0]).unwrap(),
            PushStatus::Emitted
        );

        let emitted = emissions.lock().unwrap();
        assert_eq!(emitted.len(), 2);
        assert_eq!(emitted[0].0, 5);
        assert_eq!(value(&emitted[0].1, 1), vec![5.0, 10.0]);
        assert_eq!(emitted[1].0, 15);
        assert_eq!(value(&emitted[1].1, 1), vec![15.0, 30.0]);
    }

    #[test]
    fn test_e2e_sub_streams() {
        let (mut sync, emissions) = build(
            r#"
[synchronizer]
mode = "min_interval"
min_interval = 1

[[streams]]
name = "cams"
retrieval = "nearest"
valid_window = 5
sub_streams = 2
"#,
        );

        assert_eq!(
            sync.push_values("cams", 0, 100, vec![1.0]).unwrap(),
            PushStatus::Accepted
        );
        assert_eq!(
            sync.push_values("cams", 1, 103, vec![2.0]).unwrap(),
            PushStatus::Emitted
        );
        assert_eq!(sync.sub_queue_size("cams", 1).unwrap(), 1);

        let emitted = emissions.lock().unwrap();
        assert_eq!(emitted[0].0, 100);
        let slots = &emitted[0].1[0];
        assert_eq!(slots.len(), 2);
        assert!(slots.iter().all(Option::is_some));
    }

    #[test]
    fn test_e2e_rejects_bad_input() {
        let (mut sync, _) = build(TWO_EXACT);

        assert!(matches!(
            sync.push_values("c", 0, 1, vec![0.0]),
            Err(ContractError::UnknownStream { .. })
        ));
        assert!(matches!(
            sync.push_values("a", 1, 1, vec![0.0]),
            Err(ContractError::UnknownSubStream { .. })
        ));
        assert!(matches!(
            sync.push_values("a", 0, 1, vec![0.0, 1.0]),
            Err(ContractError::PayloadShape {
                expected: 1,
                actual: 2,
                ..
            })
        ));
        assert_eq!(sync.queue_size("a").unwrap(), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected_before_build() {
        let err = ConfigLoader::load_from_str(
            r#"
[synchronizer]
mode = "master_slave"

[[streams]]
name = "a"
retrieval = "exact_time"
"#,
            ConfigFormat::Toml,
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }
}
