//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{PivotStrategy, SyncBlueprint, Timestamp};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    synchronizer: SynchronizerInfo,
    streams: Vec<StreamInfo>,
}

#[derive(Serialize)]
struct SynchronizerInfo {
    mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_interval: Option<Timestamp>,
    interest: String,
    policy_count: usize,
}

#[derive(Serialize)]
struct StreamInfo {
    index: usize,
    name: String,
    retrieval: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    window: Option<Timestamp>,
    history_window: Timestamp,
    attribute: String,
    sub_streams: usize,
    dimension: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_config_info(&blueprint);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(blueprint: &SyncBlueprint) -> ConfigInfo {
    use sync_engine::PivotAdvance;

    let min_interval = match blueprint.synchronizer {
        PivotStrategy::MinInterval { min_interval } => Some(min_interval),
        PivotStrategy::MasterSlave => None,
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        synchronizer: SynchronizerInfo {
            mode: blueprint.synchronizer.name().to_string(),
            min_interval,
            interest: blueprint.synchronizer.interest().to_string(),
            policy_count: blueprint.policy_count(),
        },
        streams: blueprint
            .streams
            .iter()
            .enumerate()
            .map(|(index, s)| StreamInfo {
                index,
                name: s.name.clone(),
                retrieval: s.retrieval.name().to_string(),
                window: s.retrieval.window(),
                history_window: s.history_window(),
                attribute: s.attribute.to_string(),
                sub_streams: s.sub_streams,
                dimension: s.dimension,
            })
            .collect(),
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("\n=== Synchronizer ===");
    println!("  Version: {}", info.version);
    println!("  Mode: {}", info.synchronizer.mode);
    if let Some(min_interval) = info.synchronizer.min_interval {
        println!("  Min interval: {}", min_interval);
    }
    println!("  Candidate interest: {}", info.synchronizer.interest);
    println!("  Leaf policies: {}", info.synchronizer.policy_count);

    println!("\n=== Streams ({}) ===", info.streams.len());
    for s in &info.streams {
        let window = s
            .window
            .map(|w| format!(", window={w}"))
            .unwrap_or_default();
        println!(
            "  [{}] {} - {}{}, history={}, {}, sub_streams={}, dim={}",
            s.index,
            s.name,
            s.retrieval,
            window,
            s.history_window,
            s.attribute,
            s.sub_streams,
            s.dimension
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Attribute, ConfigVersion, RetrievalConfig, StreamConfig};

    #[test]
    fn test_build_config_info() {
        let blueprint = SyncBlueprint {
            version: ConfigVersion::V1,
            synchronizer: PivotStrategy::MasterSlave,
            streams: vec![
                StreamConfig {
                    name: "lidar".into(),
                    retrieval: RetrievalConfig::ExactTime,
                    history_window: None,
                    attribute: Attribute::Master,
                    sub_streams: 1,
                    dimension: 1,
                },
                StreamConfig {
                    name: "cams".into(),
                    retrieval: RetrievalConfig::Nearest { valid_window: 50 },
                    history_window: Some(1_000),
                    attribute: Attribute::Normal,
                    sub_streams: 4,
                    dimension: 1,
                },
            ],
        };

        let info = build_config_info(&blueprint);
        assert_eq!(info.synchronizer.interest, "master");
        assert_eq!(info.synchronizer.min_interval, None);
        assert_eq!(info.synchronizer.policy_count, 5);
        assert_eq!(info.streams[0].history_window, contracts::DEFAULT_HISTORY_WINDOW);
        assert_eq!(info.streams[1].window, Some(50));

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["streams"][1]["retrieval"], "nearest");
        assert!(json["synchronizer"].get("min_interval").is_none());
    }
}
