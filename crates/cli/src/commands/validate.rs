//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{Attribute, PivotStrategy, RetrievalConfig, SyncBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    mode: String,
    stream_count: usize,
    policy_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    mode: blueprint.synchronizer.name().to_string(),
                    stream_count: blueprint.streams.len(),
                    policy_count: blueprint.policy_count(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &SyncBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.synchronizer != PivotStrategy::MasterSlave
        && blueprint
            .streams
            .iter()
            .all(|s| s.attribute == Attribute::Optional)
    {
        warnings.push("All streams are optional - no join candidates will ever be produced".into());
    }

    for stream in &blueprint.streams {
        match stream.retrieval {
            RetrievalConfig::Newest if stream.history_window() > 0 => warnings.push(format!(
                "Stream '{}' uses newest retrieval but retains {} time units of history",
                stream.name,
                stream.history_window()
            )),
            RetrievalConfig::LinearInterpolate { predict_window }
                if predict_window > stream.history_window() =>
            {
                warnings.push(format!(
                    "Stream '{}' predict_window ({}) exceeds history_window ({})",
                    stream.name,
                    predict_window,
                    stream.history_window()
                ))
            }
            _ => {}
        }

        if blueprint.synchronizer == PivotStrategy::MasterSlave
            && stream.attribute == Attribute::Master
            && stream.sub_streams > 1
        {
            warnings.push(format!(
                "Master stream '{}' has {} sub-streams - every one of them produces candidates",
                stream.name, stream.sub_streams
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Mode: {}", summary.mode);
            println!("  Streams: {}", summary.stream_count);
            println!("  Policies: {}", summary.policy_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
