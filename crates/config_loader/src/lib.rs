//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `SyncBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("sync.toml")).unwrap();
//! println!("Mode: {}", blueprint.synchronizer.name());
//! ```

mod parser;
mod validator;

pub use contracts::SyncBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<SyncBlueprint, ContractError> {
        let format = Self::detect_format(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<SyncBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Run validation only, on an already parsed blueprint
    pub fn validate(blueprint: &SyncBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    /// Serialize SyncBlueprint to TOML string
    pub fn to_toml(blueprint: &SyncBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize SyncBlueprint to JSON string
    pub fn to_json(blueprint: &SyncBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }

    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Attribute, PivotStrategy, RetrievalConfig};

    const MINIMAL_TOML: &str = r#"
[synchronizer]
mode = "master_slave"

[[streams]]
name = "front_camera"
retrieval = "exact_time"
attribute = "master"

[[streams]]
name = "imu"
retrieval = "linear_interpolate"
history_window = 2000
predict_window = 100
dimension = 6

[[streams]]
name = "gps"
retrieval = "nearest"
sub_streams = 2
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.synchronizer, PivotStrategy::MasterSlave);
        assert_eq!(bp.streams[0].attribute, Attribute::Master);
        assert_eq!(
            bp.streams[2].retrieval,
            RetrievalConfig::Nearest {
                valid_window: contracts::DEFAULT_VALID_WINDOW
            }
        );
        assert_eq!(bp.policy_count(), 4);
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.synchronizer, bp2.synchronizer);
        assert_eq!(bp.streams.len(), bp2.streams.len());
        assert_eq!(bp.streams[1].retrieval, bp2.streams[1].retrieval);
        assert_eq!(bp.streams[1].history_window(), bp2.streams[1].history_window());
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.streams[2].sub_streams, bp2.streams[2].sub_streams);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[synchronizer]
mode = "min_interval"
min_interval = 5

[[streams]]
name = "cam"
retrieval = "exact_time"

[[streams]]
name = "cam"
retrieval = "newest"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("sync.toml");
        std::fs::write(&toml_path, MINIMAL_TOML).unwrap();
        assert!(ConfigLoader::load_from_path(&toml_path).is_ok());

        let yaml_path = dir.path().join("sync.yaml");
        std::fs::write(&yaml_path, "streams: []").unwrap();
        let err = ConfigLoader::load_from_path(&yaml_path).unwrap_err();
        assert!(err.to_string().contains("unsupported"), "got: {err}");
    }
}
