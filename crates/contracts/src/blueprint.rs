//! SyncBlueprint - Config Loader output
//!
//! Describes a complete synchronizer: pivot strategy plus the ordered stream list.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{PivotStrategy, StreamConfig};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete synchronizer blueprint.
///
/// Stream order is significant: it is the position of each stream's output
/// in every emitted tuple.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SyncBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Pivot-advance strategy
    pub synchronizer: PivotStrategy,

    /// Ordered input streams
    #[validate(nested)]
    pub streams: Vec<StreamConfig>,
}

impl SyncBlueprint {
    /// Position of the stream called `name`.
    pub fn stream_index(&self, name: &str) -> Option<usize> {
        self.streams.iter().position(|s| s.name == name)
    }

    /// Total number of leaf policies across all streams.
    pub fn policy_count(&self) -> usize {
        self.streams.iter().map(|s| s.sub_streams).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attribute, RetrievalConfig};

    const BLUEPRINT_TOML: &str = r#"
[synchronizer]
mode = "min_interval"
min_interval = 10

[[streams]]
name = "camera"
retrieval = "exact_time"
history_window = 100

[[streams]]
name = "imu"
retrieval = "linear_interpolate"
predict_window = 0
attribute = "optional"
dimension = 6
"#;

    #[test]
    fn test_blueprint_from_toml() {
        let bp: SyncBlueprint = toml::from_str(BLUEPRINT_TOML).unwrap();
        assert_eq!(bp.version, ConfigVersion::V1);
        assert_eq!(
            bp.synchronizer,
            PivotStrategy::MinInterval { min_interval: 10 }
        );
        assert_eq!(bp.streams.len(), 2);
        assert_eq!(bp.streams[0].history_window(), 100);
        assert_eq!(
            bp.streams[1].retrieval,
            RetrievalConfig::LinearInterpolate { predict_window: 0 }
        );
        assert_eq!(bp.streams[1].attribute, Attribute::Optional);
        assert_eq!(bp.stream_index("imu"), Some(1));
        assert_eq!(bp.stream_index("lidar"), None);
        assert_eq!(bp.policy_count(), 2);
        assert!(bp.validate().is_ok());
    }
}
