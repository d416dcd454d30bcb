//! Sync engine configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{Attribute, Timestamp};

/// Default retention horizon for time-indexed streams.
pub const DEFAULT_HISTORY_WINDOW: Timestamp = 1_000_000;
/// Default retention horizon for `newest` streams (keep only the latest entry).
pub const DEFAULT_NEWEST_HISTORY_WINDOW: Timestamp = 0;
/// Default maximum distance accepted by `nearest`.
pub const DEFAULT_VALID_WINDOW: Timestamp = 500_000;
/// Default maximum extrapolation distance for `linear_interpolate`.
pub const DEFAULT_PREDICT_WINDOW: Timestamp = 500_000;

/// How the synchronizer moves its pivot after each join attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PivotStrategy {
    /// Candidates come from every non-optional stream; consecutive emissions
    /// are at least `min_interval` apart
    MinInterval { min_interval: Timestamp },
    /// Candidates are exactly the master streams' own timestamps
    MasterSlave,
}

impl PivotStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            PivotStrategy::MinInterval { .. } => "min_interval",
            PivotStrategy::MasterSlave => "master_slave",
        }
    }
}

/// Retrieval strategy of one stream, tagged by the `retrieval` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "retrieval", rename_all = "snake_case")]
pub enum RetrievalConfig {
    /// Only an entry at exactly the requested time
    ExactTime,
    /// Closest entry within `valid_window`
    Nearest {
        #[serde(default = "default_valid_window")]
        valid_window: Timestamp,
    },
    /// Interpolated between neighbours, extrapolated at most `predict_window`
    LinearInterpolate {
        #[serde(default = "default_predict_window")]
        predict_window: Timestamp,
    },
    /// Latest entry regardless of the requested time
    Newest,
}

impl RetrievalConfig {
    pub fn name(&self) -> &'static str {
        match self {
            RetrievalConfig::ExactTime => "exact_time",
            RetrievalConfig::Nearest { .. } => "nearest",
            RetrievalConfig::LinearInterpolate { .. } => "linear_interpolate",
            RetrievalConfig::Newest => "newest",
        }
    }

    /// Strategy-specific window, if the strategy has one.
    pub fn window(&self) -> Option<Timestamp> {
        match *self {
            RetrievalConfig::Nearest { valid_window } => Some(valid_window),
            RetrievalConfig::LinearInterpolate { predict_window } => Some(predict_window),
            RetrievalConfig::ExactTime | RetrievalConfig::Newest => None,
        }
    }

    /// Retention horizon used when a stream does not set one.
    pub fn default_history_window(&self) -> Timestamp {
        match self {
            RetrievalConfig::Newest => DEFAULT_NEWEST_HISTORY_WINDOW,
            _ => DEFAULT_HISTORY_WINDOW,
        }
    }
}

/// Configuration of one input stream.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StreamConfig {
    /// Unique stream name, used to route trace records
    #[validate(length(min = 1))]
    pub name: String,

    /// Retrieval strategy and its window
    #[serde(flatten)]
    pub retrieval: RetrievalConfig,

    /// Retention horizon, same unit as timestamps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub history_window: Option<Timestamp>,

    /// Strictness rank
    #[serde(default)]
    pub attribute: Attribute,

    /// Number of homogeneous sub-streams (e.g. N cameras of one kind)
    #[serde(default = "default_sub_streams")]
    #[validate(range(min = 1))]
    pub sub_streams: usize,

    /// Width of the numeric payload carried by replayed records
    #[serde(default = "default_dimension")]
    #[validate(range(min = 1))]
    pub dimension: usize,
}

impl StreamConfig {
    /// Effective retention horizon.
    pub fn history_window(&self) -> Timestamp {
        self.history_window
            .unwrap_or_else(|| self.retrieval.default_history_window())
    }
}

fn default_valid_window() -> Timestamp {
    DEFAULT_VALID_WINDOW
}

fn default_predict_window() -> Timestamp {
    DEFAULT_PREDICT_WINDOW
}

fn default_sub_streams() -> usize {
    1
}

fn default_dimension() -> usize {
    1
}
