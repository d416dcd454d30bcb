//! Status contracts between policies and the synchronizer.
//!
//! These are normal control-flow outcomes, never errors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-policy strictness rank.
///
/// Totally ordered `Optional < Normal < Master`. The rank decides whether a
/// policy's timestamps are visible to a successor-time query at a given
/// interest level, and whether its failure can block a join.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Never blocks a join; its output may be missing from an emitted tuple
    Optional,
    /// Must succeed for a join to be emitted
    #[default]
    Normal,
    /// Drives candidate generation in master/slave mode
    Master,
}

impl Attribute {
    /// Whether a failure of a policy with this rank can block a join.
    pub fn blocks_join(self) -> bool {
        self != Attribute::Optional
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::Optional => "optional",
            Attribute::Normal => "normal",
            Attribute::Master => "master",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of peeking a policy (or a set of policies) at an instant.
///
/// Ordered `NotReady < Expired < Success`; the join loop keeps going while
/// the outcome ranks above `NotReady`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeekOutcome {
    /// Not enough data yet; may succeed once more is pushed
    NotReady,
    /// Data has moved past this instant; it can never succeed
    Expired,
    /// A value is available at this instant
    Success,
}

impl PeekOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            PeekOutcome::NotReady => "not_ready",
            PeekOutcome::Expired => "expired",
            PeekOutcome::Success => "success",
        }
    }
}

impl fmt::Display for PeekOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of pushing one message into a synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushStatus {
    /// Rejected: timestamp not greater than the stream's newest
    Dropped,
    /// Stored, nothing emitted during this push
    Accepted,
    /// Stored and at least one tuple was emitted
    Emitted,
}

impl PushStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PushStatus::Dropped => "dropped",
            PushStatus::Accepted => "accepted",
            PushStatus::Emitted => "emitted",
        }
    }
}

impl fmt::Display for PushStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_ordering() {
        assert!(Attribute::Optional < Attribute::Normal);
        assert!(Attribute::Normal < Attribute::Master);
        assert_eq!(Attribute::default(), Attribute::Normal);
        assert!(!Attribute::Optional.blocks_join());
        assert!(Attribute::Master.blocks_join());
    }

    #[test]
    fn test_peek_outcome_ordering() {
        assert!(PeekOutcome::Success > PeekOutcome::Expired);
        assert!(PeekOutcome::Expired > PeekOutcome::NotReady);
    }

    #[test]
    fn test_status_serde_names() {
        let json = serde_json::to_string(&PushStatus::Emitted).unwrap();
        assert_eq!(json, "\"emitted\"");
        let attr: Attribute = serde_json::from_str("\"master\"").unwrap();
        assert_eq!(attr, Attribute::Master);
    }
}
