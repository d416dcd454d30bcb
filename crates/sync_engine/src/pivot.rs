//! Pivot advancement after each join attempt.

use contracts::{Attribute, PeekOutcome, PivotStrategy, Timestamp};

/// Moves the synchronizer pivot given the candidate just examined.
pub trait PivotAdvance {
    /// Interest level used when asking participants for candidates.
    fn interest(&self) -> Attribute;

    /// New pivot after examining `candidate` with `outcome`.
    ///
    /// Must never return a value below `pivot`.
    fn advance(&self, pivot: Timestamp, candidate: Timestamp, outcome: PeekOutcome) -> Timestamp;
}

impl PivotAdvance for PivotStrategy {
    fn interest(&self) -> Attribute {
        match self {
            PivotStrategy::MinInterval { .. } => Attribute::Normal,
            PivotStrategy::MasterSlave => Attribute::Master,
        }
    }

    #[inline]
    fn advance(&self, pivot: Timestamp, candidate: Timestamp, outcome: PeekOutcome) -> Timestamp {
        match (self, outcome) {
            (_, PeekOutcome::NotReady) => pivot,
            (PivotStrategy::MinInterval { min_interval }, PeekOutcome::Success) => {
                candidate.saturating_add((*min_interval).max(1) - 1)
            }
            (_, PeekOutcome::Success | PeekOutcome::Expired) => candidate,
        }
    }
}
