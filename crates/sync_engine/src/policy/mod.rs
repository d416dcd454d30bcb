//! Single-stream policies.
//!
//! A [`Policy`] owns one [`Storage`], one [`Attribute`] and one
//! [`RetrievalStrategy`]. The strategy decides what "the value at time t"
//! means for the stream; the policy turns a missing value into either
//! `Expired` (the buffer already moved past `t`) or `NotReady`.

mod exact_time;
mod linear_interpolate;
mod nearest;
mod newest;
mod retrieval;

pub use exact_time::ExactTime;
pub use linear_interpolate::LinearInterpolate;
pub use nearest::Nearest;
pub use newest::Newest;
pub use retrieval::Retrieval;

use contracts::{
    Attribute, PeekOutcome, Timestamp, DEFAULT_HISTORY_WINDOW, DEFAULT_NEWEST_HISTORY_WINDOW,
    DEFAULT_PREDICT_WINDOW, DEFAULT_VALID_WINDOW, NO_CANDIDATE,
};
use tracing::trace;

use crate::participants::JoinParticipant;
use crate::storage::{Storage, TimeIndexedStorage};

/// How a policy answers "what is the value at `time`".
///
/// Implementations only see the storage through its ordered lookups.
pub trait RetrievalStrategy<M> {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// The value at `time`, or `None` if it cannot be produced (yet).
    fn retrieve<S>(&self, storage: &S, time: Timestamp) -> Option<M>
    where
        S: Storage<Msg = M>;
}

/// One buffered stream plus its retrieval rule.
#[derive(Debug, Clone)]
pub struct Policy<R, S> {
    storage: S,
    strategy: R,
    attribute: Attribute,
}

pub type ExactTimePolicy<M> = Policy<ExactTime, TimeIndexedStorage<M>>;
pub type NearestPolicy<M> = Policy<Nearest, TimeIndexedStorage<M>>;
pub type LinearInterpolatePolicy<M> = Policy<LinearInterpolate, TimeIndexedStorage<M>>;
pub type NewestPolicy<M> = Policy<Newest, TimeIndexedStorage<M>>;
/// Policy whose strategy is chosen at runtime from configuration.
pub type DynPolicy<M> = Policy<Retrieval, TimeIndexedStorage<M>>;

impl<R, S> Policy<R, S> {
    /// Build a policy over an existing storage backend.
    pub fn with_storage(strategy: R, storage: S) -> Self {
        Self {
            storage,
            strategy,
            attribute: Attribute::default(),
        }
    }

    /// Set the strictness rank (default: `Normal`).
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attribute = attribute;
        self
    }

    pub fn attribute(&self) -> Attribute {
        self.attribute
    }

    pub fn strategy(&self) -> &R {
        &self.strategy
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<M> ExactTimePolicy<M> {
    pub fn new(history_window: Timestamp) -> Self {
        Self::with_storage(ExactTime, TimeIndexedStorage::new(history_window))
    }
}

impl<M> Default for ExactTimePolicy<M> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}

impl<M> NearestPolicy<M> {
    pub fn new(history_window: Timestamp, valid_window: Timestamp) -> Self {
        Self::with_storage(
            Nearest { valid_window },
            TimeIndexedStorage::new(history_window),
        )
    }
}

impl<M> Default for NearestPolicy<M> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW, DEFAULT_VALID_WINDOW)
    }
}

impl<M> LinearInterpolatePolicy<M> {
    pub fn new(history_window: Timestamp, predict_window: Timestamp) -> Self {
        Self::with_storage(
            LinearInterpolate { predict_window },
            TimeIndexedStorage::new(history_window),
        )
    }
}

impl<M> Default for LinearInterpolatePolicy<M> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW, DEFAULT_PREDICT_WINDOW)
    }
}

impl<M> NewestPolicy<M> {
    pub fn new(history_window: Timestamp) -> Self {
        Self::with_storage(Newest, TimeIndexedStorage::new(history_window))
    }
}

impl<M> Default for NewestPolicy<M> {
    fn default() -> Self {
        Self::new(DEFAULT_NEWEST_HISTORY_WINDOW)
    }
}

impl<R, S> JoinParticipant for Policy<R, S>
where
    S: Storage,
    R: RetrievalStrategy<S::Msg>,
{
    type Input = S::Msg;
    type Output = Option<S::Msg>;

    #[inline]
    fn push(&mut self, time: Timestamp, input: S::Msg) -> bool {
        self.storage.push(time, input)
    }

    fn suc_time(&self, time: Timestamp, interest: Attribute) -> Timestamp {
        if self.attribute < interest {
            return NO_CANDIDATE;
        }
        self.storage
            .find_successor(time)
            .map_or(NO_CANDIDATE, |(suc, _)| suc)
    }

    fn peek(&self, time: Timestamp) -> (Option<S::Msg>, PeekOutcome) {
        if let Some(value) = self.strategy.retrieve(&self.storage, time) {
            return (Some(value), PeekOutcome::Success);
        }

        let outcome = match self.storage.back() {
            Some((newest, _)) if time < newest => PeekOutcome::Expired,
            _ => PeekOutcome::NotReady,
        };
        trace!(
            strategy = self.strategy.name(),
            time,
            outcome = outcome.as_str(),
            buffered = self.storage.len(),
            "Peek missed"
        );
        (None, outcome)
    }

    #[inline]
    fn blocks_join(&self) -> bool {
        self.attribute.blocks_join()
    }

    #[inline]
    fn queue_size(&self) -> usize {
        self.storage.len()
    }

    fn sub_queue_size(&self, sub_id: usize) -> usize {
        assert_eq!(sub_id, 0, "single-stream policy has no sub-stream {sub_id}");
        self.storage.len()
    }
}
