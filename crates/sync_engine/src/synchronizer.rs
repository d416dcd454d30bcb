//! The join loop.
//!
//! A [`Synchronizer`] owns a fixed set of participants and a pivot. Every
//! accepted push runs the join loop: take the smallest successor of the pivot
//! over all participants as the next candidate, peek everybody there, emit on
//! success, advance the pivot, and keep going until a candidate is not ready
//! yet or none is left.

use std::fmt;

use contracts::{
    Attribute, PeekOutcome, PivotStrategy, PushStatus, Timestamp, BEFORE_ALL_TIME, NO_CANDIDATE,
};
use tracing::{debug, instrument, trace};

use crate::participants::{JoinParticipant, ParticipantSet, StreamAt};
use crate::pivot::PivotAdvance;
use crate::policy_array::PolicyArray;

/// Receives `(time, outputs)` for every successful join.
pub type EmitCallback<O> = Box<dyn FnMut(Timestamp, O) + Send>;

pub struct Synchronizer<P: ParticipantSet> {
    participants: P,
    strategy: PivotStrategy,
    /// Next candidate must be strictly greater than this.
    pivot: Timestamp,
    callback: Option<EmitCallback<P::Outputs>>,
    emitted: u64,
}

impl<P: ParticipantSet + fmt::Debug> fmt::Debug for Synchronizer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchronizer")
            .field("participants", &self.participants)
            .field("strategy", &self.strategy)
            .field("pivot", &self.pivot)
            .field("has_callback", &self.callback.is_some())
            .field("emitted", &self.emitted)
            .finish()
    }
}

impl<P: ParticipantSet> Synchronizer<P> {
    /// A `MinInterval` spacing below 1 is raised to 1.
    pub fn new(strategy: PivotStrategy, participants: P) -> Self {
        let strategy = match strategy {
            PivotStrategy::MinInterval { min_interval } => PivotStrategy::MinInterval {
                min_interval: min_interval.max(1),
            },
            other => other,
        };
        Self {
            participants,
            strategy,
            pivot: BEFORE_ALL_TIME,
            callback: None,
            emitted: 0,
        }
    }

    /// Emissions at least `min_interval` apart, candidates from every
    /// non-optional participant.
    pub fn min_interval(min_interval: Timestamp, participants: P) -> Self {
        Self::new(PivotStrategy::MinInterval { min_interval }, participants)
    }

    /// One join attempt per timestamp of the `Master` participants.
    pub fn master_slave(participants: P) -> Self {
        Self::new(PivotStrategy::MasterSlave, participants)
    }

    /// Replace the emission callback.
    pub fn register_callback<F>(&mut self, callback: F)
    where
        F: FnMut(Timestamp, P::Outputs) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Emissions are still computed and counted, then discarded.
    pub fn clear_callback(&mut self) {
        self.callback = None;
    }

    /// Push into the participant at position `I`.
    #[instrument(
        level = "trace",
        name = "synchronizer_push",
        skip(self, input),
        fields(stream = I)
    )]
    pub fn push<const I: usize>(
        &mut self,
        time: Timestamp,
        input: <<P as StreamAt<I>>::Stream as JoinParticipant>::Input,
    ) -> PushStatus
    where
        P: StreamAt<I>,
    {
        let accepted = self.participants.stream_mut().push(time, input);
        self.after_push(I, time, accepted)
    }

    pub fn stream<const I: usize>(&self) -> &<P as StreamAt<I>>::Stream
    where
        P: StreamAt<I>,
    {
        self.participants.stream()
    }

    pub fn participants(&self) -> &P {
        &self.participants
    }

    pub fn time_pivot(&self) -> Timestamp {
        self.pivot
    }

    pub fn interest(&self) -> Attribute {
        self.strategy.interest()
    }

    pub fn strategy(&self) -> PivotStrategy {
        self.strategy
    }

    /// Successful joins so far, delivered or not.
    pub fn emitted_count(&self) -> u64 {
        self.emitted
    }

    pub fn arity(&self) -> usize {
        self.participants.arity()
    }

    /// # Panics
    ///
    /// Panics if `stream >= self.arity()`.
    pub fn queue_size(&self, stream: usize) -> usize {
        self.participants.queue_size(stream)
    }

    /// # Panics
    ///
    /// Panics if `stream` or `sub_id` is out of range.
    pub fn sub_queue_size(&self, stream: usize, sub_id: usize) -> usize {
        self.participants.sub_queue_size(stream, sub_id)
    }

    fn after_push(&mut self, stream: usize, time: Timestamp, accepted: bool) -> PushStatus {
        let status = if !accepted {
            debug!(stream, time, pivot = self.pivot, "Rejected non-increasing timestamp");
            PushStatus::Dropped
        } else if self.check_queue() > 0 {
            PushStatus::Emitted
        } else {
            PushStatus::Accepted
        };
        metrics::counter!("stream_sync_push_total", "status" => status.as_str()).increment(1);
        status
    }

    /// Runs join attempts until one is not ready or no candidate is left.
    /// Returns the number of emissions.
    fn check_queue(&mut self) -> u64 {
        let interest = self.strategy.interest();
        let mut emitted = 0;

        loop {
            let candidate = self.participants.suc_time(self.pivot, interest);
            if candidate == NO_CANDIDATE {
                break;
            }

            let (outputs, outcome) = self.participants.peek(candidate);
            match outcome {
                PeekOutcome::Success => {
                    emitted += 1;
                    if let Some(callback) = self.callback.as_mut() {
                        callback(candidate, outputs);
                    }
                }
                PeekOutcome::Expired => {
                    trace!(candidate, pivot = self.pivot, "Candidate expired");
                    metrics::counter!("stream_sync_expired_total").increment(1);
                }
                PeekOutcome::NotReady => {}
            }

            let previous = self.pivot;
            self.pivot = self.strategy.advance(previous, candidate, outcome);
            debug_assert!(self.pivot >= previous);
            if outcome == PeekOutcome::Success {
                trace!(candidate, pivot = self.pivot, "Emitted");
            }

            if outcome == PeekOutcome::NotReady {
                break;
            }
        }

        if emitted > 0 {
            self.emitted += emitted;
            metrics::counter!("stream_sync_emissions_total").increment(emitted);
        }
        metrics::gauge!("stream_sync_time_pivot").set(self.pivot as f64);
        emitted
    }
}

impl<Q: JoinParticipant> Synchronizer<Vec<Q>> {
    /// Push into participant `stream` of a runtime-sized set.
    ///
    /// # Panics
    ///
    /// Panics if `stream >= self.arity()`.
    #[instrument(level = "trace", name = "synchronizer_push_at", skip(self, input))]
    pub fn push_at(&mut self, stream: usize, time: Timestamp, input: Q::Input) -> PushStatus {
        let accepted = self.participants[stream].push(time, input);
        self.after_push(stream, time, accepted)
    }

    pub fn stream_at(&self, stream: usize) -> Option<&Q> {
        self.participants.get(stream)
    }
}

/// Synchronizer over one array of same-typed policies.
pub type HomogeneousSynchronizer<P> = Synchronizer<(PolicyArray<P>,)>;

impl<P: JoinParticipant> Synchronizer<(PolicyArray<P>,)> {
    /// # Panics
    ///
    /// Panics if `sub_id` is out of range.
    pub fn push_to(&mut self, time: Timestamp, msg: P::Input, sub_id: usize) -> PushStatus {
        self.push::<0>(time, (msg, sub_id))
    }

    /// # Panics
    ///
    /// Panics if `sub_id` is out of range.
    pub fn member_queue_size(&self, sub_id: usize) -> usize {
        self.participants.0.queue_size(sub_id)
    }
}
