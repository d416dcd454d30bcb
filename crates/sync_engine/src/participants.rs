//! Join participants and the sets a synchronizer drives.
//!
//! A participant is anything the join loop can push into, ask for the next
//! candidate time, and peek at a candidate: a single-stream [`Policy`] or a
//! homogeneous [`PolicyArray`]. A [`ParticipantSet`] is the fixed, ordered
//! collection the synchronizer owns: a tuple for compile-time heterogeneous
//! sets, or a `Vec` for runtime-configured homogeneous ones.
//!
//! [`Policy`]: crate::Policy
//! [`PolicyArray`]: crate::PolicyArray

use contracts::{Attribute, PeekOutcome, Timestamp, NO_CANDIDATE};

/// Operations the join loop needs from one stream (or fan-out of streams).
pub trait JoinParticipant {
    type Input;
    type Output;

    /// Store a message. `false` when rejected by timestamp monotonicity.
    fn push(&mut self, time: Timestamp, input: Self::Input) -> bool;

    /// Smallest stored timestamp `> time` visible at `interest`, or
    /// [`NO_CANDIDATE`].
    fn suc_time(&self, time: Timestamp, interest: Attribute) -> Timestamp;

    /// Retrieve the output at `time` and classify it.
    fn peek(&self, time: Timestamp) -> (Self::Output, PeekOutcome);

    /// Whether a failed peek blocks the enclosing join.
    fn blocks_join(&self) -> bool {
        true
    }

    /// Number of buffered entries across all members.
    fn queue_size(&self) -> usize;

    /// Number of buffered entries of member `sub_id`.
    ///
    /// # Panics
    ///
    /// Panics if `sub_id` is not a member of this participant.
    fn sub_queue_size(&self, sub_id: usize) -> usize;
}

impl<P: JoinParticipant + ?Sized> JoinParticipant for Box<P> {
    type Input = P::Input;
    type Output = P::Output;

    fn push(&mut self, time: Timestamp, input: Self::Input) -> bool {
        (**self).push(time, input)
    }

    fn suc_time(&self, time: Timestamp, interest: Attribute) -> Timestamp {
        (**self).suc_time(time, interest)
    }

    fn peek(&self, time: Timestamp) -> (Self::Output, PeekOutcome) {
        (**self).peek(time)
    }

    fn blocks_join(&self) -> bool {
        (**self).blocks_join()
    }

    fn queue_size(&self) -> usize {
        (**self).queue_size()
    }

    fn sub_queue_size(&self, sub_id: usize) -> usize {
        (**self).sub_queue_size(sub_id)
    }
}

/// Aggregates member outcomes.
///
/// Success iff every blocking member succeeded; otherwise Expired iff any
/// blocking member expired; otherwise NotReady.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OutcomeTally {
    all_success: bool,
    any_expired: bool,
}

impl Default for OutcomeTally {
    fn default() -> Self {
        Self {
            all_success: true,
            any_expired: false,
        }
    }
}

impl OutcomeTally {
    #[inline]
    pub(crate) fn record(&mut self, blocking: bool, outcome: PeekOutcome) {
        if blocking {
            self.all_success &= outcome == PeekOutcome::Success;
            self.any_expired |= outcome == PeekOutcome::Expired;
        }
    }

    #[inline]
    pub(crate) fn outcome(self) -> PeekOutcome {
        if self.all_success {
            PeekOutcome::Success
        } else if self.any_expired {
            PeekOutcome::Expired
        } else {
            PeekOutcome::NotReady
        }
    }
}

/// Fixed, ordered collection of participants driven by one synchronizer.
pub trait ParticipantSet {
    /// Per-participant outputs, in declaration order.
    type Outputs;

    /// Number of participants.
    fn arity(&self) -> usize;

    /// Minimum successor time over all participants.
    fn suc_time(&self, time: Timestamp, interest: Attribute) -> Timestamp;

    /// Peek every participant at `time` and aggregate the outcome.
    fn peek(&self, time: Timestamp) -> (Self::Outputs, PeekOutcome);

    /// Buffered entries of participant `stream`.
    ///
    /// # Panics
    ///
    /// Panics if `stream >= self.arity()`.
    fn queue_size(&self, stream: usize) -> usize;

    /// Buffered entries of member `sub_id` of participant `stream`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    fn sub_queue_size(&self, stream: usize, sub_id: usize) -> usize;
}

/// Typed access to the participant at position `I` of a tuple set.
pub trait StreamAt<const I: usize> {
    type Stream: JoinParticipant;

    fn stream(&self) -> &Self::Stream;

    fn stream_mut(&mut self) -> &mut Self::Stream;
}

fn unknown_stream(stream: usize, arity: usize) -> ! {
    panic!("stream index {stream} out of range for {arity} participants")
}

macro_rules! impl_participant_set {
    (@one ($($All:ident),+); $idx:tt => $P:ident) => {
        impl<$($All: JoinParticipant),+> StreamAt<$idx> for ($($All,)+) {
            type Stream = $P;

            #[inline]
            fn stream(&self) -> &$P {
                &self.$idx
            }

            #[inline]
            fn stream_mut(&mut self) -> &mut $P {
                &mut self.$idx
            }
        }
    };

    (@stream_at $all:tt; $($idx:tt => $P:ident),+) => {
        $( impl_participant_set!(@one $all; $idx => $P); )+
    };

    ($arity:literal; $($idx:tt => $P:ident),+) => {
        impl<$($P: JoinParticipant),+> ParticipantSet for ($($P,)+) {
            type Outputs = ($($P::Output,)+);

            #[inline]
            fn arity(&self) -> usize {
                $arity
            }

            fn suc_time(&self, time: Timestamp, interest: Attribute) -> Timestamp {
                let mut suc = NO_CANDIDATE;
                $( suc = suc.min(self.$idx.suc_time(time, interest)); )+
                suc
            }

            fn peek(&self, time: Timestamp) -> (Self::Outputs, PeekOutcome) {
                let mut tally = OutcomeTally::default();
                let outputs = ($(
                    {
                        let (output, outcome) = self.$idx.peek(time);
                        tally.record(self.$idx.blocks_join(), outcome);
                        output
                    },
                )+);
                (outputs, tally.outcome())
            }

            fn queue_size(&self, stream: usize) -> usize {
                match stream {
                    $( $idx => self.$idx.queue_size(), )+
                    _ => unknown_stream(stream, $arity),
                }
            }

            fn sub_queue_size(&self, stream: usize, sub_id: usize) -> usize {
                match stream {
                    $( $idx => self.$idx.sub_queue_size(sub_id), )+
                    _ => unknown_stream(stream, $arity),
                }
            }
        }

        impl_participant_set!(@stream_at ($($P),+); $($idx => $P),+);
    };
}

impl_participant_set!(1; 0 => P0);
impl_participant_set!(2; 0 => P0, 1 => P1);
impl_participant_set!(3; 0 => P0, 1 => P1, 2 => P2);
impl_participant_set!(4; 0 => P0, 1 => P1, 2 => P2, 3 => P3);
impl_participant_set!(5; 0 => P0, 1 => P1, 2 => P2, 3 => P3, 4 => P4);
impl_participant_set!(6; 0 => P0, 1 => P1, 2 => P2, 3 => P3, 4 => P4, 5 => P5);
impl_participant_set!(7; 0 => P0, 1 => P1, 2 => P2, 3 => P3, 4 => P4, 5 => P5, 6 => P6);
impl_participant_set!(8; 0 => P0, 1 => P1, 2 => P2, 3 => P3, 4 => P4, 5 => P5, 6 => P6, 7 => P7);

/// Runtime-sized set of same-typed participants.
impl<P: JoinParticipant> ParticipantSet for Vec<P> {
    type Outputs = Vec<P::Output>;

    #[inline]
    fn arity(&self) -> usize {
        self.len()
    }

    fn suc_time(&self, time: Timestamp, interest: Attribute) -> Timestamp {
        self.iter()
            .map(|p| p.suc_time(time, interest))
            .min()
            .unwrap_or(NO_CANDIDATE)
    }

    fn peek(&self, time: Timestamp) -> (Self::Outputs, PeekOutcome) {
        let mut tally = OutcomeTally::default();
        let outputs = self
            .iter()
            .map(|p| {
                let (output, outcome) = p.peek(time);
                tally.record(p.blocks_join(), outcome);
                output
            })
            .collect();
        (outputs, tally.outcome())
    }

    fn queue_size(&self, stream: usize) -> usize {
        match self.get(stream) {
            Some(p) => p.queue_size(),
            None => unknown_stream(stream, self.len()),
        }
    }

    fn sub_queue_size(&self, stream: usize, sub_id: usize) -> usize {
        match self.get(stream) {
            Some(p) => p.sub_queue_size(sub_id),
            None => unknown_stream(stream, self.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_all_success() {
        let mut tally = OutcomeTally::default();
        tally.record(true, PeekOutcome::Success);
        tally.record(false, PeekOutcome::NotReady);
        assert_eq!(tally.outcome(), PeekOutcome::Success);
    }

    #[test]
    fn test_tally_expired_beats_not_ready() {
        let mut tally = OutcomeTally::default();
        tally.record(true, PeekOutcome::NotReady);
        tally.record(true, PeekOutcome::Expired);
        assert_eq!(tally.outcome(), PeekOutcome::Expired);
    }

    #[test]
    fn test_tally_ignores_optional_expiry() {
        let mut tally = OutcomeTally::default();
        tally.record(true, PeekOutcome::NotReady);
        tally.record(false, PeekOutcome::Expired);
        assert_eq!(tally.outcome(), PeekOutcome::NotReady);
    }

    #[test]
    fn test_empty_tally_succeeds() {
        assert_eq!(OutcomeTally::default().outcome(), PeekOutcome::Success);
    }
}
