//! Homogeneous fan-out over same-typed policies.

use contracts::{Attribute, PeekOutcome, Timestamp};

use crate::participants::{JoinParticipant, OutcomeTally};

/// Ordered list of same-typed participants addressed by sub id `0..len`.
///
/// The array has no attribute of its own: each member's attribute decides
/// whether it can block the array's aggregate outcome.
#[derive(Debug, Clone)]
pub struct PolicyArray<P> {
    members: Vec<P>,
}

impl<P> PolicyArray<P> {
    pub fn new(members: Vec<P>) -> Self {
        Self { members }
    }

    /// `count` members built by `make(sub_id)`.
    pub fn from_fn(count: usize, make: impl FnMut(usize) -> P) -> Self {
        Self::new((0..count).map(make).collect())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, sub_id: usize) -> Option<&P> {
        self.members.get(sub_id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, P> {
        self.members.iter()
    }
}

impl<P: JoinParticipant> PolicyArray<P> {
    /// Buffered entries of member `sub_id`.
    ///
    /// # Panics
    ///
    /// Panics if `sub_id >= self.len()`.
    pub fn queue_size(&self, sub_id: usize) -> usize {
        self.members[sub_id].queue_size()
    }
}

impl<P> FromIterator<P> for PolicyArray<P> {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<P: JoinParticipant> JoinParticipant for PolicyArray<P> {
    type Input = (P::Input, usize);
    type Output = Vec<P::Output>;

    /// # Panics
    ///
    /// Panics if the sub id is out of range.
    fn push(&mut self, time: Timestamp, (input, sub_id): Self::Input) -> bool {
        self.members[sub_id].push(time, input)
    }

    fn suc_time(&self, time: Timestamp, interest: Attribute) -> Timestamp {
        self.members
            .iter()
            .map(|m| m.suc_time(time, interest))
            .min()
            .unwrap_or(contracts::NO_CANDIDATE)
    }

    fn peek(&self, time: Timestamp) -> (Self::Output, PeekOutcome) {
        let mut tally = OutcomeTally::default();
        let outputs = self
            .members
            .iter()
            .map(|m| {
                let (output, outcome) = m.peek(time);
                tally.record(m.blocks_join(), outcome);
                output
            })
            .collect();
        (outputs, tally.outcome())
    }

    fn queue_size(&self) -> usize {
        self.members.iter().map(JoinParticipant::queue_size).sum()
    }

    fn sub_queue_size(&self, sub_id: usize) -> usize {
        PolicyArray::queue_size(self, sub_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{ExactTimePolicy, NewestPolicy};

    fn exact_pair() -> PolicyArray<ExactTimePolicy<u32>> {
        PolicyArray::from_fn(2, |_| ExactTimePolicy::new(100))
    }

    #[test]
    fn test_push_routes_by_sub_id() {
        let mut array = exact_pair();
        assert!(array.push(1, (10, 0)));
        assert!(array.push(1, (11, 1)));
        assert!(array.push(2, (12, 1)));
        assert!(!array.push(2, (13, 1)));
        assert_eq!(array.queue_size(0), 1);
        assert_eq!(array.queue_size(1), 2);
        assert_eq!(JoinParticipant::queue_size(&array), 3);
    }

    #[test]
    #[should_panic]
    fn test_push_out_of_range_panics() {
        let mut array = exact_pair();
        array.push(1, (10, 2));
    }

    #[test]
    #[should_panic]
    fn test_queue_size_out_of_range_panics() {
        exact_pair().queue_size(5);
    }

    #[test]
    fn test_suc_time_is_member_minimum() {
        let mut array = exact_pair();
        array.push(7, (0, 0));
        array.push(4, (0, 1));
        assert_eq!(array.suc_time(0, Attribute::Normal), 4);
        assert_eq!(array.suc_time(4, Attribute::Normal), 7);
    }

    #[test]
    fn test_peek_aggregate() {
        let mut array = exact_pair();
        array.push(5, (50, 0));
        array.push(5, (51, 1));
        assert_eq!(
            array.peek(5),
            (vec![Some(50), Some(51)], PeekOutcome::Success)
        );

        array.push(8, (80, 0));
        // member 0 moved past 6, member 1 may still receive it
        assert_eq!(array.peek(6), (vec![None, None], PeekOutcome::Expired));
        assert_eq!(array.peek(9), (vec![None, None], PeekOutcome::NotReady));
    }

    #[test]
    fn test_optional_members_reported_but_not_blocking() {
        let mut array = PolicyArray::new(vec![
            NewestPolicy::new(0),
            NewestPolicy::new(0).with_attribute(Attribute::Optional),
        ]);
        array.push(1, ('a', 0));
        assert_eq!(array.peek(1), (vec![Some('a'), None], PeekOutcome::Success));
    }
}
