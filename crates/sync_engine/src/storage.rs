//! Per-stream time-indexed storage with window-based eviction.
//!
//! Index-based separation:
//! - a `BTreeMap` orders lightweight keys (timestamp -> slab key)
//! - a `Slab` owns the actual messages
//!
//! Eviction and lookups only touch the ordered index; payloads never move.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound::{Excluded, Unbounded};

use contracts::Timestamp;
use slab::Slab;

/// Ordered, bounded buffer of `(timestamp, message)` entries for one stream.
pub trait Storage {
    type Msg;

    /// Append a message. Returns `false` (and stores nothing) when `time` is
    /// not strictly greater than the newest stored timestamp.
    fn push(&mut self, time: Timestamp, msg: Self::Msg) -> bool;

    /// Exact-match lookup.
    fn find(&self, time: Timestamp) -> Option<&Self::Msg>;

    /// Entry with the greatest timestamp `<= time`.
    fn find_predecessor(&self, time: Timestamp) -> Option<(Timestamp, &Self::Msg)>;

    /// Entry with the smallest timestamp `> time`.
    fn find_successor(&self, time: Timestamp) -> Option<(Timestamp, &Self::Msg)>;

    /// Entry with the greatest timestamp `< time`.
    fn find_before(&self, time: Timestamp) -> Option<(Timestamp, &Self::Msg)>;

    /// Oldest entry.
    fn front(&self) -> Option<(Timestamp, &Self::Msg)>;

    /// Newest entry.
    fn back(&self) -> Option<(Timestamp, &Self::Msg)>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered-map backed [`Storage`].
///
/// Invariants:
/// - timestamps are unique and strictly increasing in insertion order
/// - after a push, every entry older than `newest - history_window` is gone,
///   except that eviction never removes the last remaining entry
#[derive(Clone)]
pub struct TimeIndexedStorage<M> {
    /// Ordered index: timestamp -> slab key
    index: BTreeMap<Timestamp, usize>,
    /// Actual message storage
    slots: Slab<M>,
    history_window: Timestamp,
    rejected_count: u64,
    evicted_count: u64,
}

impl<M> fmt::Debug for TimeIndexedStorage<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeIndexedStorage")
            .field("len", &self.index.len())
            .field("history_window", &self.history_window)
            .field("oldest", &self.index.keys().next())
            .field("newest", &self.index.keys().next_back())
            .field("rejected", &self.rejected_count)
            .field("evicted", &self.evicted_count)
            .finish()
    }
}

impl<M> TimeIndexedStorage<M> {
    /// Create an empty storage retaining `history_window` time units.
    pub fn new(history_window: Timestamp) -> Self {
        Self {
            index: BTreeMap::new(),
            slots: Slab::new(),
            history_window,
            rejected_count: 0,
            evicted_count: 0,
        }
    }

    /// Retention horizon
    #[inline]
    pub fn history_window(&self) -> Timestamp {
        self.history_window
    }

    /// Pushes rejected for violating timestamp monotonicity
    #[inline]
    pub fn rejected_count(&self) -> u64 {
        self.rejected_count
    }

    /// Entries removed by window pressure
    #[inline]
    pub fn evicted_count(&self) -> u64 {
        self.evicted_count
    }

    /// Iterate entries oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Timestamp, &M)> + '_ {
        self.index.iter().map(|(&t, &key)| (t, &self.slots[key]))
    }

    #[inline]
    fn entry(&self, (&time, &key): (&Timestamp, &usize)) -> (Timestamp, &M) {
        (time, &self.slots[key])
    }

    /// Drop entries older than `newest - history_window`, keeping at least one.
    fn evict_expired(&mut self, newest: Timestamp) {
        let horizon = newest.saturating_sub(self.history_window);
        while self.index.len() > 1 {
            let Some(oldest) = self.index.first_entry() else {
                break;
            };
            if *oldest.key() >= horizon {
                break;
            }
            let key = oldest.remove();
            self.slots.remove(key);
            self.evicted_count += 1;
        }
    }
}

impl<M> Storage for TimeIndexedStorage<M> {
    type Msg = M;

    fn push(&mut self, time: Timestamp, msg: M) -> bool {
        if let Some((&newest, _)) = self.index.last_key_value() {
            if time <= newest {
                self.rejected_count += 1;
                return false;
            }
        }

        let key = self.slots.insert(msg);
        self.index.insert(time, key);
        self.evict_expired(time);
        true
    }

    #[inline]
    fn find(&self, time: Timestamp) -> Option<&M> {
        self.index.get(&time).map(|&key| &self.slots[key])
    }

    #[inline]
    fn find_predecessor(&self, time: Timestamp) -> Option<(Timestamp, &M)> {
        self.index
            .range(..=time)
            .next_back()
            .map(|e| self.entry(e))
    }

    #[inline]
    fn find_successor(&self, time: Timestamp) -> Option<(Timestamp, &M)> {
        self.index
            .range((Excluded(time), Unbounded))
            .next()
            .map(|e| self.entry(e))
    }

    #[inline]
    fn find_before(&self, time: Timestamp) -> Option<(Timestamp, &M)> {
        self.index.range(..time).next_back().map(|e| self.entry(e))
    }

    #[inline]
    fn front(&self) -> Option<(Timestamp, &M)> {
        self.index.first_key_value().map(|e| self.entry(e))
    }

    #[inline]
    fn back(&self) -> Option<(Timestamp, &M)> {
        self.index.last_key_value().map(|e| self.entry(e))
    }

    #[inline]
    fn len(&self) -> usize {
        self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(window: Timestamp, times: &[Timestamp]) -> TimeIndexedStorage<u32> {
        let mut storage = TimeIndexedStorage::new(window);
        for (i, &t) in times.iter().enumerate() {
            assert!(storage.push(t, i as u32));
        }
        storage
    }

    #[test]
    fn test_push_rejects_non_increasing() {
        let mut storage = TimeIndexedStorage::new(100);

        assert!(storage.push(5, 'a'));
        assert!(!storage.push(5, 'b'));
        assert!(!storage.push(3, 'c'));
        assert!(storage.push(6, 'd'));

        assert_eq!(storage.len(), 2);
        assert_eq!(storage.rejected_count(), 2);
        assert_eq!(storage.find(5), Some(&'a'));
    }

    #[test]
    fn test_window_eviction() {
        let mut storage = TimeIndexedStorage::new(10);
        for t in (0..=10).step_by(2) {
            storage.push(t, ());
        }
        assert_eq!(storage.len(), 6);

        storage.push(12, ());
        assert_eq!(storage.len(), 6);
        assert_eq!(storage.front().map(|(t, _)| t), Some(2));

        // A jump evicts several entries at once
        storage.push(21, ());
        assert_eq!(storage.front().map(|(t, _)| t), Some(12));
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.evicted_count(), 6);
    }

    #[test]
    fn test_eviction_never_empties() {
        let mut storage = TimeIndexedStorage::new(0);
        storage.push(0, 1);
        storage.push(1_000, 2);
        storage.push(5_000, 3);

        assert_eq!(storage.len(), 1);
        assert_eq!(storage.back(), Some((5_000, &3)));

        let mut negative = TimeIndexedStorage::new(-50);
        negative.push(0, 1);
        assert_eq!(negative.len(), 1);
    }

    #[test]
    fn test_predecessor_successor() {
        let storage = filled(100, &[10, 20, 30]);

        assert_eq!(storage.find_predecessor(5), None);
        assert_eq!(storage.find_predecessor(10).map(|(t, _)| t), Some(10));
        assert_eq!(storage.find_predecessor(25).map(|(t, _)| t), Some(20));
        assert_eq!(storage.find_predecessor(99).map(|(t, _)| t), Some(30));

        assert_eq!(storage.find_successor(5).map(|(t, _)| t), Some(10));
        assert_eq!(storage.find_successor(10).map(|(t, _)| t), Some(20));
        assert_eq!(storage.find_successor(30), None);

        assert_eq!(storage.find_before(20).map(|(t, _)| t), Some(10));
        assert_eq!(storage.find_before(10), None);
    }

    #[test]
    fn test_front_back_and_extremes() {
        let empty: TimeIndexedStorage<u8> = TimeIndexedStorage::new(10);
        assert!(empty.is_empty());
        assert!(empty.front().is_none());
        assert!(empty.back().is_none());

        let storage = filled(Timestamp::MAX, &[Timestamp::MIN + 1, -3, 0]);
        assert_eq!(storage.front(), Some((Timestamp::MIN + 1, &0)));
        assert_eq!(storage.back(), Some((0, &2)));
        assert_eq!(
            storage.find_successor(Timestamp::MIN).map(|(t, _)| t),
            Some(Timestamp::MIN + 1)
        );
        let times: Vec<_> = storage.iter().map(|(t, _)| t).collect();
        assert_eq!(times, vec![Timestamp::MIN + 1, -3, 0]);
    }
}
