use contracts::Timestamp;

use super::RetrievalStrategy;
use crate::storage::Storage;

/// Picks the closer of the two neighbours of the requested time.
///
/// The predecessor wins a tie. The pick only counts when its distance is
/// within `valid_window`; a negative window accepts nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nearest {
    pub valid_window: Timestamp,
}

impl<M: Clone> RetrievalStrategy<M> for Nearest {
    fn name(&self) -> &'static str {
        "nearest"
    }

    fn retrieve<S>(&self, storage: &S, time: Timestamp) -> Option<M>
    where
        S: Storage<Msg = M>,
    {
        let mut best = storage
            .find_predecessor(time)
            .map(|(t, msg)| (time.abs_diff(t), msg));

        if let Some((t, msg)) = storage.find_successor(time) {
            let dist = time.abs_diff(t);
            if best.is_none_or(|(best_dist, _)| dist < best_dist) {
                best = Some((dist, msg));
            }
        }

        let limit = u64::try_from(self.valid_window).ok()?;
        best.filter(|&(dist, _)| dist <= limit)
            .map(|(_, msg)| msg.clone())
    }
}
