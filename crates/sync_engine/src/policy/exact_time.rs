use contracts::Timestamp;

use super::RetrievalStrategy;
use crate::storage::Storage;

/// Succeeds only on an entry stamped exactly at the requested time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExactTime;

impl<M: Clone> RetrievalStrategy<M> for ExactTime {
    fn name(&self) -> &'static str {
        "exact_time"
    }

    #[inline]
    fn retrieve<S>(&self, storage: &S, time: Timestamp) -> Option<M>
    where
        S: Storage<Msg = M>,
    {
        storage.find(time).cloned()
    }
}
