use contracts::Timestamp;

use super::RetrievalStrategy;
use crate::storage::Storage;

/// Always yields the latest entry, whatever time is requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Newest;

impl<M: Clone> RetrievalStrategy<M> for Newest {
    fn name(&self) -> &'static str {
        "newest"
    }

    #[inline]
    fn retrieve<S>(&self, storage: &S, _time: Timestamp) -> Option<M>
    where
        S: Storage<Msg = M>,
    {
        storage.back().map(|(_, msg)| msg.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TimeIndexedStorage;

    #[test]
    fn test_ignores_requested_time() {
        let mut storage = TimeIndexedStorage::new(0);
        assert_eq!(Newest.retrieve(&storage, 0), None::<u8>);
        storage.push(10, 1u8);
        storage.push(20, 2);
        assert_eq!(Newest.retrieve(&storage, 0), Some(2));
        assert_eq!(Newest.retrieve(&storage, 1_000), Some(2));
        // history window 0 keeps only the newest entry
        assert_eq!(storage.len(), 1);
    }
}
