use contracts::{RetrievalConfig, Timestamp};

use super::{ExactTime, LinearInterpolate, Nearest, Newest, RetrievalStrategy};
use crate::interpolation::Interpolate;
use crate::storage::Storage;

/// Retrieval strategy picked at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retrieval {
    ExactTime(ExactTime),
    Nearest(Nearest),
    LinearInterpolate(LinearInterpolate),
    Newest(Newest),
}

impl From<RetrievalConfig> for Retrieval {
    fn from(config: RetrievalConfig) -> Self {
        match config {
            RetrievalConfig::ExactTime => Retrieval::ExactTime(ExactTime),
            RetrievalConfig::Nearest { valid_window } => {
                Retrieval::Nearest(Nearest { valid_window })
            }
            RetrievalConfig::LinearInterpolate { predict_window } => {
                Retrieval::LinearInterpolate(LinearInterpolate { predict_window })
            }
            RetrievalConfig::Newest => Retrieval::Newest(Newest),
        }
    }
}

impl<M: Interpolate + Clone> RetrievalStrategy<M> for Retrieval {
    fn name(&self) -> &'static str {
        match self {
            Retrieval::ExactTime(s) => RetrievalStrategy::<M>::name(s),
            Retrieval::Nearest(s) => RetrievalStrategy::<M>::name(s),
            Retrieval::LinearInterpolate(s) => RetrievalStrategy::<M>::name(s),
            Retrieval::Newest(s) => RetrievalStrategy::<M>::name(s),
        }
    }

    fn retrieve<S>(&self, storage: &S, time: Timestamp) -> Option<M>
    where
        S: Storage<Msg = M>,
    {
        match self {
            Retrieval::ExactTime(s) => s.retrieve(storage, time),
            Retrieval::Nearest(s) => s.retrieve(storage, time),
            Retrieval::LinearInterpolate(s) => s.retrieve(storage, time),
            Retrieval::Newest(s) => s.retrieve(storage, time),
        }
    }
}
