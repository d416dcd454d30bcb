use contracts::Timestamp;

use super::RetrievalStrategy;
use crate::interpolation::Interpolate;
use crate::storage::Storage;

/// Blends the two entries around the requested time.
///
/// Past the newest entry it extrapolates from the two newest samples, at most
/// `predict_window` beyond the newest one. An entry stamped exactly at the
/// requested time is returned as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearInterpolate {
    pub predict_window: Timestamp,
}

impl<M: Interpolate + Clone> RetrievalStrategy<M> for LinearInterpolate {
    fn name(&self) -> &'static str {
        "linear_interpolate"
    }

    fn retrieve<S>(&self, storage: &S, time: Timestamp) -> Option<M>
    where
        S: Storage<Msg = M>,
    {
        let pre = storage.find_predecessor(time)?;
        if pre.0 == time {
            return Some(pre.1.clone());
        }

        let (low, high) = match storage.find_successor(time) {
            Some(suc) => (pre, suc),
            None => {
                if storage.len() < 2 || span(pre.0, time) > i128::from(self.predict_window) {
                    return None;
                }
                (storage.find_before(pre.0)?, pre)
            }
        };

        let ratio = span(low.0, time) as f64 / span(low.0, high.0) as f64;
        Some(M::interpolate(low.1, high.1, ratio))
    }
}

/// `to - from`, widened so any pair of timestamps fits.
#[inline]
fn span(from: Timestamp, to: Timestamp) -> i128 {
    i128::from(to) - i128::from(from)
}
