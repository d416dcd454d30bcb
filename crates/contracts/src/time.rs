//! Time model shared by storage, policies and the synchronizer.

/// Message timestamp, in whatever unit the producer uses (ns, µs, ticks...).
pub type Timestamp = i64;

/// Reserved sentinel: no stream has a qualifying successor.
pub const NO_CANDIDATE: Timestamp = Timestamp::MAX;

/// Initial pivot value, earlier than any real timestamp.
pub const BEFORE_ALL_TIME: Timestamp = Timestamp::MIN;
