//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Timestamps are signed 64-bit integers in caller-defined units
//! - Within one stream timestamps are strictly increasing
//! - `NO_CANDIDATE` (`i64::MAX`) is reserved as the "no further candidate" sentinel

mod blueprint;
mod error;
mod sync;
mod sync_engine_config;
mod time;

pub use blueprint::*;
pub use error::*;
pub use sync::*;
pub use sync_engine_config::*;
pub use time::*;
