//! # Sync Engine
//!
//! 多路时间序列同步引擎。
//!
//! 负责：
//! - 每路数据的有序缓存与窗口淘汰（`storage`）
//! - 四种取值策略：精确时间、最近邻、线性插值、最新值（`policy`）
//! - 同构多路扇出（`policy_array`）
//! - pivot 驱动的 join 循环：MinInterval / MasterSlave（`synchronizer`）
//! - 由 `SyncBlueprint` 在运行时装配（`builder`）
//!
//! ## 使用示例
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use sync_engine::{ExactTimePolicy, LinearInterpolatePolicy, PushStatus, Synchronizer};
//!
//! let mut sync = Synchronizer::min_interval(
//!     10,
//!     (ExactTimePolicy::new(100), LinearInterpolatePolicy::new(100, 0)),
//! );
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! sync.register_callback(move |time, (frame, speed)| {
//!     sink.lock().unwrap().push((time, frame, speed));
//! });
//!
//! sync.push::<1>(0, 0.0_f64);
//! sync.push::<1>(10, 2.0);
//! assert_eq!(sync.push::<0>(5, "frame-5"), PushStatus::Emitted);
//! assert_eq!(seen.lock().unwrap()[0], (5, Some("frame-5"), Some(1.0)));
//! ```

mod builder;
mod interpolation;
mod participants;
mod pivot;
mod policy;
mod policy_array;
mod storage;
mod synchronizer;

pub use builder::{ConfiguredSynchronizer, StreamOutputs};
pub use interpolation::{Interpolate, Scalable};
pub use participants::{JoinParticipant, ParticipantSet, StreamAt};
pub use pivot::PivotAdvance;
pub use policy::{
    DynPolicy, ExactTime, ExactTimePolicy, LinearInterpolate, LinearInterpolatePolicy, Nearest,
    NearestPolicy, Newest, NewestPolicy, Policy, Retrieval, RetrievalStrategy,
};
pub use policy_array::PolicyArray;
pub use storage::{Storage, TimeIndexedStorage};
pub use synchronizer::{EmitCallback, HomogeneousSynchronizer, Synchronizer};

// Re-export contracts types
pub use contracts::{
    Attribute, PeekOutcome, PivotStrategy, PushStatus, Timestamp, BEFORE_ALL_TIME, NO_CANDIDATE,
};
