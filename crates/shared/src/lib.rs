//! 共享库
//!
//! 包含所有组件共用的配置、错误处理、时钟、快照存储和可观测性基础设施代码。

pub mod clock;
pub mod config;
pub mod error;
pub mod observability;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AquadexError, Result};
pub use storage::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
