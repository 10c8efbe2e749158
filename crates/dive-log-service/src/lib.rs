//! 海洋物种观测日志服务
//!
//! 记录潜水观测，并在每次日志变更后根据规则引擎授予成就徽章。
//!
//! ## 核心功能
//!
//! - **观测日志**：新增、修改、删除观测记录，按时间倒序维护并持久化快照
//! - **徽章账本**：监听日志变更，吸收新满足条件的徽章，徽章一经授予不再撤销
//! - **应用装配**：按配置选择存储后端，加载内置物种目录，启动时补评估
//!
//! ## 模块结构
//!
//! - `log_store`: 观测日志与变更监听
//! - `ledger`: 已授予徽章账本
//! - `app`: 应用装配
//! - `error`: 错误类型定义

pub mod app;
pub mod error;
pub mod ledger;
pub mod log_store;

pub use app::Aquadex;
pub use error::{DiveLogError, Result};
pub use ledger::{BadgeLedger, LEDGER_SNAPSHOT_KEY};
pub use log_store::{LOG_SNAPSHOT_KEY, LogListener, ObservationLog};
