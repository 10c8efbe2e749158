//! 徽章规则引擎
//!
//! 提供海洋物种观测日志的徽章评估能力：
//! - 物种目录与徽章目录（只读参考数据）
//! - 观测记录与徽章模型
//! - 单次遍历的组合规则评估

pub mod catalog;
pub mod engine;
pub mod error;
pub mod models;

pub use catalog::{BadgeCatalog, SpeciesCatalog, SpeciesLookup};
pub use engine::{
    BadgeRuleEngine, CORAL_SPECIES_THRESHOLD, DEEP_DIVE_THRESHOLD_METERS,
    DISTINCT_SPECIES_THRESHOLD, EvaluationOutcome, QualifiedBadge,
};
pub use error::{Result, RuleError};
pub use models::*;
