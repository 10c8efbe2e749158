//! 规则引擎错误类型
//!
//! 规则评估本身不会失败，错误只出现在构建参考目录时。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("物种目录解析失败: {0}")]
    CatalogParse(#[from] serde_json::Error),

    #[error("物种 ID 重复: {0}")]
    DuplicateSpecies(String),

    #[error("物种 ID 不能为空")]
    EmptySpeciesId,
}

pub type Result<T> = std::result::Result<T, RuleError>;
