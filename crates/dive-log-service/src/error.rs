//! 观测日志服务错误类型

use aquadex_shared::AquadexError;
use rule_engine::RuleError;
use thiserror::Error;

/// 观测日志服务错误类型
#[derive(Debug, Error)]
pub enum DiveLogError {
    #[error("观测记录不存在: {0}")]
    EntryNotFound(String),

    #[error("物种目录错误: {0}")]
    Catalog(#[from] RuleError),

    #[error(transparent)]
    Shared(#[from] AquadexError),
}

pub type Result<T> = std::result::Result<T, DiveLogError>;

impl DiveLogError {
    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        matches!(self, Self::EntryNotFound(_))
    }

    /// 获取错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::Catalog(_) => "CATALOG_ERROR",
            Self::Shared(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            DiveLogError::EntryNotFound("obs-1".to_string()).error_code(),
            "ENTRY_NOT_FOUND"
        );
        assert_eq!(
            DiveLogError::Catalog(RuleError::EmptySpeciesId).error_code(),
            "CATALOG_ERROR"
        );
    }

    #[test]
    fn test_error_is_business_error() {
        assert!(DiveLogError::EntryNotFound("obs-1".to_string()).is_business_error());
        assert!(!DiveLogError::Shared(AquadexError::Internal("boom".to_string())).is_business_error());
    }

    #[test]
    fn test_error_display() {
        let err = DiveLogError::EntryNotFound("obs-42".to_string());
        assert!(err.to_string().contains("obs-42"));
    }
}
