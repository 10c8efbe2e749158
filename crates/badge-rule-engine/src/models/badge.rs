//! 徽章定义与已授予徽章

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 徽章代码
///
/// 固定的封闭集合，每个代码对应一条规则。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeCode {
    FirstObservation,
    FiveSpeciesObserved,
    FirstMammalLogged,
    FirstReptileLogged,
    EndangeredSpeciesLogged,
    DeepDiverLog,
    ArcticExplorer,
    CoralConnoisseur,
}

impl BadgeCode {
    /// 全部徽章代码，顺序即规则评估顺序
    pub const ALL: [BadgeCode; 8] = [
        Self::FirstObservation,
        Self::FiveSpeciesObserved,
        Self::FirstMammalLogged,
        Self::FirstReptileLogged,
        Self::EndangeredSpeciesLogged,
        Self::DeepDiverLog,
        Self::ArcticExplorer,
        Self::CoralConnoisseur,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstObservation => "FIRST_OBSERVATION",
            Self::FiveSpeciesObserved => "FIVE_SPECIES_OBSERVED",
            Self::FirstMammalLogged => "FIRST_MAMMAL_LOGGED",
            Self::FirstReptileLogged => "FIRST_REPTILE_LOGGED",
            Self::EndangeredSpeciesLogged => "ENDANGERED_SPECIES_LOGGED",
            Self::DeepDiverLog => "DEEP_DIVER_LOG",
            Self::ArcticExplorer => "ARCTIC_EXPLORER",
            Self::CoralConnoisseur => "CORAL_CONNOISSEUR",
        }
    }

    /// 规则是否依赖物种属性（无法解析的物种引用不参与这些规则）
    pub fn requires_species_attributes(&self) -> bool {
        !matches!(self, Self::FirstObservation | Self::FiveSpeciesObserved)
    }
}

impl fmt::Display for BadgeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 徽章定义（静态参考数据）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    pub code: BadgeCode,
    pub name: String,
    pub description: String,
    /// Emoji 或图标路径
    pub icon: String,
}

impl BadgeDefinition {
    pub fn new(
        code: BadgeCode,
        name: impl Into<String>,
        description: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            code,
            name: name.into(),
            description: description.into(),
            icon: icon.into(),
        }
    }
}

/// 已授予的徽章
///
/// 每个代码最多一条，授予时间只在首次授予时设置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardedBadge {
    #[serde(flatten)]
    pub definition: BadgeDefinition,
    /// 首次授予时间
    pub achieved_date: DateTime<Utc>,
    /// 触发授予的观测记录描述
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AwardedBadge {
    pub fn new(
        definition: BadgeDefinition,
        achieved_date: DateTime<Utc>,
        details: Option<String>,
    ) -> Self {
        Self {
            definition,
            achieved_date,
            details,
        }
    }

    pub fn code(&self) -> BadgeCode {
        self.definition.code
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }
}
