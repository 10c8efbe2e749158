//! 观测记录模型

use serde::{Deserialize, Serialize};

/// 物种引用无法解析时使用的显示名称
pub const UNKNOWN_SPECIES_NAME: &str = "Unknown Species";

/// 观测记录
///
/// `species_name` 是写入时从物种目录复制的冗余名称，
/// 目录中名称之后的变化不会回写到已有记录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationEntry {
    pub id: String,
    /// 物种 ID（可能引用目录中不存在的物种）
    pub species_id: String,
    pub species_name: String,
    /// 用户填写的日期，不做格式校验
    pub date: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// 创建或最后修改时间（毫秒），用于倒序排序
    pub timestamp: i64,
}

impl ObservationEntry {
    /// 由新建请求生成记录
    pub fn from_new(
        id: impl Into<String>,
        data: NewObservation,
        species_name: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            id: id.into(),
            species_id: data.species_id,
            species_name: species_name.into(),
            date: data.date,
            location: data.location,
            notes: data.notes,
            latitude: data.latitude,
            longitude: data.longitude,
            timestamp,
        }
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// 新建观测记录请求
///
/// ID、时间戳和物种名称由日志在写入时生成。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewObservation {
    pub species_id: String,
    pub date: String,
    pub location: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl NewObservation {
    pub fn new(
        species_id: impl Into<String>,
        date: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            species_id: species_id.into(),
            date: date.into(),
            location: location.into(),
            notes: None,
            latitude: None,
            longitude: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }
}
