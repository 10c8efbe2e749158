//! 领域模型
//!
//! - `species`: 物种参考数据
//! - `observation`: 用户观测记录
//! - `badge`: 徽章定义与已授予徽章

pub mod badge;
pub mod observation;
pub mod species;

pub use badge::{AwardedBadge, BadgeCode, BadgeDefinition};
pub use observation::{NewObservation, ObservationEntry, UNKNOWN_SPECIES_NAME};
pub use species::{
    ConservationStatus, DangerLevel, Diet, HabitatType, RarityLevel, Region, Species,
    SpeciesCategory,
};
