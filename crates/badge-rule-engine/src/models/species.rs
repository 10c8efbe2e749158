//! 物种参考数据模型
//!
//! 枚举值按数据集中的可读标签序列化（如 "Arctic Ocean"、"Coral Reef"）。

use serde::{Deserialize, Serialize};

/// 物种大类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeciesCategory {
    Mammal,
    Reptile,
    Fish,
    Amphibian,
    Invertebrate,
    Other,
}

/// IUCN 保护等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConservationStatus {
    #[serde(rename = "Critically Endangered")]
    CriticallyEndangered,
    Endangered,
    Vulnerable,
    #[serde(rename = "Near Threatened")]
    NearThreatened,
    #[serde(rename = "Least Concern")]
    LeastConcern,
    #[serde(rename = "Data Deficient")]
    DataDeficient,
    #[serde(rename = "Not Evaluated")]
    NotEvaluated,
}

impl ConservationStatus {
    /// 濒危或极危
    pub fn is_endangered(&self) -> bool {
        matches!(self, Self::Endangered | Self::CriticallyEndangered)
    }
}

/// 海域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "Arctic Ocean")]
    Arctic,
    #[serde(rename = "Antarctic Ocean")]
    Antarctic,
    #[serde(rename = "North Atlantic Ocean")]
    AtlanticNorth,
    #[serde(rename = "South Atlantic Ocean")]
    AtlanticSouth,
    #[serde(rename = "North Pacific Ocean")]
    PacificNorth,
    #[serde(rename = "South Pacific Ocean")]
    PacificSouth,
    #[serde(rename = "Indian Ocean")]
    IndianOcean,
    #[serde(rename = "Mediterranean Sea")]
    Mediterranean,
    #[serde(rename = "Caribbean Sea")]
    Caribbean,
    #[serde(rename = "Coral Triangle")]
    CoralTriangle,
    #[serde(rename = "Red Sea")]
    RedSea,
    #[serde(rename = "Global Distribution")]
    Global,
    Freshwater,
}

/// 栖息地类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HabitatType {
    #[serde(rename = "Coral Reef")]
    CoralReef,
    #[serde(rename = "Deep Sea")]
    DeepSea,
    #[serde(rename = "Open Ocean (Pelagic)")]
    OpenOcean,
    #[serde(rename = "Kelp Forest")]
    KelpForest,
    #[serde(rename = "Mangrove Forest")]
    Mangrove,
    #[serde(rename = "Seagrass Bed")]
    SeagrassBed,
    #[serde(rename = "Rocky Shore")]
    RockyShore,
    #[serde(rename = "Sandy Bottom")]
    SandyBottom,
    Estuary,
    #[serde(rename = "Hydrothermal Vent")]
    HydrothermalVent,
    #[serde(rename = "Polar Ice Ecosystem")]
    PolarIce,
    #[serde(rename = "Freshwater Lake")]
    FreshwaterLake,
    #[serde(rename = "Freshwater River")]
    FreshwaterRiver,
}

/// 稀有程度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RarityLevel {
    Common,
    Uncommon,
    Rare,
    #[serde(rename = "Very Rare")]
    VeryRare,
    #[default]
    #[serde(rename = "Data Deficient")]
    DataDeficient,
}

/// 对人类的危险程度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DangerLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
    Extreme,
    #[serde(rename = "Venomous (Non-Aggressive)")]
    VenomousNonAggressive,
    #[serde(rename = "Aggressive if Provoked")]
    AggressiveIfProvoked,
}

/// 食性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Diet {
    Carnivore,
    Herbivore,
    Omnivore,
    Planktivore,
    Detritivore,
    #[serde(rename = "Filter Feeder")]
    FilterFeeder,
    Parasite,
}

/// 物种记录
///
/// 进程启动时加载一次，之后只读。深度单位为米。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Species {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub scientific_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub family: String,
    pub category: SpeciesCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conservation_status: Option<ConservationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_depth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<f64>,
    #[serde(default, rename = "habitatType")]
    pub habitat_types: Vec<HabitatType>,
    #[serde(default, rename = "region")]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub diet: Vec<Diet>,
    #[serde(default)]
    pub rarity_level: RarityLevel,
    #[serde(default)]
    pub danger_level: DangerLevel,
}

impl Species {
    /// 只包含规则相关属性的最小记录，其余字段取默认值
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: SpeciesCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            scientific_name: String::new(),
            description: String::new(),
            family: String::new(),
            category,
            conservation_status: None,
            min_depth: None,
            max_depth: None,
            min_length: None,
            max_length: None,
            habitat_types: Vec::new(),
            regions: Vec::new(),
            diet: Vec::new(),
            rarity_level: RarityLevel::default(),
            danger_level: DangerLevel::default(),
        }
    }

    pub fn with_conservation_status(mut self, status: ConservationStatus) -> Self {
        self.conservation_status = Some(status);
        self
    }

    pub fn with_depth(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_depth = min;
        self.max_depth = max;
        self
    }

    pub fn with_habitats(mut self, habitats: impl IntoIterator<Item = HabitatType>) -> Self {
        self.habitat_types = habitats.into_iter().collect();
        self
    }

    pub fn with_regions(mut self, regions: impl IntoIterator<Item = Region>) -> Self {
        self.regions = regions.into_iter().collect();
        self
    }

    pub fn is_endangered(&self) -> bool {
        self.conservation_status
            .is_some_and(|status| status.is_endangered())
    }

    /// 最小或最大深度任一超过阈值
    pub fn dwells_deeper_than(&self, meters: f64) -> bool {
        self.min_depth.is_some_and(|d| d > meters) || self.max_depth.is_some_and(|d| d > meters)
    }

    pub fn inhabits(&self, habitat: HabitatType) -> bool {
        self.habitat_types.contains(&habitat)
    }

    pub fn found_in(&self, region: Region) -> bool {
        self.regions.contains(&region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_deserialization_uses_dataset_labels() {
        let json = r#"
        {
            "id": "narwhal-100",
            "name": "Narwhal",
            "category": "Mammal",
            "conservationStatus": "Least Concern",
            "minDepth": 0,
            "maxDepth": 1500,
            "habitatType": ["Polar Ice Ecosystem", "Deep Sea"],
            "region": ["Arctic Ocean"],
            "diet": ["Carnivore"],
            "rarityLevel": "Very Rare"
        }
        "#;

        let species: Species = serde_json::from_str(json).unwrap();
        assert_eq!(species.category, SpeciesCategory::Mammal);
        assert_eq!(
            species.conservation_status,
            Some(ConservationStatus::LeastConcern)
        );
        assert!(species.found_in(Region::Arctic));
        assert!(species.inhabits(HabitatType::PolarIce));
        assert_eq!(species.rarity_level, RarityLevel::VeryRare);
        assert_eq!(species.danger_level, DangerLevel::None);
        assert!(species.dwells_deeper_than(100.0));
    }

    #[test]
    fn test_endangered_statuses() {
        let base = Species::new("x", "X", SpeciesCategory::Fish);
        assert!(!base.is_endangered());
        assert!(
            base.clone()
                .with_conservation_status(ConservationStatus::Endangered)
                .is_endangered()
        );
        assert!(
            base.clone()
                .with_conservation_status(ConservationStatus::CriticallyEndangered)
                .is_endangered()
        );
        assert!(
            !base
                .with_conservation_status(ConservationStatus::Vulnerable)
                .is_endangered()
        );
    }

    #[test]
    fn test_depth_threshold_is_strict() {
        let species = Species::new("x", "X", SpeciesCategory::Fish);
        assert!(!species.clone().with_depth(Some(0.0), Some(100.0)).dwells_deeper_than(100.0));
        assert!(species.clone().with_depth(None, Some(100.5)).dwells_deeper_than(100.0));
        assert!(species.clone().with_depth(Some(200.0), None).dwells_deeper_than(100.0));
        assert!(!species.dwells_deeper_than(100.0));
    }
}
