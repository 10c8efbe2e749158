//! 参考目录
//!
//! 物种目录和徽章目录都是只读参考数据：物种目录在启动时从内置数据集加载，
//! 徽章目录是固定的八个徽章定义。

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::error::{Result, RuleError};
use crate::models::{BadgeCode, BadgeDefinition, Species, UNKNOWN_SPECIES_NAME};

/// 内置物种数据集
const BUNDLED_SPECIES_JSON: &str = include_str!("../data/species.json");

/// 按 ID 查询物种
///
/// 规则引擎只依赖这个 trait，查询不到的物种不参与依赖物种属性的规则。
pub trait SpeciesLookup {
    fn lookup(&self, species_id: &str) -> Option<&Species>;
}

impl SpeciesLookup for HashMap<String, Species> {
    fn lookup(&self, species_id: &str) -> Option<&Species> {
        self.get(species_id)
    }
}

/// 物种目录
///
/// 保持数据集中的原始顺序，同时维护 ID 索引。
#[derive(Debug, Clone, Default)]
pub struct SpeciesCatalog {
    species: Vec<Species>,
    index: HashMap<String, usize>,
}

impl SpeciesCatalog {
    /// 从物种列表构建目录，ID 为空或重复时报错
    pub fn from_species(species: Vec<Species>) -> Result<Self> {
        let mut index = HashMap::with_capacity(species.len());
        for (pos, s) in species.iter().enumerate() {
            if s.id.is_empty() {
                return Err(RuleError::EmptySpeciesId);
            }
            if index.insert(s.id.clone(), pos).is_some() {
                return Err(RuleError::DuplicateSpecies(s.id.clone()));
            }
        }
        Ok(Self { species, index })
    }

    /// 从 JSON 数组构建目录
    pub fn from_json(json: &str) -> Result<Self> {
        let species: Vec<Species> = serde_json::from_str(json)?;
        Self::from_species(species)
    }

    /// 加载内置数据集
    #[instrument]
    pub fn bundled() -> Result<Self> {
        let catalog = Self::from_json(BUNDLED_SPECIES_JSON)?;
        debug!(count = catalog.len(), "内置物种目录已加载");
        Ok(catalog)
    }

    /// 按数据集顺序列出全部物种
    pub fn list(&self) -> &[Species] {
        &self.species
    }

    pub fn get(&self, id: &str) -> Option<&Species> {
        self.index.get(id).map(|&pos| &self.species[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// 观测记录使用的显示名称，查不到时返回 "Unknown Species"
    pub fn display_name(&self, id: &str) -> String {
        self.get(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| UNKNOWN_SPECIES_NAME.to_string())
    }

    /// 替换同 ID 物种，不存在时追加到末尾
    pub fn upsert(&mut self, species: Species) {
        match self.index.get(&species.id) {
            Some(&pos) => self.species[pos] = species,
            None => {
                self.index.insert(species.id.clone(), self.species.len());
                self.species.push(species);
            }
        }
    }

    /// ID 到物种的映射快照
    pub fn to_map(&self) -> HashMap<String, Species> {
        self.species
            .iter()
            .map(|s| (s.id.clone(), s.clone()))
            .collect()
    }
}

impl SpeciesLookup for SpeciesCatalog {
    fn lookup(&self, species_id: &str) -> Option<&Species> {
        self.get(species_id)
    }
}

/// 徽章目录
#[derive(Debug, Clone)]
pub struct BadgeCatalog {
    badges: Vec<BadgeDefinition>,
}

impl BadgeCatalog {
    /// 标准徽章集合
    pub fn standard() -> Self {
        let badges = vec![
            BadgeDefinition::new(
                BadgeCode::FirstObservation,
                "First Sighting!",
                "You've logged your very first marine creature observation.",
                "🎉",
            ),
            BadgeDefinition::new(
                BadgeCode::FiveSpeciesObserved,
                "Species Spotter",
                "You've successfully observed and logged at least 5 different species.",
                "🧭",
            ),
            BadgeDefinition::new(
                BadgeCode::FirstMammalLogged,
                "Mammal Encounter",
                "You've logged your first marine mammal.",
                "🐳",
            ),
            BadgeDefinition::new(
                BadgeCode::FirstReptileLogged,
                "Reptile Ranger",
                "You've logged your first marine reptile. (e.g. Sea Turtle)",
                "🐢",
            ),
            BadgeDefinition::new(
                BadgeCode::EndangeredSpeciesLogged,
                "Conservationist Heart",
                "You've observed and logged a species classified as 'Endangered' or 'Critically Endangered'.",
                "❤️",
            ),
            BadgeDefinition::new(
                BadgeCode::DeepDiverLog,
                "Deep Diver Log",
                "You've logged an observation of a species found predominantly deeper than 100 meters.",
                "🌊",
            ),
            BadgeDefinition::new(
                BadgeCode::ArcticExplorer,
                "Arctic Explorer",
                "You've logged a species whose primary region includes the Arctic Ocean.",
                "❄️",
            ),
            BadgeDefinition::new(
                BadgeCode::CoralConnoisseur,
                "Coral Connoisseur",
                "You've logged at least 3 different species typically found in Coral Reef habitats.",
                "🐠",
            ),
        ];
        Self { badges }
    }

    pub fn list(&self) -> &[BadgeDefinition] {
        &self.badges
    }

    pub fn get(&self, code: BadgeCode) -> Option<&BadgeDefinition> {
        self.badges.iter().find(|b| b.code == code)
    }

    pub fn len(&self) -> usize {
        self.badges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }
}

impl Default for BadgeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConservationStatus, HabitatType, SpeciesCategory};

    #[test]
    fn test_bundled_catalog_loads_in_order() {
        let catalog = SpeciesCatalog::bundled().unwrap();
        let ids: Vec<&str> = catalog.list().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "clownfish-001",
                "manta-ray-002",
                "anglerfish-003",
                "blue-ringed-octopus-004",
                "sea-otter-005",
                "leafy-seadragon-006",
            ]
        );

        let otter = catalog.get("sea-otter-005").unwrap();
        assert_eq!(otter.name, "Sea Otter");
        assert_eq!(otter.category, SpeciesCategory::Mammal);
        assert_eq!(otter.conservation_status, Some(ConservationStatus::Endangered));

        let clownfish = catalog.get("clownfish-001").unwrap();
        assert!(clownfish.inhabits(HabitatType::CoralReef));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = SpeciesCatalog::from_species(vec![
            Species::new("a", "A", SpeciesCategory::Fish),
            Species::new("a", "A again", SpeciesCategory::Fish),
        ]);
        assert!(matches!(result, Err(RuleError::DuplicateSpecies(id)) if id == "a"));
    }

    #[test]
    fn test_empty_id_rejected() {
        let result = SpeciesCatalog::from_species(vec![Species::new("", "A", SpeciesCategory::Fish)]);
        assert!(matches!(result, Err(RuleError::EmptySpeciesId)));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            SpeciesCatalog::from_json("[{\"id\": 1}]"),
            Err(RuleError::CatalogParse(_))
        ));
    }

    #[test]
    fn test_display_name_falls_back_to_unknown() {
        let catalog = SpeciesCatalog::bundled().unwrap();
        assert_eq!(catalog.display_name("clownfish-001"), "Clownfish");
        assert_eq!(catalog.display_name("kraken-999"), UNKNOWN_SPECIES_NAME);
    }

    #[test]
    fn test_upsert_replaces_or_appends() {
        let mut catalog = SpeciesCatalog::bundled().unwrap();
        let mut otter = catalog.get("sea-otter-005").unwrap().clone();
        otter.name = "Northern Sea Otter".to_string();
        catalog.upsert(otter);
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.display_name("sea-otter-005"), "Northern Sea Otter");

        catalog.upsert(Species::new("green-sea-turtle-007", "Green Sea Turtle", SpeciesCategory::Reptile));
        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog.list().last().unwrap().id, "green-sea-turtle-007");
        assert!(catalog.lookup("green-sea-turtle-007").is_some());
    }

    #[test]
    fn test_standard_badges_cover_every_code() {
        let badges = BadgeCatalog::standard();
        assert_eq!(badges.len(), BadgeCode::ALL.len());
        for code in BadgeCode::ALL {
            assert!(badges.get(code).is_some(), "missing definition for {}", code);
        }
        assert_eq!(
            badges.get(BadgeCode::FirstObservation).unwrap().name,
            "First Sighting!"
        );
    }
}
