//! 徽章规则引擎
//!
//! 对观测日志做一次遍历，汇总所有规则需要的中间状态，再逐条判断规则是否成立。
//! 已授予的徽章不会再次评估。评估是纯计算，不产生副作用。
//!
//! "第一条满足条件的记录"指日志当前迭代顺序（按时间戳倒序）中的第一条，
//! 即最近创建或修改的那条记录。

use std::collections::HashSet;
use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::catalog::SpeciesLookup;
use crate::models::{
    BadgeCode, HabitatType, ObservationEntry, Region, Species, SpeciesCategory,
};

/// 物种观测达人阈值（不同物种数）
pub const DISTINCT_SPECIES_THRESHOLD: usize = 5;
/// 珊瑚礁鉴赏家阈值（不同珊瑚礁物种数）
pub const CORAL_SPECIES_THRESHOLD: usize = 3;
/// 深潜阈值（米）
pub const DEEP_DIVE_THRESHOLD_METERS: f64 = 100.0;

/// 新满足条件的徽章
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualifiedBadge {
    pub code: BadgeCode,
    pub evidence: String,
}

/// 评估结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationOutcome {
    /// 按规则顺序排列的新徽章
    pub awards: Vec<QualifiedBadge>,
    /// 物种引用无法解析的记录数
    pub unresolved_entries: usize,
    pub evaluation_time_us: u64,
}

impl EvaluationOutcome {
    pub fn is_empty(&self) -> bool {
        self.awards.is_empty()
    }

    pub fn codes(&self) -> Vec<BadgeCode> {
        self.awards.iter().map(|a| a.code).collect()
    }

    pub fn evidence_for(&self, code: BadgeCode) -> Option<&str> {
        self.awards
            .iter()
            .find(|a| a.code == code)
            .map(|a| a.evidence.as_str())
    }
}

/// 单次遍历收集的规则中间状态
#[derive(Debug, Default)]
struct ObservationTally<'a> {
    earliest: Option<&'a ObservationEntry>,
    distinct_species: HashSet<&'a str>,
    first_mammal: Option<&'a ObservationEntry>,
    first_reptile: Option<&'a ObservationEntry>,
    first_endangered: Option<&'a ObservationEntry>,
    first_deep_dweller: Option<&'a ObservationEntry>,
    first_arctic: Option<&'a ObservationEntry>,
    coral_species: HashSet<&'a str>,
    unresolved: usize,
}

impl<'a> ObservationTally<'a> {
    fn collect<L>(entries: &'a [ObservationEntry], species: &L) -> Self
    where
        L: SpeciesLookup + ?Sized,
    {
        let mut tally = Self::default();

        for entry in entries {
            tally.record_log_content(entry);

            match species.lookup(&entry.species_id) {
                Some(resolved) => tally.record_species(entry, resolved),
                None => tally.unresolved += 1,
            }
        }

        tally
    }

    /// 只依赖日志内容的规则
    fn record_log_content(&mut self, entry: &'a ObservationEntry) {
        // 时间戳相同的情况下取迭代顺序靠后的一条（倒序日志中更早写入的记录）
        if self
            .earliest
            .is_none_or(|current| entry.timestamp <= current.timestamp)
        {
            self.earliest = Some(entry);
        }
        self.distinct_species.insert(entry.species_id.as_str());
    }

    /// 依赖物种属性的规则
    fn record_species(&mut self, entry: &'a ObservationEntry, species: &Species) {
        if species.category == SpeciesCategory::Mammal {
            self.first_mammal.get_or_insert(entry);
        }
        if species.category == SpeciesCategory::Reptile {
            self.first_reptile.get_or_insert(entry);
        }
        if species.is_endangered() {
            self.first_endangered.get_or_insert(entry);
        }
        if species.dwells_deeper_than(DEEP_DIVE_THRESHOLD_METERS) {
            self.first_deep_dweller.get_or_insert(entry);
        }
        if species.found_in(Region::Arctic) {
            self.first_arctic.get_or_insert(entry);
        }
        if species.inhabits(HabitatType::CoralReef) {
            self.coral_species.insert(entry.species_id.as_str());
        }
    }

    /// 规则成立时返回证据文本
    fn evidence_for(&self, code: BadgeCode) -> Option<String> {
        match code {
            BadgeCode::FirstObservation => self
                .earliest
                .map(|e| format!("First log: {} on {}", e.species_name, e.date)),
            BadgeCode::FiveSpeciesObserved => (self.distinct_species.len()
                >= DISTINCT_SPECIES_THRESHOLD)
                .then(|| format!("Observed {} unique species.", self.distinct_species.len())),
            BadgeCode::FirstMammalLogged => self
                .first_mammal
                .map(|e| format!("Logged {}.", e.species_name)),
            BadgeCode::FirstReptileLogged => self
                .first_reptile
                .map(|e| format!("Logged {}.", e.species_name)),
            BadgeCode::EndangeredSpeciesLogged => self
                .first_endangered
                .map(|e| format!("Logged {} (Endangered).", e.species_name)),
            BadgeCode::DeepDiverLog => self
                .first_deep_dweller
                .map(|e| format!("Logged {} (Deep Dweller).", e.species_name)),
            BadgeCode::ArcticExplorer => self
                .first_arctic
                .map(|e| format!("Logged {} (Arctic Region).", e.species_name)),
            BadgeCode::CoralConnoisseur => (self.coral_species.len()
                >= CORAL_SPECIES_THRESHOLD)
                .then(|| format!("Logged {} coral reef species.", self.coral_species.len())),
        }
    }
}

/// 徽章规则引擎
#[derive(Debug, Clone, Default)]
pub struct BadgeRuleEngine;

impl BadgeRuleEngine {
    pub fn new() -> Self {
        Self
    }

    /// 评估全部规则
    ///
    /// # Arguments
    /// * `entries` - 当前完整的观测日志（按日志迭代顺序）
    /// * `species` - 物种查询
    /// * `awarded` - 已授予的徽章代码，这些规则会被跳过
    pub fn evaluate<L>(
        &self,
        entries: &[ObservationEntry],
        species: &L,
        awarded: &HashSet<BadgeCode>,
    ) -> EvaluationOutcome
    where
        L: SpeciesLookup + ?Sized,
    {
        if entries.is_empty() || BadgeCode::ALL.iter().all(|c| awarded.contains(c)) {
            return EvaluationOutcome::default();
        }

        let start = Instant::now();
        let tally = ObservationTally::collect(entries, species);

        let awards: Vec<QualifiedBadge> = BadgeCode::ALL
            .into_iter()
            .filter(|code| !awarded.contains(code))
            .filter_map(|code| {
                tally
                    .evidence_for(code)
                    .map(|evidence| QualifiedBadge { code, evidence })
            })
            .collect();

        let outcome = EvaluationOutcome {
            awards,
            unresolved_entries: tally.unresolved,
            evaluation_time_us: start.elapsed().as_micros() as u64,
        };

        debug!(
            entries = entries.len(),
            distinct_species = tally.distinct_species.len(),
            unresolved = outcome.unresolved_entries,
            qualified = ?outcome.codes(),
            "徽章规则评估完成"
        );

        outcome
    }

    /// 单独评估一条规则，不考虑是否已授予
    pub fn evaluate_rule<L>(
        &self,
        code: BadgeCode,
        entries: &[ObservationEntry],
        species: &L,
    ) -> Option<String>
    where
        L: SpeciesLookup + ?Sized,
    {
        if entries.is_empty() {
            return None;
        }
        ObservationTally::collect(entries, species).evidence_for(code)
    }
}
