//! 已授予徽章账本
//!
//! 每个徽章代码最多授予一次，授予后不会因日志变化而撤销。
//! 账本作为观测日志的监听者，在每次日志变更后重新评估并吸收新徽章。

use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::RwLock;
use tracing::{info, instrument, warn};

use aquadex_shared::Clock;
use aquadex_shared::observability::metrics::{record_badge_awarded, record_badge_evaluation};
use aquadex_shared::storage::{SnapshotStore, clear_collection, load_collection, save_collection};
use rule_engine::{
    AwardedBadge, BadgeCatalog, BadgeCode, BadgeRuleEngine, ObservationEntry, SpeciesCatalog,
};

use crate::log_store::LogListener;

/// 已授予徽章快照 key
pub const LEDGER_SNAPSHOT_KEY: &str = "aquadex_awardedBadges";

/// 徽章账本
pub struct BadgeLedger {
    awarded: RwLock<Vec<AwardedBadge>>,
    engine: BadgeRuleEngine,
    badges: BadgeCatalog,
    species: Arc<ArcSwap<SpeciesCatalog>>,
    store: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
}

impl BadgeLedger {
    /// 从快照恢复账本
    ///
    /// 快照中重复的徽章代码只保留第一条。
    pub fn open(
        store: Arc<dyn SnapshotStore>,
        species: Arc<ArcSwap<SpeciesCatalog>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let loaded: Vec<AwardedBadge> = load_collection(store.as_ref(), LEDGER_SNAPSHOT_KEY);
        let mut seen = HashSet::new();
        let mut awarded: Vec<AwardedBadge> = loaded
            .into_iter()
            .filter(|b| seen.insert(b.code()))
            .collect();
        sort_newest_first(&mut awarded);
        info!(count = awarded.len(), "徽章账本已加载");

        Self {
            awarded: RwLock::new(awarded),
            engine: BadgeRuleEngine::new(),
            badges: BadgeCatalog::standard(),
            species,
            store,
            clock,
        }
    }

    /// 已授予徽章（按授予时间倒序）
    pub fn list(&self) -> Vec<AwardedBadge> {
        self.awarded.read().clone()
    }

    pub fn has(&self, code: BadgeCode) -> bool {
        self.awarded.read().iter().any(|b| b.code() == code)
    }

    pub fn get(&self, code: BadgeCode) -> Option<AwardedBadge> {
        self.awarded.read().iter().find(|b| b.code() == code).cloned()
    }

    pub fn len(&self) -> usize {
        self.awarded.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.awarded.read().is_empty()
    }

    pub fn badge_catalog(&self) -> &BadgeCatalog {
        &self.badges
    }

    /// 基于当前日志重新评估并吸收新徽章
    ///
    /// 幂等：同一份日志重复调用不会产生新徽章。返回本次新授予的徽章。
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub fn absorb(&self, entries: &[ObservationEntry]) -> Vec<AwardedBadge> {
        let species = self.species.load();

        let (newly_awarded, snapshot) = {
            let mut awarded = self.awarded.write();
            let held: HashSet<BadgeCode> = awarded.iter().map(|b| b.code()).collect();

            let outcome = self.engine.evaluate(entries, &**species, &held);
            record_badge_evaluation(
                outcome.awards.len(),
                outcome.evaluation_time_us as f64 / 1_000_000.0,
            );
            if outcome.unresolved_entries > 0 {
                warn!(
                    unresolved = outcome.unresolved_entries,
                    "部分观测记录的物种无法解析，不参与依赖物种属性的规则"
                );
            }
            if outcome.is_empty() {
                return Vec::new();
            }

            let achieved_date = self.clock.now();
            let newly_awarded: Vec<AwardedBadge> = outcome
                .awards
                .into_iter()
                .filter_map(|qualified| match self.badges.get(qualified.code) {
                    Some(definition) => Some(AwardedBadge::new(
                        definition.clone(),
                        achieved_date,
                        Some(qualified.evidence),
                    )),
                    None => {
                        warn!(code = %qualified.code, "徽章定义缺失，跳过授予");
                        None
                    }
                })
                .collect();

            awarded.extend(newly_awarded.iter().cloned());
            sort_newest_first(&mut awarded);
            (newly_awarded, awarded.clone())
        };

        save_collection(self.store.as_ref(), LEDGER_SNAPSHOT_KEY, &snapshot);
        for badge in &newly_awarded {
            record_badge_awarded(badge.code().as_str());
            info!(
                code = %badge.code(),
                details = badge.details.as_deref().unwrap_or_default(),
                "Badge awarded: {}",
                badge.name()
            );
        }

        newly_awarded
    }

    /// 清空账本并删除快照
    #[instrument(skip(self))]
    pub fn reset(&self) {
        let removed = {
            let mut awarded = self.awarded.write();
            let removed = awarded.len();
            awarded.clear();
            removed
        };
        clear_collection(self.store.as_ref(), LEDGER_SNAPSHOT_KEY);
        info!(removed, "徽章账本已重置");
    }
}

impl LogListener for BadgeLedger {
    fn on_log_changed(&self, entries: &[ObservationEntry]) {
        self.absorb(entries);
    }
}

/// 按授予时间倒序排列
fn sort_newest_first(badges: &mut [AwardedBadge]) {
    badges.sort_by(|a, b| b.achieved_date.cmp(&a.achieved_date));
}
