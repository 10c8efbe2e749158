//! 应用装配
//!
//! 按固定顺序组装各组件：
//! 1. 快照存储（按配置选择后端）
//! 2. 内置物种目录
//! 3. 观测日志与徽章账本（从快照恢复）
//! 4. 注册账本为日志监听者，并执行一次启动评估

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use aquadex_shared::config::AppConfig;
use aquadex_shared::storage::{SnapshotStore, open_store};
use aquadex_shared::{Clock, SystemClock};
use rule_engine::{AwardedBadge, BadgeCatalog, SpeciesCatalog};

use crate::error::Result;
use crate::ledger::BadgeLedger;
use crate::log_store::ObservationLog;

/// Aquadex 应用
pub struct Aquadex {
    log: Arc<ObservationLog>,
    ledger: Arc<BadgeLedger>,
    species: Arc<ArcSwap<SpeciesCatalog>>,
    badges: BadgeCatalog,
}

impl Aquadex {
    /// 按配置打开应用
    pub fn open(config: &AppConfig) -> Result<Self> {
        let store = open_store(&config.storage)?;
        info!(backend = ?config.storage.backend, data_dir = %config.storage.data_dir.display(), "快照存储已就绪");
        Self::with_store(store, Arc::new(SystemClock))
    }

    /// 使用指定存储和时钟打开应用，物种目录取内置数据集
    pub fn with_store(store: Arc<dyn SnapshotStore>, clock: Arc<dyn Clock>) -> Result<Self> {
        let species = SpeciesCatalog::bundled()?;
        Ok(Self::assemble(store, species, clock))
    }

    /// 组装全部组件
    pub fn assemble(
        store: Arc<dyn SnapshotStore>,
        species: SpeciesCatalog,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let species = Arc::new(ArcSwap::from_pointee(species));

        let log = Arc::new(ObservationLog::open(
            store.clone(),
            species.clone(),
            clock.clone(),
        ));
        let ledger = Arc::new(BadgeLedger::open(store, species.clone(), clock));
        log.subscribe(ledger.clone());

        // 启动时补评估一次，覆盖上次运行中未完成的吸收
        let awarded = ledger.absorb(&log.list());
        info!(
            entries = log.len(),
            badges = ledger.len(),
            newly_awarded = awarded.len(),
            "Aquadex 已启动"
        );

        Self {
            log,
            ledger,
            species,
            badges: BadgeCatalog::standard(),
        }
    }

    pub fn log(&self) -> &ObservationLog {
        &self.log
    }

    pub fn ledger(&self) -> &BadgeLedger {
        &self.ledger
    }

    pub fn species(&self) -> Arc<SpeciesCatalog> {
        self.species.load_full()
    }

    pub fn badges(&self) -> &BadgeCatalog {
        &self.badges
    }

    /// 手动触发一次重新评估
    pub fn reevaluate(&self) -> Vec<AwardedBadge> {
        self.ledger.absorb(&self.log.list())
    }

    /// 清空日志和账本（调试用）
    pub fn reset(&self) {
        self.log.clear();
        self.ledger.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquadex_shared::{ManualClock, MemorySnapshotStore};
    use rule_engine::{BadgeCode, NewObservation};

    fn app() -> Aquadex {
        Aquadex::with_store(
            Arc::new(MemorySnapshotStore::new()),
            Arc::new(ManualClock::starting_at_millis(1_700_000_000_000)),
        )
        .unwrap()
    }

    #[test]
    fn test_add_triggers_absorption() {
        let app = app();
        assert!(app.ledger().is_empty());

        app.log()
            .add(NewObservation::new("clownfish-001", "2024-06-01", "Lizard Island"));

        assert!(app.ledger().has(BadgeCode::FirstObservation));
        assert!(app.reevaluate().is_empty());
    }

    #[test]
    fn test_reset_clears_log_and_ledger() {
        let app = app();
        app.log()
            .add(NewObservation::new("sea-otter-005", "2024-06-01", "Monterey Bay"));
        assert_eq!(app.ledger().len(), 3);

        app.reset();
        assert!(app.log().is_empty());
        assert!(app.ledger().is_empty());
    }

    #[test]
    fn test_catalogs_are_exposed() {
        let app = app();
        assert_eq!(app.species().len(), 6);
        assert_eq!(app.badges().len(), BadgeCode::ALL.len());
    }
}
