//! 观测日志
//!
//! 维护按时间戳倒序排列的观测记录集合，每次有效变更后：
//! 1. 尽力写入快照（失败只告警）
//! 2. 按注册顺序同步通知所有监听者
//!
//! 物种显示名称在写入时从当前物种目录解析并冗余保存，之后目录的变化
//! 不会影响已有记录。

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use aquadex_shared::Clock;
use aquadex_shared::observability::metrics::record_observation_mutation;
use aquadex_shared::storage::{SnapshotStore, clear_collection, load_collection, save_collection};
use rule_engine::{NewObservation, ObservationEntry, SpeciesCatalog};

use crate::error::{DiveLogError, Result};

/// 观测日志快照 key
pub const LOG_SNAPSHOT_KEY: &str = "aquadex_diveLogEntries";

/// 日志变更监听者
///
/// 在每次有效变更后被调用，参数为变更后的完整日志（倒序）。
#[cfg_attr(test, mockall::automock)]
pub trait LogListener: Send + Sync {
    fn on_log_changed(&self, entries: &[ObservationEntry]);
}

/// 观测日志
pub struct ObservationLog {
    entries: RwLock<Vec<ObservationEntry>>,
    listeners: RwLock<Vec<Arc<dyn LogListener>>>,
    store: Arc<dyn SnapshotStore>,
    catalog: Arc<ArcSwap<SpeciesCatalog>>,
    clock: Arc<dyn Clock>,
}

impl ObservationLog {
    /// 从快照恢复日志，快照缺失或损坏时从空日志开始
    pub fn open(
        store: Arc<dyn SnapshotStore>,
        catalog: Arc<ArcSwap<SpeciesCatalog>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut entries: Vec<ObservationEntry> = load_collection(store.as_ref(), LOG_SNAPSHOT_KEY);
        sort_newest_first(&mut entries);
        info!(count = entries.len(), "观测日志已加载");

        Self {
            entries: RwLock::new(entries),
            listeners: RwLock::new(Vec::new()),
            store,
            catalog,
            clock,
        }
    }

    /// 注册监听者，按注册顺序通知
    pub fn subscribe(&self, listener: Arc<dyn LogListener>) {
        self.listeners.write().push(listener);
    }

    /// 当前日志（倒序）
    pub fn list(&self) -> Vec<ObservationEntry> {
        self.entries.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<ObservationEntry> {
        self.entries.read().iter().find(|e| e.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// 新增观测记录
    #[instrument(skip(self, data), fields(species_id = %data.species_id))]
    pub fn add(&self, data: NewObservation) -> ObservationEntry {
        let species_name = self.catalog.load().display_name(&data.species_id);
        let entry = ObservationEntry::from_new(
            Uuid::new_v4().to_string(),
            data,
            species_name,
            self.clock.now_millis(),
        );

        let snapshot = {
            let mut entries = self.entries.write();
            entries.insert(0, entry.clone());
            sort_newest_first(&mut entries);
            entries.clone()
        };

        debug!(entry_id = %entry.id, species_name = %entry.species_name, "观测记录已新增");
        self.commit("add", &snapshot);
        entry
    }

    /// 更新观测记录
    ///
    /// 物种未变化时保留已保存的名称，物种变化时重新解析。
    /// 时间戳刷新为当前时间，记录因此移到日志最前。
    #[instrument(skip(self, entry), fields(entry_id = %entry.id))]
    pub fn update(&self, entry: ObservationEntry) -> Result<ObservationEntry> {
        let catalog = self.catalog.load();

        let (updated, snapshot) = {
            let mut entries = self.entries.write();
            let pos = entries
                .iter()
                .position(|e| e.id == entry.id)
                .ok_or_else(|| DiveLogError::EntryNotFound(entry.id.clone()))?;

            let existing = &entries[pos];
            let species_name = if existing.species_id == entry.species_id {
                existing.species_name.clone()
            } else {
                catalog.display_name(&entry.species_id)
            };

            let updated = ObservationEntry {
                species_name,
                timestamp: self.clock.now_millis(),
                ..entry
            };
            entries[pos] = updated.clone();
            sort_newest_first(&mut entries);
            (updated, entries.clone())
        };

        debug!(species_name = %updated.species_name, "观测记录已更新");
        self.commit("update", &snapshot);
        Ok(updated)
    }

    /// 删除观测记录，记录不存在时返回 false 且不通知
    #[instrument(skip(self))]
    pub fn remove(&self, id: &str) -> bool {
        let snapshot = {
            let mut entries = self.entries.write();
            let before = entries.len();
            entries.retain(|e| e.id != id);
            if entries.len() == before {
                return false;
            }
            entries.clone()
        };

        debug!("观测记录已删除");
        self.commit("remove", &snapshot);
        true
    }

    /// 清空整个日志并删除快照
    #[instrument(skip(self))]
    pub fn clear(&self) {
        let removed = {
            let mut entries = self.entries.write();
            let removed = entries.len();
            entries.clear();
            removed
        };

        clear_collection(self.store.as_ref(), LOG_SNAPSHOT_KEY);
        record_observation_mutation("clear");
        info!(removed, "观测日志已清空");
        self.notify(&[]);
    }

    /// 当前物种目录
    pub fn species_catalog(&self) -> Arc<SpeciesCatalog> {
        self.catalog.load_full()
    }

    /// 替换物种目录，只影响之后的写入
    pub fn replace_species_catalog(&self, catalog: SpeciesCatalog) {
        info!(count = catalog.len(), "物种目录已替换");
        self.catalog.store(Arc::new(catalog));
    }

    fn commit(&self, operation: &'static str, snapshot: &[ObservationEntry]) {
        save_collection(self.store.as_ref(), LOG_SNAPSHOT_KEY, snapshot);
        record_observation_mutation(operation);
        self.notify(snapshot);
    }

    /// 通知监听者，调用时不持有日志锁
    fn notify(&self, snapshot: &[ObservationEntry]) {
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            listener.on_log_changed(snapshot);
        }
    }
}

/// 按时间戳倒序排列，时间戳相同时保持原有相对顺序
fn sort_newest_first(entries: &mut [ObservationEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquadex_shared::{AquadexError, ManualClock, MemorySnapshotStore};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingListener {
        calls: Mutex<Vec<usize>>,
    }

    impl LogListener for RecordingListener {
        fn on_log_changed(&self, entries: &[ObservationEntry]) {
            self.calls.lock().push(entries.len());
        }
    }

    struct OfflineStore;

    impl SnapshotStore for OfflineStore {
        fn get(&self, _key: &str) -> aquadex_shared::Result<Option<String>> {
            Err(AquadexError::Internal("offline".to_string()))
        }

        fn put(&self, _key: &str, _value: &str) -> aquadex_shared::Result<()> {
            Err(AquadexError::Internal("offline".to_string()))
        }

        fn remove(&self, _key: &str) -> aquadex_shared::Result<()> {
            Err(AquadexError::Internal("offline".to_string()))
        }
    }

    fn open_log(store: Arc<dyn SnapshotStore>) -> ObservationLog {
        let catalog = Arc::new(ArcSwap::from_pointee(SpeciesCatalog::bundled().unwrap()));
        let clock = Arc::new(ManualClock::starting_at_millis(1_700_000_000_000));
        ObservationLog::open(store, catalog, clock)
    }

    #[test]
    fn test_add_resolves_name_and_orders_newest_first() {
        let log = open_log(Arc::new(MemorySnapshotStore::new()));

        let first = log.add(NewObservation::new("clownfish-001", "2024-01-01", "Reef"));
        let second = log.add(NewObservation::new("kraken-999", "2024-01-02", "Abyss"));

        assert_eq!(first.species_name, "Clownfish");
        assert_eq!(second.species_name, "Unknown Species");
        assert_ne!(first.id, second.id);

        let ids: Vec<String> = log.list().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let log = open_log(Arc::new(MemorySnapshotStore::new()));
        let listener = Arc::new(RecordingListener::default());
        log.add(NewObservation::new("clownfish-001", "2024-01-01", "Reef"));
        log.subscribe(listener.clone());

        let ghost = ObservationEntry::from_new(
            "ghost",
            NewObservation::new("clownfish-001", "2024-01-01", "Reef"),
            "Clownfish",
            0,
        );
        let result = log.update(ghost);

        assert!(matches!(result, Err(DiveLogError::EntryNotFound(id)) if id == "ghost"));
        assert_eq!(log.len(), 1);
        assert!(listener.calls.lock().is_empty());
    }

    #[test]
    fn test_update_moves_entry_to_front() {
        let log = open_log(Arc::new(MemorySnapshotStore::new()));
        let older = log.add(NewObservation::new("clownfish-001", "2024-01-01", "Reef"));
        log.add(NewObservation::new("manta-ray-002", "2024-01-02", "Bay"));

        let mut edited = older.clone();
        edited.notes = Some("two anemones".to_string());
        let updated = log.update(edited).unwrap();

        assert!(updated.timestamp > older.timestamp);
        assert_eq!(log.list()[0].id, older.id);
        assert_eq!(log.list()[0].notes.as_deref(), Some("two anemones"));
    }

    #[test]
    fn test_remove_missing_id_does_not_notify() {
        let log = open_log(Arc::new(MemorySnapshotStore::new()));
        let listener = Arc::new(RecordingListener::default());
        log.subscribe(listener.clone());

        let entry = log.add(NewObservation::new("clownfish-001", "2024-01-01", "Reef"));
        assert!(!log.remove("nope"));
        assert!(log.remove(&entry.id));
        assert!(!log.remove(&entry.id));

        assert_eq!(*listener.calls.lock(), vec![1, 0]);
    }

    #[test]
    fn test_listeners_receive_full_log_in_registration_order() {
        let log = open_log(Arc::new(MemorySnapshotStore::new()));
        let order = Arc::new(Mutex::new(Vec::new()));

        let mut first = MockLogListener::new();
        let first_order = order.clone();
        first
            .expect_on_log_changed()
            .withf(|entries| entries.len() == 1 && entries[0].species_name == "Manta Ray")
            .times(1)
            .returning(move |_| first_order.lock().push("first"));

        let mut second = MockLogListener::new();
        let second_order = order.clone();
        second
            .expect_on_log_changed()
            .times(1)
            .returning(move |_| second_order.lock().push("second"));

        log.subscribe(Arc::new(first));
        log.subscribe(Arc::new(second));
        log.add(NewObservation::new("manta-ray-002", "2024-01-01", "Hanifaru Bay"));

        assert_eq!(*order.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_clear_empties_log_and_snapshot() {
        let store = Arc::new(MemorySnapshotStore::new());
        let log = open_log(store.clone());
        log.add(NewObservation::new("clownfish-001", "2024-01-01", "Reef"));
        assert!(store.contains(LOG_SNAPSHOT_KEY));

        log.clear();
        assert!(log.is_empty());
        assert!(!store.contains(LOG_SNAPSHOT_KEY));
    }

    #[test]
    fn test_offline_store_does_not_block_mutations() {
        let log = open_log(Arc::new(OfflineStore));
        let listener = Arc::new(RecordingListener::default());
        log.subscribe(listener.clone());

        let entry = log.add(NewObservation::new("sea-otter-005", "2024-01-01", "Kelp"));
        assert_eq!(log.get(&entry.id), Some(entry.clone()));
        assert!(log.remove(&entry.id));
        log.clear();

        assert_eq!(*listener.calls.lock(), vec![1, 0, 0]);
    }
}
