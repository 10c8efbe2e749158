//! 快照存储模块
//!
//! 提供不透明的 key-value 字符串存储抽象，以及"读失败即为空、写失败只告警"
//! 的集合快照读写辅助函数。
//!
//! ```text
//! SnapshotStore trait
//!  ├── MemorySnapshotStore — DashMap 实现，适用于测试和临时会话
//!  └── FileSnapshotStore   — 每个 key 对应 data_dir 下的一个 JSON 文件
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{AquadexError, Result};
use crate::observability::metrics::record_snapshot_write_failure;

/// 快照存储接口
#[cfg_attr(test, mockall::automock)]
pub trait SnapshotStore: Send + Sync {
    /// 读取 key 对应的原始快照，不存在时返回 None
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// 覆盖写入快照
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// 删除快照，key 不存在时视为成功
    fn remove(&self, key: &str) -> Result<()>;
}

/// 根据配置创建快照存储
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn SnapshotStore>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemorySnapshotStore::new())),
        StorageBackend::File => Ok(Arc::new(FileSnapshotStore::open(&config.data_dir)?)),
    }
}

// ============================================================================
// MemorySnapshotStore
// ============================================================================

/// 内存快照存储
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    data: Arc<DashMap<String, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前保存的 key 数量
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.get(key).map(|v| v.clone()))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.data.remove(key);
        Ok(())
    }
}

// ============================================================================
// FileSnapshotStore
// ============================================================================

/// 文件快照存储
///
/// 写入先落到临时文件再 rename，避免进程中断留下半截快照。
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// 打开（必要时创建）数据目录
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "文件快照存储已打开");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(AquadexError::Internal(format!("非法的快照 key: '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// 集合快照读写
// ============================================================================

/// 读取集合快照
///
/// 快照不存在、存储不可用或内容无法解析时都返回空集合，只记录告警。
#[instrument(skip(store))]
pub fn load_collection<T: DeserializeOwned>(store: &dyn SnapshotStore, key: &str) -> Vec<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(key = %key, error = %e, "读取快照失败，使用空集合");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(items) => {
            debug!(key = %key, count = items.len(), "快照已加载");
            items
        }
        Err(e) => {
            warn!(key = %key, error = %e, "快照内容无法解析，使用空集合");
            Vec::new()
        }
    }
}

/// 写入集合快照
///
/// 尽力而为：失败只记录告警并返回 false，不影响调用方的内存状态。
#[instrument(skip(store, items), fields(count = items.len()))]
pub fn save_collection<T: Serialize>(store: &dyn SnapshotStore, key: &str, items: &[T]) -> bool {
    let result = serde_json::to_string(items)
        .map_err(AquadexError::from)
        .and_then(|json| store.put(key, &json));

    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(key = %key, error = %e, code = e.code(), "写入快照失败，内存状态不受影响");
            record_snapshot_write_failure(key);
            false
        }
    }
}

/// 删除集合快照，失败只告警
#[instrument(skip(store))]
pub fn clear_collection(store: &dyn SnapshotStore, key: &str) -> bool {
    match store.remove(key) {
        Ok(()) => true,
        Err(e) => {
            warn!(key = %key, error = %e, "删除快照失败");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        value: i32,
    }

    fn items() -> Vec<Item> {
        vec![
            Item {
                id: "a".to_string(),
                value: 1,
            },
            Item {
                id: "b".to_string(),
                value: 2,
            },
        ]
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemorySnapshotStore::new();
        assert!(save_collection(&store, "items", &items()));
        assert!(store.contains("items"));

        let loaded: Vec<Item> = load_collection(&store, "items");
        assert_eq!(loaded, items());
    }

    #[test]
    fn test_missing_key_loads_empty() {
        let store = MemorySnapshotStore::new();
        let loaded: Vec<Item> = load_collection(&store, "missing");
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_malformed_snapshot_loads_empty() {
        let store = MemorySnapshotStore::new();
        store.put("items", "{not json").unwrap();

        let loaded: Vec<Item> = load_collection(&store, "items");
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_clear_collection() {
        let store = MemorySnapshotStore::new();
        save_collection(&store, "items", &items());
        assert!(clear_collection(&store, "items"));
        assert!(store.is_empty());
        // 再次删除不存在的 key 仍然成功
        assert!(clear_collection(&store, "items"));
    }

    #[test]
    fn test_read_failure_loads_empty() {
        let mut store = MockSnapshotStore::new();
        store
            .expect_get()
            .returning(|_| Err(AquadexError::Internal("storage offline".to_string())));

        let loaded: Vec<Item> = load_collection(&store, "items");
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_write_failure_is_reported_not_raised() {
        let mut store = MockSnapshotStore::new();
        store
            .expect_put()
            .times(1)
            .returning(|_, _| {
                Err(std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full").into())
            });

        assert!(!save_collection(&store, "items", &items()));
    }

    #[test]
    fn test_remove_failure_is_reported_not_raised() {
        let mut store = MockSnapshotStore::new();
        store
            .expect_remove()
            .returning(|_| Err(AquadexError::Internal("storage offline".to_string())));

        assert!(!clear_collection(&store, "items"));
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path().join("snapshots")).unwrap();

        assert_eq!(store.get("items").unwrap(), None);
        store.put("items", "[1,2,3]").unwrap();
        assert_eq!(store.get("items").unwrap().as_deref(), Some("[1,2,3]"));
        assert!(store.dir().join("items.json").exists());

        store.remove("items").unwrap();
        assert_eq!(store.get("items").unwrap(), None);
        store.remove("items").unwrap();
    }

    #[test]
    fn test_file_store_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();

        assert!(store.put("../escape", "[]").is_err());
        assert!(store.get("").is_err());
    }

    #[test]
    fn test_open_store_by_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            backend: StorageBackend::File,
            data_dir: dir.path().join("data"),
        };
        let store = open_store(&config).unwrap();
        store.put("k", "v").unwrap();
        assert!(dir.path().join("data").join("k.json").exists());

        let memory = open_store(&StorageConfig {
            backend: StorageBackend::Memory,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(memory.get("k").unwrap(), None);
    }
}
