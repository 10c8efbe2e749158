//! 时钟抽象
//!
//! 观测日志的排序时间戳和徽章授予时间都来自 `Clock`，
//! 测试中可替换为手动推进的时钟以获得确定的顺序。

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;

/// 时钟接口
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// 当前时间的毫秒时间戳
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// 系统时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 手动时钟
///
/// 每次调用 `now()` 都会自动前进 `step`，保证连续写入的时间戳严格递增。
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self::with_step(start, Duration::milliseconds(1))
    }

    pub fn with_step(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            current: Mutex::new(start),
            step,
        }
    }

    /// 从毫秒时间戳创建
    pub fn starting_at_millis(millis: i64) -> Self {
        let start = Utc
            .timestamp_millis_opt(millis)
            .single()
            .unwrap_or_else(Utc::now);
        Self::new(start)
    }

    /// 手动推进时间
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock();
        *current += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let mut current = self.current.lock();
        let now = *current;
        *current += self.step;
        now
    }
}
