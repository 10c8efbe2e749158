//! 统一可观测性模块
//!
//! 提供 metrics、logging 的统一初始化和管理。
//! 所有入口通过单一函数配置可观测性，确保一致的日志格式和指标命名。

pub mod metrics;
pub mod tracing;

use ::tracing::info;
use anyhow::Result;
use serde::Deserialize;

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// 服务名称，用于标识日志和指标的来源
    #[serde(default)]
    pub service_name: String,

    /// 日志级别（如 "info", "debug"）
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 是否启用 JSON 格式日志
    #[serde(default)]
    pub json_logs: bool,

    /// 是否安装 Prometheus 指标 recorder
    #[serde(default)]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "aquadex".to_string(),
            log_level: default_log_level(),
            json_logs: false,
            metrics_enabled: false,
        }
    }
}

impl ObservabilityConfig {
    /// 注入服务名（配置文件中未显式设置时）
    pub fn with_service_name(mut self, service_name: &str) -> Self {
        if self.service_name.is_empty() {
            self.service_name = service_name.to_string();
        }
        self
    }
}

/// 可观测性资源守卫
///
/// 持有 metrics handle 的生命周期，drop 时记录关闭日志。
pub struct ObservabilityGuard {
    metrics_handle: Option<metrics::MetricsHandle>,
}

impl ObservabilityGuard {
    /// 创建一个空的 Guard（用于测试或禁用可观测性时）
    pub fn empty() -> Self {
        Self {
            metrics_handle: None,
        }
    }

    /// 渲染当前指标快照（Prometheus 文本格式）
    pub fn render_metrics(&self) -> Option<String> {
        self.metrics_handle.as_ref().map(|h| h.render())
    }
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        info!("Shutting down observability...");
    }
}

/// 统一初始化可观测性
///
/// 初始化顺序：
/// 1. Tracing（日志）
/// 2. Metrics（Prometheus recorder，可选）
pub fn init(config: &ObservabilityConfig) -> Result<ObservabilityGuard> {
    tracing::init(config)?;

    let metrics_handle = if config.metrics_enabled {
        Some(metrics::init(config)?)
    } else {
        None
    };

    info!(
        service = %config.service_name,
        log_level = %config.log_level,
        metrics_enabled = config.metrics_enabled,
        "Observability initialized"
    );

    Ok(ObservabilityGuard { metrics_handle })
}
