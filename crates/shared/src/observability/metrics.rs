//! Prometheus 指标模块
//!
//! 基于 metrics crate 记录业务指标。recorder 只在配置开启时安装，
//! 未安装时所有记录函数都是空操作。

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::ObservabilityConfig;

pub const OBSERVATION_MUTATIONS_TOTAL: &str = "aquadex_observation_mutations_total";
pub const BADGES_AWARDED_TOTAL: &str = "aquadex_badges_awarded_total";
pub const BADGE_EVALUATION_DURATION_SECONDS: &str = "aquadex_badge_evaluation_duration_seconds";
pub const SNAPSHOT_WRITE_FAILURES_TOTAL: &str = "aquadex_snapshot_write_failures_total";

/// Metrics 资源句柄
pub struct MetricsHandle {
    handle: PrometheusHandle,
}

impl MetricsHandle {
    /// 渲染 Prometheus 文本格式的指标快照
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// 安装全局 Prometheus recorder
pub fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_common_metrics(&config.service_name);

    Ok(MetricsHandle { handle })
}

/// 注册通用指标描述
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!(
        OBSERVATION_MUTATIONS_TOTAL,
        "Total number of observation log mutations"
    );
    metrics::describe_counter!(BADGES_AWARDED_TOTAL, "Total number of badges awarded");
    metrics::describe_histogram!(
        BADGE_EVALUATION_DURATION_SECONDS,
        "Badge rule evaluation duration in seconds"
    );
    metrics::describe_counter!(
        SNAPSHOT_WRITE_FAILURES_TOTAL,
        "Total number of failed snapshot writes"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录观测日志变更（add / update / remove / clear）
#[inline]
pub fn record_observation_mutation(operation: &'static str) {
    metrics::counter!(OBSERVATION_MUTATIONS_TOTAL, "operation" => operation).increment(1);
}

/// 记录徽章授予
#[inline]
pub fn record_badge_awarded(code: &str) {
    metrics::counter!(BADGES_AWARDED_TOTAL, "code" => code.to_string()).increment(1);
}

/// 记录一次规则评估耗时
#[inline]
pub fn record_badge_evaluation(awarded: usize, duration_secs: f64) {
    metrics::histogram!(
        BADGE_EVALUATION_DURATION_SECONDS,
        "awarded" => (awarded > 0).to_string()
    )
    .record(duration_secs);
}

/// 记录快照写入失败
#[inline]
pub fn record_snapshot_write_failure(key: &str) {
    metrics::counter!(SNAPSHOT_WRITE_FAILURES_TOTAL, "key" => key.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_functions_do_not_panic() {
        // 即使没有初始化 recorder，这些函数也不应该 panic
        record_observation_mutation("add");
        record_badge_awarded("FIRST_OBSERVATION");
        record_badge_evaluation(1, 0.001);
        record_snapshot_write_failure("aquadex_diveLogEntries");
    }
}
