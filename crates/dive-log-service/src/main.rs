//! Aquadex 命令行入口
//!
//! 加载配置、初始化可观测性、打开应用，并输出当前日志与徽章概况。

use anyhow::Result;
use aquadex_shared::{config::AppConfig, observability};
use tracing::{info, warn};

use dive_log::Aquadex;

fn main() -> Result<()> {
    // 1. 加载配置：config/default.toml -> config/{env}.toml -> config/aquadex.toml -> 环境变量
    let config = AppConfig::load("aquadex").unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    // 2. 初始化可观测性
    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let guard = observability::init(&obs_config)?;

    info!(environment = %config.environment, "Configuration loaded");

    // 3. 打开应用
    let app = Aquadex::open(&config)?;

    let entries = app.log().list();
    info!(count = entries.len(), "Observation log");
    for entry in entries.iter().take(10) {
        info!(
            id = %entry.id,
            species = %entry.species_name,
            date = %entry.date,
            location = %entry.location,
            "Observation"
        );
    }

    let awarded = app.ledger().list();
    info!(
        earned = awarded.len(),
        available = app.badges().len(),
        "Badge progress"
    );
    for badge in &awarded {
        info!(
            code = %badge.code(),
            achieved = %badge.achieved_date,
            "{} {}",
            badge.definition.icon,
            badge.name()
        );
    }
    if awarded.is_empty() {
        warn!("No badges earned yet");
    }

    if let Some(metrics) = guard.render_metrics() {
        info!("Metrics snapshot:\n{}", metrics);
    }

    Ok(())
}
