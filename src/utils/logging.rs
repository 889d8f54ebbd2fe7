/// 日志工具模块
///
/// 提供日志初始化和批量统计输出的辅助函数
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::workflow::CollectReport;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则默认 info，`verbose` 时为 debug
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量文档问答分析");
    info!("🪣 Bucket: {}", config.bucket_name);
    info!("📂 前缀: {}", config.document_prefix);
    info!("📊 最大提交数: {}", config.max_requests);
    info!("❓ 问题数: {}", config.queries.len());
    info!("{}", "=".repeat(60));
}

/// 记录提交完成信息
pub fn log_jobs_submitted(total: usize, config: &Config) {
    info!("✓ 已提交 {} 个分析任务", total);
    info!(
        "⏱️ 每 {} 秒查询一次状态{}",
        config.poll_interval_secs,
        match config.poll_attempt_limit() {
            Some(max) => format!("，最多 {} 次", max),
            None => String::new(),
        }
    );
}

/// 打印收集阶段统计信息
pub fn print_collect_stats(report: &CollectReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部任务处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", report.written.len(), report.total());
    info!("❌ 失败: {}", report.failures.len());
    for failure in &report.failures {
        warn!(
            "   [任务 {}] {} - {}",
            failure.job_id,
            failure.document_key.as_deref().unwrap_or("未知文档"),
            truncate_text(&failure.reason, 120)
        );
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
