/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数。日志写到 stderr，stdout 留给进度行和排名。
use std::path::Path;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::models::RunReport;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则默认只输出警告
///
/// # 参数
/// - `verbose`: 为 true 时输出本程序的调试日志
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "warn,exam_score_rank=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // 测试中可能重复初始化，忽略错误
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 当前配置（并发数、重试策略）
/// - `dir`: 准考证目录
pub fn log_startup(config: &Config, dir: &Path) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 准考证成绩查询");
    info!("📁 准考证目录: {}", dir.display());
    info!("📊 最大并发数: {}", config.concurrency());
    match config.retry_policy().max_attempts() {
        Some(n) => info!("🔁 每个准考证最多尝试 {} 次", n),
        None => info!("🔁 失败后无限重试"),
    }
    info!("{}", "=".repeat(60));
}

/// 记录准考证加载信息
///
/// # 参数
/// - `total`: 目录中的文件总数
pub fn log_files_found(total: usize) {
    if total == 0 {
        warn!("⚠️ 目录中没有找到任何文件");
    } else {
        info!("✓ 找到 {} 个待处理的准考证", total);
    }
}

/// 记录单次失败
///
/// # 参数
/// - `file`: 准考证文件路径
/// - `attempt`: 当前是第几次尝试
/// - `max_attempts`: 最大尝试次数，`None` 表示无限重试
/// - `reason`: 失败原因，超过 200 字会被截断
pub fn log_attempt_failed(file: &Path, attempt: u32, max_attempts: Option<u32>, reason: &str) {
    let reason = truncate_text(reason, 200);
    match max_attempts {
        Some(max) => warn!("[{}] 第 {}/{} 次尝试失败: {}", file.display(), attempt, max, reason),
        None => warn!("[{}] 第 {} 次尝试失败: {}", file.display(), attempt, reason),
    }
}

/// 记录最终放弃
///
/// # 参数
/// - `file`: 准考证文件路径
/// - `attempts`: 已尝试次数
/// - `reason`: 最后一次失败的原因
pub fn log_gave_up(file: &Path, attempts: u32, reason: &str) {
    error!("[{}] ❌ 已尝试 {} 次，放弃: {}", file.display(), attempts, reason);
}

/// 打印最终统计信息
///
/// # 参数
/// - `report`: 汇总后的结果
/// - `total_files`: 处理的文件总数
pub fn print_final_stats(report: &RunReport, total_files: usize) {
    info!("{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!("完成时间: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("✅ 成功: {}/{}", total_files.saturating_sub(report.failures.len()), total_files);
    info!("📝 成绩记录: {} 条", report.entries.len());
    if !report.failures.is_empty() {
        warn!("❌ 失败: {}", report.failures.len());
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最多保留的字符数（按字符而非字节计）
///
/// # 返回
/// 未超长时原样返回，否则截断并追加 `...`
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
