use anyhow::{Context, Result};
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;

/// 初始化 tracing 订阅器
///
/// - 默认级别 info，`verbose` 为 true 时为 debug，`RUST_LOG` 可进一步覆盖
/// - 指定 `log_file` 时同时追加写入该文件（无颜色）
pub fn init_logger(verbose: bool, log_file: Option<&str>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("无法打开日志文件: {}", path))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()
        .context("日志系统初始化失败")?;

    Ok(())
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n产品文案生成日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入日志文件: {}", log_file_path))?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 多任务产品文案生成模式");
    info!("📊 最大并发数: {}", config.max_concurrent_products);
    info!("🤖 生成后端: {:?}", config.llm_backend);
    info!(
        "🔁 最多改写 {} 轮，每轮至少提升 {} 分",
        config.refinement.max_iterations, config.refinement.min_improvement
    );
    info!("{}", "=".repeat(60));
}

/// 记录产品加载信息
///
/// # 参数
/// - `total`: 产品总数
/// - `max_concurrent`: 最大并发数
pub fn log_products_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个待处理的产品", total);
    info!("📋 将以每批 {} 个的方式处理", max_concurrent);
    info!("💡 每批完成后保存结果，再开始下一批\n");
}

/// 记录批次开始信息
pub fn log_batch_start(
    batch_num: usize,
    total_batches: usize,
    start: usize,
    end: usize,
    total: usize,
) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批产品: {}-{} / 共 {} 个", start, end, total);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 第 {} 批完成: 成功 {}/{}", batch_num, success, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `scores`: 所有成功产品的最终得分
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(success: usize, failed: usize, scores: &[f64], log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, success + failed);
    info!("❌ 失败: {}", failed);
    if let Some(summary) = ScoreSummary::from_scores(scores) {
        info!("📈 平均得分: {:.2}", summary.average);
        info!("⬆️ 最高得分: {:.2}", summary.highest);
        info!("⬇️ 最低得分: {:.2}", summary.lowest);
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 得分汇总
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSummary {
    pub average: f64,
    pub highest: f64,
    pub lowest: f64,
}

impl ScoreSummary {
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let sum: f64 = scores.iter().sum();
        Some(Self {
            average: sum / scores.len() as f64,
            highest: scores.iter().copied().fold(f64::MIN, f64::max),
            lowest: scores.iter().copied().fold(f64::MAX, f64::min),
        })
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("一二三四五", 3), "一二三...");
    }

    #[test]
    fn score_summary_over_results() {
        assert_eq!(ScoreSummary::from_scores(&[]), None);
        let summary = ScoreSummary::from_scores(&[60.0, 80.0, 70.0]).unwrap();
        assert_eq!(summary.average, 70.0);
        assert_eq!(summary.highest, 80.0);
        assert_eq!(summary.lowest, 60.0);
    }
}
