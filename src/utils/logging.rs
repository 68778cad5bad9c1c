//! 日志工具模块
//!
//! 提供日志初始化、日志文件和统计输出的辅助函数

use crate::config::Config;
use crate::models::BatchReport;
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 初始化 tracing 输出
///
/// 默认级别为 INFO，`verbose` 为 true 时为 DEBUG；`RUST_LOG` 可追加过滤规则。
pub fn init(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .try_init();
}

/// 初始化日志文件
pub fn init_log_file(log_file_path: &Path) -> Result<()> {
    let log_header = format!(
        "{}\n演示文稿转换日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入日志文件: {}", log_file_path.display()))?;
    Ok(())
}

/// 将统计结果追加到日志文件
pub fn append_report(log_file_path: &Path, report: &BatchReport) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("无法打开日志文件: {}", log_file_path.display()))?;

    writeln!(
        file,
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    for line in report.summary_lines() {
        writeln!(file, "{}", line)?;
    }
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 并行转换模式");
    info!("📊 最大并发数: {}", config.max_workers);
    info!("📁 输出文件夹: {}", config.output_folder.display());
    info!("{}", "=".repeat(60));
}

/// 记录文件加载信息
pub fn log_inputs_loaded(total: usize, workers: usize) {
    info!("✓ 找到 {} 个待处理的文件", total);
    info!("📋 最多同时处理 {} 个", workers);
}

/// 打印最终统计信息
pub fn print_final_stats(report: &BatchReport) {
    info!("{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!("{}", "=".repeat(60));

    let mut lines = report.summary_lines().into_iter();
    if let Some(summary) = lines.next() {
        info!("{}", summary);
    }
    for line in lines {
        error!("{}", line);
    }
    info!("{}", "=".repeat(60));
}
