//! 批量处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：创建输出文件夹、日志文件
//! 2. **任务规划**：为每个输入生成任务，处理输出重名
//! 3. **并发控制**：使用 Semaphore 限制同时运行的任务数
//! 4. **结果汇总**：每个任务独立成败，汇总成 `BatchReport`
//!
//! 单个任务失败（包括 panic）只记为该任务失败，不影响其他任务。

use crate::config::Config;
use crate::error::FailureKind;
use crate::models::{plan_jobs, BatchReport, Job, JobFailure};
use crate::orchestrator::job_processor;
use crate::utils::logging::{
    append_report, init_log_file, log_inputs_loaded, log_startup, print_final_stats,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{error, info, warn};

/// 批处理上下文
///
/// 每次运行创建一个，显式传给 [`run_batch`]。
#[derive(Debug, Clone, Copy)]
pub struct BatchContext {
    workers: usize,
}

impl BatchContext {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Default for BatchContext {
    fn default() -> Self {
        Self::new(crate::config::default_workers())
    }
}

/// 执行一批任务
///
/// 每个任务在 tokio 的阻塞线程池中运行，同时运行的数量不超过 `ctx.workers()`。
/// 失败记录按任务顺序排列。
pub async fn run_batch(ctx: &BatchContext, jobs: Vec<Job>) -> BatchReport {
    let semaphore = Arc::new(Semaphore::new(ctx.workers()));
    let mut handles = Vec::with_capacity(jobs.len());

    for (idx, job) in jobs.into_iter().enumerate() {
        let job_index = idx + 1;
        let input = job.input.clone();
        // 信号量不会被关闭，acquire 只会在拿到许可后返回
        let permit = semaphore.clone().acquire_owned().await.ok();

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job_processor::process_job(&job, job_index)
        });
        handles.push((job_index, input, handle));
    }

    let mut report = BatchReport::default();
    for (job_index, input, handle) in handles {
        match handle.await {
            Ok(outcome) => report.record(&input, &outcome),
            Err(e) => report.record_failure(join_failure(&input, job_index, &e)),
        }
    }

    report
}

/// 任务 panic 或被取消时的失败记录
fn join_failure(input: &Path, job_index: usize, err: &JoinError) -> JobFailure {
    error!("[文件 {}] 任务执行失败: {}", job_index, err);
    JobFailure::new(input, FailureKind::Internal, format!("任务执行失败: {}", err))
}

/// 应用主结构
pub struct App {
    config: Config,
    context: BatchContext,
}

impl App {
    /// 初始化应用
    ///
    /// 输出文件夹无法创建时整个运行失败。
    pub async fn initialize(config: Config) -> Result<Self> {
        tokio::fs::create_dir_all(&config.output_folder)
            .await
            .with_context(|| {
                format!("无法创建输出文件夹: {}", config.output_folder.display())
            })?;

        if let Some(log_file) = &config.output_log_file {
            init_log_file(log_file)?;
        }

        log_startup(&config);

        Ok(Self {
            context: BatchContext::new(config.max_workers),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 处理所有输入文件并返回报告
    pub async fn run(&self, inputs: Vec<PathBuf>) -> Result<BatchReport> {
        log_inputs_loaded(inputs.len(), self.context.workers());

        let plan = plan_jobs(&inputs, &self.config.output_folder);
        for rejected in &plan.rejected {
            warn!("⚠️ {}: {}", rejected.input.display(), rejected.reason);
        }

        let mut report = run_batch(&self.context, plan.jobs).await;
        for rejected in plan.rejected {
            report.record_failure(rejected);
        }
        report.sort_failures_by_input(&inputs);

        print_final_stats(&report);

        if let Some(log_file) = &self.config.output_log_file {
            append_report(log_file, &report)?;
            info!("日志已保存至: {}", log_file.display());
        }

        if let Some(json_path) = &self.config.report_json {
            let json = report.to_json().context("无法序列化处理报告")?;
            tokio::fs::write(json_path, json)
                .await
                .with_context(|| format!("无法写入报告: {}", json_path.display()))?;
            info!("JSON 报告已保存至: {}", json_path.display());
        }

        Ok(report)
    }
}
