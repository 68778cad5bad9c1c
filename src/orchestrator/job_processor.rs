//! 单个文件处理器 - 编排层
//!
//! 任务的入口边界：调用包处理层完成转换，记录日志，把结果原样交给批处理器。

use crate::models::{Job, JobOutcome};
use crate::package::transform;
use tracing::{debug, error, info};

/// 处理单个任务
///
/// # 参数
/// - `job`: 转换任务
/// - `job_index`: 任务序号（仅用于日志）
pub fn process_job(job: &Job, job_index: usize) -> JobOutcome {
    debug!(
        "[文件 {}] 开始处理: {} -> {}",
        job_index,
        job.input.display(),
        job.output.display()
    );

    let outcome = transform(&job.input, &job.output);

    match &outcome {
        Ok(0) => info!(
            "[文件 {}] ✓ 未发现只读标记，已输出: {}",
            job_index,
            job.output.display()
        ),
        Ok(removed) => info!(
            "[文件 {}] ✓ 已移除 {} 个只读标记: {}",
            job_index,
            removed,
            job.output.display()
        ),
        Err(e) => error!(
            "[文件 {}] ❌ {} ({}): {}",
            job_index,
            job.input.display(),
            e.kind(),
            e
        ),
    }

    outcome
}
