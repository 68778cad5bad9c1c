//! 转换任务
//!
//! 一个任务 = 一个输入文件 + 输出目录下同名的输出文件。

use crate::error::{FailureKind, PackageResult};
use crate::models::report::JobFailure;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// 单个转换任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Job {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }

    /// 输出路径 = 输出目录 + 输入文件名；没有文件名时返回 None
    pub fn for_input(input: &Path, output_dir: &Path) -> Option<Self> {
        let file_name = input.file_name()?;
        Some(Self::new(input, output_dir.join(file_name)))
    }
}

/// 任务结果：成功时为删除的标记数量
pub type JobOutcome = PackageResult<usize>;

/// 任务规划结果
#[derive(Debug, Default)]
pub struct JobPlan {
    /// 待执行的任务
    pub jobs: Vec<Job>,
    /// 规划阶段就被拒绝的输入（输出文件名冲突等）
    pub rejected: Vec<JobFailure>,
}

/// 为输入文件生成任务
///
/// 递归扫描可能得到不同子目录下的同名文件。先出现的文件占用输出名，
/// 后续同名文件记为 `OutputCollision` 失败，不会覆盖前者的输出。
pub fn plan_jobs<I, P>(inputs: I, output_dir: &Path) -> JobPlan
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut plan = JobPlan::default();
    let mut claimed: HashMap<OsString, PathBuf> = HashMap::new();

    for input in inputs {
        let input = input.as_ref();

        let Some(job) = Job::for_input(input, output_dir) else {
            plan.rejected.push(JobFailure::new(
                input,
                FailureKind::OutputCollision,
                "无法从路径中得到文件名",
            ));
            continue;
        };

        let name = job.output.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        if let Some(first) = claimed.get(&name) {
            plan.rejected.push(JobFailure::new(
                input,
                FailureKind::OutputCollision,
                format!(
                    "输出文件 {} 已被 {} 占用，已跳过",
                    job.output.display(),
                    first.display()
                ),
            ));
            continue;
        }

        claimed.insert(name, input.to_path_buf());
        plan.jobs.push(job);
    }

    plan
}
