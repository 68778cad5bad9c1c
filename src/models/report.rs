//! 批处理统计报告

use crate::error::{FailureKind, PackageError};
use crate::models::job::JobOutcome;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 单个失败记录
#[derive(Debug, Clone, Serialize)]
pub struct JobFailure {
    pub input: PathBuf,
    pub kind: FailureKind,
    pub reason: String,
}

impl JobFailure {
    pub fn new(input: impl AsRef<Path>, kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            kind,
            reason: reason.into(),
        }
    }

    pub fn from_error(input: impl AsRef<Path>, err: &PackageError) -> Self {
        Self::new(input, err.kind(), err.to_string())
    }
}

/// 批处理报告
///
/// 始终满足 `total == succeeded + failed`。
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<JobFailure>,
}

impl BatchReport {
    pub fn record_success(&mut self) {
        self.total += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, failure: JobFailure) {
        self.total += 1;
        self.failed += 1;
        self.failures.push(failure);
    }

    /// 记录一个任务的结果
    pub fn record(&mut self, input: &Path, outcome: &JobOutcome) {
        match outcome {
            Ok(_) => self.record_success(),
            Err(e) => self.record_failure(JobFailure::from_error(input, e)),
        }
    }

    /// 按输入文件的顺序重排失败记录
    ///
    /// 不在 `inputs` 中的记录排在最后，相对顺序不变。
    pub fn sort_failures_by_input(&mut self, inputs: &[PathBuf]) {
        let position: HashMap<&Path, usize> = inputs
            .iter()
            .enumerate()
            .rev()
            .map(|(index, input)| (input.as_path(), index))
            .collect();

        self.failures.sort_by_key(|failure| {
            position
                .get(failure.input.as_path())
                .copied()
                .unwrap_or(usize::MAX)
        });
    }

    /// 没有任何失败
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// 可读的汇总文本，每个元素一行
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "遍历 {} 个文件，已成功 {} 个文件，失败 {} 个文件。",
            self.total, self.succeeded, self.failed
        )];
        if !self.failures.is_empty() {
            lines.push("失败的文件及原因：".to_string());
            lines.extend(
                self.failures
                    .iter()
                    .map(|f| format!("{}: {}", f.input.display(), f.reason)),
            );
        }
        lines
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
