//! # PPTX Unlock
//!
//! 去除演示文稿中的只读保护标记（`p:modifyVerifier`），批量生成可编辑的副本。
//!
//! ## 架构设计
//!
//! ### ① 包处理层（Package）
//! - `package/archive` - 解包到私有临时目录、重新打包（deflate）
//! - `package/descriptor` - `ppt/presentation.xml` 文档树，按谓词删除元素
//! - `package/transformer` - 单个文件的完整转换
//!
//! ### ② 数据层（Models）
//! - `Job` / `JobPlan` - 输入与输出路径的配对，输出重名检测
//! - `BatchReport` - 成功/失败统计与失败原因
//! - `loaders` - 扫描输入文件
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 并发执行任务并汇总报告
//! - `orchestrator/job_processor` - 单个任务的入口边界
//!
//! ## 模块结构

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod package;
pub mod utils;

// 重新导出常用类型
pub use config::Config;
pub use error::{FailureKind, PackageError, PackageResult};
pub use models::{BatchReport, Job, JobFailure};
pub use orchestrator::{process_job, run_batch, App, BatchContext};
pub use package::transform;
