//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量处理器
//! - 管理应用生命周期（输出文件夹、日志文件）
//! - 规划任务、控制并发（Semaphore）
//! - 汇总 `BatchReport`
//!
//! ### `job_processor` - 单个文件处理器
//! - 调用 `package::transform`
//! - 输出单个文件的处理日志
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<Job>)
//!     ↓
//! job_processor (处理单个 Job)
//!     ↓
//! package (解包 / 修改 presentation.xml / 打包)
//! ```

pub mod batch_processor;
pub mod job_processor;

pub use batch_processor::{run_batch, App, BatchContext};
pub use job_processor::process_job;
