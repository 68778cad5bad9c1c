//! 错误类型
//!
//! 单个文件的处理错误统一收敛到 [`PackageError`]，批处理层只看到
//! [`FailureKind`] 标签和一段可读的原因文本。

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 描述文件在压缩包内的固定路径
pub const DESCRIPTOR_PATH: &str = "ppt/presentation.xml";

/// 演示文稿处理错误
#[derive(Debug, Error)]
pub enum PackageError {
    /// 不是合法的压缩包，或无法打开
    #[error("无法读取演示文稿压缩包: {0}")]
    UnreadablePackage(String),

    /// 压缩包中没有 ppt/presentation.xml
    #[error("找不到 ppt/presentation.xml 文件。")]
    MissingDescriptor,

    /// presentation.xml 无法解析
    #[error("presentation.xml 不是合法的 XML: {0}")]
    MalformedXml(String),

    /// 解包/打包过程中的其他 I/O 错误
    #[error("文件读写失败: {0}")]
    IoFailure(String),
}

impl PackageError {
    pub fn unreadable(detail: impl fmt::Display) -> Self {
        PackageError::UnreadablePackage(detail.to_string())
    }

    pub fn malformed(detail: impl fmt::Display) -> Self {
        PackageError::MalformedXml(detail.to_string())
    }

    pub fn io(detail: impl fmt::Display) -> Self {
        PackageError::IoFailure(detail.to_string())
    }

    /// 错误对应的分类标签
    pub fn kind(&self) -> FailureKind {
        match self {
            PackageError::UnreadablePackage(_) => FailureKind::UnreadablePackage,
            PackageError::MissingDescriptor => FailureKind::MissingDescriptor,
            PackageError::MalformedXml(_) => FailureKind::MalformedXml,
            PackageError::IoFailure(_) => FailureKind::IoFailure,
        }
    }
}

impl From<zip::result::ZipError> for PackageError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => PackageError::io(e),
            other => PackageError::unreadable(other),
        }
    }
}

/// 失败分类
///
/// 前四项对应单个文件的处理错误，后两项只会出现在批处理层。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnreadablePackage,
    MissingDescriptor,
    MalformedXml,
    IoFailure,
    /// 与先前的输入文件重名，输出路径冲突
    OutputCollision,
    /// 工作任务异常退出（panic 或被取消）
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::UnreadablePackage => "无法读取",
            FailureKind::MissingDescriptor => "缺少描述文件",
            FailureKind::MalformedXml => "XML 格式错误",
            FailureKind::IoFailure => "读写失败",
            FailureKind::OutputCollision => "输出文件冲突",
            FailureKind::Internal => "任务异常",
        };
        f.write_str(label)
    }
}

/// 单个文件处理结果类型
pub type PackageResult<T> = Result<T, PackageError>;
