//! 单个文件转换 - 包处理层
//!
//! 解包 → 删除 `p:modifyVerifier` → 重新打包。

use crate::error::{PackageError, PackageResult, DESCRIPTOR_PATH};
use crate::package::archive::UnpackedPackage;
use crate::package::descriptor::{is_modify_verifier, XmlDocument};
use std::fs;
use std::path::Path;
use tracing::debug;

/// 去除只读标记并写出可编辑副本
///
/// # 参数
/// - `input`: 输入演示文稿
/// - `output`: 输出路径，已存在时覆盖
///
/// # 返回
/// 返回删除的标记数量。没有标记时 presentation.xml 按原字节写出。
pub fn transform(input: &Path, output: &Path) -> PackageResult<usize> {
    let package = UnpackedPackage::extract(input)?;

    let descriptor = package
        .member_path(DESCRIPTOR_PATH)
        .ok_or(PackageError::MissingDescriptor)?;
    let source = fs::read(&descriptor).map_err(PackageError::io)?;

    let mut document = XmlDocument::parse(&source)?;
    let removed = document.remove_elements(is_modify_verifier);

    if removed > 0 {
        let rewritten = document.to_pretty_bytes()?;
        fs::write(&descriptor, rewritten).map_err(PackageError::io)?;
    }
    debug!("{}: 删除 {} 个 modifyVerifier", input.display(), removed);

    package.repack(output)?;
    Ok(removed)
}
