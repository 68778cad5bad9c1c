use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 识别的演示文稿扩展名（不区分大小写）
pub const PRESENTATION_EXTENSIONS: [&str; 2] = ["pptx", "ppt"];

/// 是否为 .pptx / .ppt 文件名
pub fn is_presentation_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            PRESENTATION_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// 收集待处理的演示文稿
///
/// - 文件：扩展名匹配时返回该文件
/// - 目录：递归扫描，按文件名排序
pub fn discover_inputs(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        if is_presentation_file(path) {
            return Ok(vec![path.to_path_buf()]);
        }
        bail!("指定的路径不是有效的PPTX/PPT文件或文件夹: {}", path.display());
    }

    if !path.is_dir() {
        bail!("指定的路径不是有效的PPTX/PPT文件或文件夹: {}", path.display());
    }

    let mut inputs = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("跳过无法读取的路径: {}", e);
                continue;
            }
        };

        if entry.file_type().is_file() && is_presentation_file(entry.path()) {
            tracing::debug!("发现文件: {}", entry.path().display());
            inputs.push(entry.into_path());
        }
    }

    Ok(inputs)
}
