//! 压缩包解包/打包 - 包处理层
//!
//! 每次解包都使用独立的临时目录，`UnpackedPackage` 被释放时目录随之删除。

use crate::error::{PackageError, PackageResult};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// 成员类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    File,
    Directory,
}

/// 压缩包成员
#[derive(Debug, Clone)]
pub struct PackageMember {
    /// 压缩包内的原始路径
    pub name: String,
    pub kind: MemberKind,
    /// 相对临时目录的落盘路径
    relative: PathBuf,
    last_modified: DateTime,
}

/// 已解包的演示文稿
pub struct UnpackedPackage {
    root: TempDir,
    members: Vec<PackageMember>,
    /// 输入文件的权限，输出沿用
    #[cfg_attr(not(unix), allow(dead_code))]
    permissions: Option<fs::Permissions>,
}

impl UnpackedPackage {
    /// 将压缩包完整解到私有临时目录
    pub fn extract(input: &Path) -> PackageResult<Self> {
        let file = File::open(input).map_err(|e| {
            PackageError::unreadable(format!("无法打开 {}: {}", input.display(), e))
        })?;
        let permissions = file.metadata().ok().map(|meta| meta.permissions());
        let mut archive = ZipArchive::new(file).map_err(PackageError::unreadable)?;

        let root = tempfile::Builder::new()
            .prefix("pptx-unlock-")
            .tempdir()
            .map_err(|e| PackageError::io(format!("无法创建临时目录: {}", e)))?;

        let mut members = Vec::with_capacity(archive.len());
        let mut seen = HashSet::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let name = entry.name().to_string();
            let relative = sanitize_member_path(&name)?;
            let destination = root.path().join(&relative);

            let kind = if entry.is_dir() {
                fs::create_dir_all(&destination).map_err(PackageError::io)?;
                MemberKind::Directory
            } else {
                if let Some(parent) = destination.parent() {
                    fs::create_dir_all(parent).map_err(PackageError::io)?;
                }
                let mut content = Vec::new();
                entry.read_to_end(&mut content).map_err(|e| {
                    PackageError::unreadable(format!("成员 {} 已损坏: {}", name, e))
                })?;
                fs::write(&destination, content).map_err(PackageError::io)?;
                MemberKind::File
            };

            if seen.insert(name.clone()) {
                members.push(PackageMember {
                    name,
                    kind,
                    relative,
                    last_modified: entry.last_modified(),
                });
            }
        }

        debug!(
            "已解包 {} 个成员到 {}",
            members.len(),
            root.path().display()
        );

        Ok(Self {
            root,
            members,
            permissions,
        })
    }

    pub fn members(&self) -> &[PackageMember] {
        &self.members
    }

    /// 文件成员在临时目录中的路径
    pub fn member_path(&self, name: &str) -> Option<PathBuf> {
        self.members
            .iter()
            .find(|member| member.kind == MemberKind::File && member.name == name)
            .map(|member| self.root.path().join(&member.relative))
    }

    /// 重新打包到 `output`
    ///
    /// 先写入输出目录内的临时文件，完成后再替换目标文件。
    pub fn repack(&self, output: &Path) -> PackageResult<()> {
        let parent = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staging = NamedTempFile::new_in(parent).map_err(|e| {
            PackageError::io(format!("无法在 {} 创建临时文件: {}", parent.display(), e))
        })?;

        {
            let mut writer = ZipWriter::new(staging.as_file_mut());
            for member in &self.members {
                let options = FileOptions::default()
                    .compression_method(CompressionMethod::Deflated)
                    .last_modified_time(member.last_modified);

                match member.kind {
                    MemberKind::Directory => {
                        writer.add_directory(member.name.as_str(), options)?;
                    }
                    MemberKind::File => {
                        let content = fs::read(self.root.path().join(&member.relative))
                            .map_err(PackageError::io)?;
                        let options = options.large_file(content.len() as u64 >= u32::MAX as u64);
                        writer.start_file(member.name.as_str(), options)?;
                        writer.write_all(&content).map_err(PackageError::io)?;
                    }
                }
            }
            writer.finish()?;
        }

        // 临时文件默认 0600，改为与输入一致
        #[cfg(unix)]
        if let Some(permissions) = &self.permissions {
            use std::os::unix::fs::PermissionsExt;
            let mode = permissions.mode() & 0o777;
            staging
                .as_file()
                .set_permissions(fs::Permissions::from_mode(mode))
                .map_err(PackageError::io)?;
        }

        staging.persist(output).map_err(|e| {
            PackageError::io(format!("无法写入 {}: {}", output.display(), e.error))
        })?;
        Ok(())
    }
}

/// 拒绝绝对路径和 `..`，防止成员写出临时目录
fn sanitize_member_path(name: &str) -> PackageResult<PathBuf> {
    let path = Path::new(name);
    let mut sanitized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Normal(segment) => sanitized.push(segment),
            Component::CurDir => {}
            _ => {
                return Err(PackageError::unreadable(format!(
                    "成员路径不安全: {}",
                    name
                )))
            }
        }
    }

    if sanitized.as_os_str().is_empty() {
        return Err(PackageError::unreadable(format!("成员路径为空: {:?}", name)));
    }
    Ok(sanitized)
}
