use crate::config::Config;
use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

/// 将只读 PPTX/PPT 文件转换为可编辑的 PPTX 文件。
#[derive(Parser, Debug)]
#[command(name = "pptx_unlock")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// 输入的PPTX/PPT文件或文件夹路径
    pub path: Option<PathBuf>,

    /// 输出文件夹（默认 output）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 同时处理的文件数量（默认 CPU 数量）
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// 显示详细日志
    #[arg(short, long)]
    pub verbose: bool,

    /// 运行日志文件
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// 额外写出 JSON 格式的处理报告
    #[arg(long)]
    pub json: Option<PathBuf>,
}

impl Cli {
    /// 确定扫描起点
    ///
    /// 显式给出的路径优先，其次是配置中的默认输入文件夹。
    pub fn resolve_input_root(&self, config: &Config) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        if config.input_folder.is_dir() {
            return Ok(config.input_folder.clone());
        }
        bail!(
            "当前目录下不存在 '{}' 文件夹，且未提供输入路径。请指定输入文件或文件夹路径。",
            config.input_folder.display()
        )
    }
}
