use crate::cli::Cli;
use std::path::PathBuf;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 默认输入文件夹
    pub input_folder: PathBuf,
    /// 输出文件夹
    pub output_folder: PathBuf,
    /// 同时处理的文件数量
    pub max_workers: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 运行日志文件，None 表示不写
    pub output_log_file: Option<PathBuf>,
    /// JSON 报告输出路径
    pub report_json: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_folder: PathBuf::from("input"),
            output_folder: PathBuf::from("output"),
            max_workers: default_workers(),
            verbose_logging: false,
            output_log_file: Some(PathBuf::from("convert_log.txt")),
            report_json: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            input_folder: std::env::var("INPUT_FOLDER").map(PathBuf::from).unwrap_or(default.input_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").map(PathBuf::from).unwrap_or(default.output_folder),
            max_workers: std::env::var("MAX_WORKERS").ok().and_then(|v| v.parse().ok()).filter(|&n| n > 0).unwrap_or(default.max_workers),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: match std::env::var("OUTPUT_LOG_FILE") {
                Ok(v) if v.is_empty() => None,
                Ok(v) => Some(PathBuf::from(v)),
                Err(_) => default.output_log_file,
            },
            report_json: std::env::var("REPORT_JSON").ok().filter(|v| !v.is_empty()).map(PathBuf::from).or(default.report_json),
        }
    }

    /// 命令行参数覆盖环境变量
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(output) = &cli.output {
            self.output_folder = output.clone();
        }
        if let Some(workers) = cli.workers {
            self.max_workers = workers.max(1);
        }
        if cli.verbose {
            self.verbose_logging = true;
        }
        if let Some(log_file) = &cli.log_file {
            self.output_log_file = Some(log_file.clone());
        }
        if let Some(json) = &cli.json {
            self.report_json = Some(json.clone());
        }
        self
    }
}

/// 默认并发数：可用的 CPU 数量
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
