use anyhow::Result;
use clap::Parser;
use pptx_unlock::cli::Cli;
use pptx_unlock::models::discover_inputs;
use pptx_unlock::utils::logging;
use pptx_unlock::{App, Config};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置，命令行参数优先
    let config = Config::from_env().apply_cli(&cli);

    // 初始化日志
    logging::init(config.verbose_logging);

    // 收集输入文件
    let input_root = cli.resolve_input_root(&config)?;
    let inputs = discover_inputs(&input_root)?;
    if inputs.is_empty() {
        warn!("没有找到需要处理的PPTX/PPT文件。");
        return Ok(());
    }

    // 初始化并运行应用
    let app = App::initialize(config).await?;
    app.run(inputs).await?;

    Ok(())
}
