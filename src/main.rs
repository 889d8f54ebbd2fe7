use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use textract_queries::utils::logging;
use textract_queries::{App, Config};
use tokio::sync::watch;
use tracing::{info, warn};

/// 批量文档问答分析
#[derive(Parser)]
#[command(name = "textract-queries", version)]
struct Cli {
    /// TOML 配置文件路径
    #[arg(short, long, env = "TEXTRACT_QUERIES_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// 提交文档并轮询，写出单文档结果
    Analyze,
    /// 汇总已有的结果文件（默认）
    Summarize,
    /// 先分析再汇总
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(cli.config.as_deref())?;

    // 初始化日志
    logging::init(config.verbose_logging);

    let app = App::new(config);

    // Ctrl-C 时通知所有轮询任务退出
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⚠️ 收到中断信号，停止轮询...");
            let _ = cancel_tx.send(true);
        }
    });

    match cli.command.unwrap_or(Command::Summarize) {
        Command::Analyze => {
            app.analyze(cancel_rx).await?;
        }
        Command::Summarize => {
            app.summarize().await?;
        }
        Command::All => {
            app.run_all(cancel_rx).await?;
        }
    }

    info!("Done");
    Ok(())
}
