//! # 持仓同步服务
//!
//! 加载配置，初始化日志，构建服务容器后按固定间隔执行同步周期。
//! 收到退出信号或达到指定周期数后关闭应用。

use anyhow::Context;
use clap::Parser;
use infrastructure_composition::{init_logging, AppSettings, Application};
use std::path::PathBuf;
use tracing::{error, info};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Delta Works 持仓同步服务")]
struct Args {
    /// 配置文件路径，未指定时尝试 config/delta.*
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别，覆盖配置文件
    #[arg(long)]
    log_level: Option<String>,

    /// 执行指定数量的周期后退出
    #[arg(long)]
    cycles: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings =
        AppSettings::load(args.config.as_deref()).context("加载配置失败")?;
    if let Some(level) = args.log_level {
        settings.logging.level = level;
    }
    init_logging(&settings.logging).context("初始化日志失败")?;

    info!("启动 Delta Works 持仓同步服务");

    let interval = settings.sync.interval();
    let app = Application::bootstrap(settings).context("构建应用失败")?;
    app.start().await.context("启动应用失败")?;

    let mut ticker = tokio::time::interval(interval);
    let mut attempted = 0u64;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                attempted += 1;
                match app.run_sync_cycle().await {
                    Ok(summary) if !summary.is_success() => {
                        error!("同步周期部分失败: {:?}", summary.failures);
                    }
                    Ok(_) => {}
                    Err(e) => error!("同步周期失败: {}", e),
                }

                if args.cycles.is_some_and(|limit| attempted >= limit) {
                    info!("已执行 {} 个周期, 成功 {}", attempted, app.completed_cycles());
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("收到退出信号，正在关闭应用");
                break;
            }
        }
    }

    app.shutdown().await.context("关闭应用失败")?;
    info!("应用已关闭");
    Ok(())
}
