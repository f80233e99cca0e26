//! # 失物招领服务主程序
//!
//! 加载配置、初始化数据库后启动 HTTP 服务

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use lost_found::{
    Result,
    api::ApiServer,
    api::handlers::system,
    app::AppContext,
    config::{CONFIG_PATH_ENV, ConfigManager},
    database, lerror, linfo,
    logging::{self, LogComponent, LogStage},
};

/// 命令行参数
#[derive(Debug, Parser)]
#[command(name = "lost-found", version, about = "Campus lost & found registry service")]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 只执行数据库迁移后退出
    #[arg(long)]
    migrate_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(Some(&cli.log_level));
    system::init_start_time();

    if let Err(e) = run(cli).await {
        lerror!(
            "system",
            LogStage::Startup,
            LogComponent::Main,
            "service_start_failed",
            "服务启动失败",
            error = format!("{e:?}")
        );
        return Err(e);
    }

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Main,
        "service_shutdown",
        "服务正常关闭"
    );
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let manager = ConfigManager::load(cli.config.as_deref())?;
    let config = manager.config();
    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Config,
        "config_source",
        "配置来源",
        source = manager
            .source()
            .map_or_else(|| "defaults".to_string(), |path| path.display().to_string())
    );

    let db = database::init_database(&config.database).await?;
    database::run_migrations(&db).await?;

    if cli.migrate_only {
        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::Database,
            "migrate_only_done",
            "数据库迁移完成，退出"
        );
        return Ok(());
    }

    database::ensure_bootstrap_admin(&db, &config.auth).await?;

    let context = Arc::new(AppContext::new(config, db));
    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Main,
        "service_starting",
        "服务启动",
        listen = context.config.server.listen_addr()
    );
    ApiServer::new(context).serve().await
}
