//! # resource-health 命令行
//!
//! 健康状态管理入口：汇总、列表、问题资源、手动启用/禁用与数据库迁移。结果以 JSON 输出到 stdout。

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use resource_health::{
    app::AppContext,
    config::{self, AppConfig},
    database, lerror, linfo,
    health::ResourceType,
    logging::{self, LogComponent, LogStage},
};

#[derive(Debug, Parser)]
#[command(name = "resource-health", version, about = "资源健康状态管理工具")]
struct Cli {
    /// 配置文件路径（默认读取 RESOURCE_HEALTH_CONFIG 或 config/config.{RUST_ENV}.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 各资源类型的健康汇总
    Summary,
    /// 某类资源的健康列表
    List {
        /// platform | api_key | model
        resource_type: ResourceType,
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long)]
        page_size: Option<u64>,
    },
    /// 当前不可用的资源
    Issues,
    /// 清除健康记录，交由路由引擎重新评估
    Enable { resource_type: ResourceType, id: i32 },
    /// 手动标记为不可用
    Disable { resource_type: ResourceType, id: i32 },
    /// 仅运行数据库迁移
    Migrate,
}

#[derive(Serialize)]
struct Acknowledged {
    resource_type: ResourceType,
    resource_id: i32,
    action: &'static str,
}

#[derive(Serialize)]
struct MigrationReport {
    pending_after: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config()?,
    };
    logging::init_logging(Some(&config.logging.level));

    if let Err(e) = run(cli.command, config).await {
        lerror!(
            "system",
            LogStage::Shutdown,
            LogComponent::Main,
            "command_failed",
            "命令执行失败",
            error = %e
        );
        return Err(e);
    }
    Ok(())
}

async fn run(command: Command, config: AppConfig) -> anyhow::Result<()> {
    if matches!(command, Command::Migrate) {
        let db = database::init_database(&config.database).await?;
        database::run_migrations(&db).await?;
        let pending_after = database::check_database_status(&db).await?;
        return print_json(&MigrationReport { pending_after });
    }

    let context = AppContext::bootstrap(config).await?;
    let service = &context.health_service;

    match command {
        Command::Summary => print_json(&service.get_health_summary().await?),
        Command::List {
            resource_type,
            page,
            page_size,
        } => print_json(&service.list_by_type(resource_type, page, page_size).await?),
        Command::Issues => print_json(&service.get_issues().await?),
        Command::Enable { resource_type, id } => {
            service.enable_health(resource_type, id).await?;
            print_json(&Acknowledged {
                resource_type,
                resource_id: id,
                action: "enabled",
            })
        }
        Command::Disable { resource_type, id } => {
            print_json(&service.disable_health(resource_type, id).await?)
        }
        Command::Migrate => Ok(()),
    }?;

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Main,
        "command_done",
        "命令执行完成"
    );
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
