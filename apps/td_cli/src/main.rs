// apps/td_cli/src/main.rs

//! TerraDA 命令行界面
//!
//! 在合成地下水流模型上驱动集合同化循环的命令行工具。
//!
//! # 架构层级
//!
//! 本模块属于应用层：只使用 `EnkfCoupler<SyntheticModel>` 的
//! 公开接口，错误统一收敛到 `anyhow`，不定义领域类型。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// TerraDA 集合同化耦合工具
#[derive(Parser)]
#[command(name = "td_cli")]
#[command(author = "TerraDA Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "TerraDA ensemble data assimilation coupler", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行同化循环
    Run(commands::run::RunArgs),
    /// 显示布局与系统信息
    Info(commands::info::InfoArgs),
    /// 验证配置
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 执行命令
    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
