// apps/td_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示状态向量布局与系统信息，不运行模型。

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use td_coupler::{StateLayout, FILTER_INDEX_BASE};
use td_model::GridPartition;

use super::{load_enkf_config, DomainArgs};

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 同化配置文件路径 (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub domain: DomainArgs,

    /// 显示系统信息
    #[arg(long)]
    pub system: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== TerraDA 信息 ===");

    if args.system {
        print_system_info();
        println!();
    }

    let domain = args.domain.to_domain()?;
    let config = load_enkf_config(args.config.as_deref(), domain.nz)?;

    let partition = GridPartition::regular(&domain);
    let n = partition.local_cell_count();
    let param_len = match config.param_update {
        td_config::ParamUpdateMode::Mannings => partition.surface().local_cell_count(),
        _ => n,
    };
    let layout = StateLayout::new(config.update_mode, config.param_update, n, param_len);

    println!("=== 状态向量布局 ===");
    println!("域: {}×{}×{}", domain.nx, domain.ny, domain.nz);
    println!(
        "分区: {}×{} 子网格, 本地单元 {} 个",
        domain.blocks_x, domain.blocks_y, n
    );
    println!("状态模式: {:?} (标志 {})", config.update_mode, config.update_mode.flag());
    println!(
        "参数模式: {:?} (标志 {})",
        config.param_update,
        config.param_update.flag()
    );
    println!("状态段: {:?}", layout.state_range());
    if let Some(r) = layout.pressure_range() {
        println!("压力段: {r:?}");
    }
    if let Some(r) = layout.param_range() {
        println!("参数段: {r:?} (偏移 {})", layout.param_shift());
    }
    println!("总长: {}", layout.total_len());
    println!("滤波器编号基: {FILTER_INDEX_BASE}");

    Ok(())
}

fn print_system_info() {
    println!("=== 系统信息 ===");
    println!("TerraDA CLI 版本: {}", env!("CARGO_PKG_VERSION"));
    println!("目标平台: {}", std::env::consts::ARCH);
    println!("操作系统: {}", std::env::consts::OS);
}
