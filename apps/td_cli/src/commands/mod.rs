// apps/td_cli/src/commands/mod.rs

//! 子命令实现
//!
//! 三个子命令共享同一组域几何参数与配置加载逻辑。

pub mod info;
pub mod run;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use td_config::{DomainConfig, EnkfConfig};

/// 域几何参数（简化模式：无配置文件时直接从命令行构建）
#[derive(Args)]
pub struct DomainArgs {
    /// 全局 x 方向单元数
    #[arg(long, default_value = "20")]
    pub nx: usize,

    /// 全局 y 方向单元数
    #[arg(long, default_value = "20")]
    pub ny: usize,

    /// 全局 z 方向层数
    #[arg(long, default_value = "8")]
    pub nz: usize,

    /// x 方向子网格块数
    #[arg(long, default_value = "1")]
    pub blocks_x: usize,

    /// y 方向子网格块数
    #[arg(long, default_value = "1")]
    pub blocks_y: usize,
}

impl DomainArgs {
    /// 构建并校验域配置
    pub fn to_domain(&self) -> Result<DomainConfig> {
        let domain = DomainConfig {
            nx: self.nx,
            ny: self.ny,
            nz: self.nz,
            blocks_x: self.blocks_x,
            blocks_y: self.blocks_y,
            ..Default::default()
        };
        domain.validate().context("域配置无效")?;
        Ok(domain)
    }
}

/// 加载同化配置；无配置文件时使用默认值并补齐层厚表
pub fn load_enkf_config(path: Option<&Path>, nz: usize) -> Result<EnkfConfig> {
    match path {
        Some(p) => EnkfConfig::from_json_file(p)
            .with_context(|| format!("读取配置 {} 失败", p.display())),
        None => Ok(EnkfConfig {
            dz_scale: vec![1.0; nz],
            ..Default::default()
        }),
    }
}
