// crates/td_config/src/domain.rs

//! DomainConfig - 计算域配置
//!
//! 定义全局网格尺寸、物理间距、域原点以及本进程分区的分块方式。
//! 分块仅影响本地子网格枚举路径，不改变状态向量的任何语义。

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 计算域配置（全 f64）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    /// 全局 x 向单元数
    #[serde(default = "default_n")]
    pub nx: usize,
    /// 全局 y 向单元数
    #[serde(default = "default_n")]
    pub ny: usize,
    /// 全局 z 向层数
    #[serde(default = "default_nz")]
    pub nz: usize,

    /// x 向单元尺寸 [m]
    #[serde(default = "default_d")]
    pub dx: f64,
    /// y 向单元尺寸 [m]
    #[serde(default = "default_d")]
    pub dy: f64,
    /// z 向单元尺寸 [m]
    #[serde(default = "default_d")]
    pub dz: f64,

    /// 域原点 [m]
    #[serde(default)]
    pub origin: [f64; 3],

    /// 本地分区 x 向分块数
    #[serde(default = "default_blocks")]
    pub blocks_x: usize,
    /// 本地分区 y 向分块数
    #[serde(default = "default_blocks")]
    pub blocks_y: usize,
}

fn default_n() -> usize {
    4
}
fn default_nz() -> usize {
    2
}
fn default_d() -> f64 {
    1.0
}
fn default_blocks() -> usize {
    1
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            nx: default_n(),
            ny: default_n(),
            nz: default_nz(),
            dx: default_d(),
            dy: default_d(),
            dz: default_d(),
            origin: [0.0; 3],
            blocks_x: default_blocks(),
            blocks_y: default_blocks(),
        }
    }
}

impl DomainConfig {
    /// 全局单元总数
    pub fn n_cells_global(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nx == 0 || self.ny == 0 || self.nz == 0 {
            return Err(ConfigError::invalid(
                "nx/ny/nz",
                format!("{}x{}x{}", self.nx, self.ny, self.nz),
                "网格尺寸必须非零",
            ));
        }
        if self.dx <= 0.0 || self.dy <= 0.0 || self.dz <= 0.0 {
            return Err(ConfigError::invalid(
                "dx/dy/dz",
                format!("{}x{}x{}", self.dx, self.dy, self.dz),
                "单元尺寸必须为正",
            ));
        }
        if self.blocks_x == 0 || self.blocks_x > self.nx {
            return Err(ConfigError::invalid(
                "blocks_x",
                self.blocks_x,
                format!("必须在 [1, {}] 内", self.nx),
            ));
        }
        if self.blocks_y == 0 || self.blocks_y > self.ny {
            return Err(ConfigError::invalid(
                "blocks_y",
                self.blocks_y,
                format!("必须在 [1, {}] 内", self.ny),
            ));
        }
        Ok(())
    }
}
