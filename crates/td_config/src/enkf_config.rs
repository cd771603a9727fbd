// crates/td_config/src/enkf_config.rs

//! EnkfConfig - 同化配置
//!
//! 定义集合同化耦合所需的全部配置：状态更新模式、参数更新模式、
//! 渗透率各向异性比、垂向分层缩放表。所有配置在初始化时读取一次，
//! 运行期间不可重配置。
//!
//! # 模式语义
//!
//! 两个模式标志相互独立，共同决定集合状态向量的分段布局：
//!
//! ```text
//! update_mode = pressure              [ p(n) ]
//! update_mode = saturation            [ s*phi(n) ]
//! update_mode = pressure-saturation   [ s*phi(n) | p(n) ]
//! param_update = permeability         末尾追加 [ log10(Kx)(n) ]
//! param_update = mannings             末尾追加 [ log10(mann)(m) ]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use td_foundation::validation::{ValidationError, ValidationReport, ValidationWarning};

// ============================================================
// 更新模式
// ============================================================

/// 状态更新模式
///
/// 决定状态向量的状态段内容。历史输入卡中以整数标志 1/2/3 表示，
/// 通过 [`UpdateMode::try_from`] 兼容。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateMode {
    /// 仅压力：状态段为原始压力值
    #[default]
    Pressure,
    /// 饱和度导出：状态段为 饱和度×孔隙度
    Saturation,
    /// 压力+饱和度联合：两个状态段拼接
    PressureSaturation,
}

impl UpdateMode {
    /// 历史整数标志（输入卡兼容）
    pub fn flag(self) -> u8 {
        match self {
            Self::Pressure => 1,
            Self::Saturation => 2,
            Self::PressureSaturation => 3,
        }
    }

    /// 状态段数量
    pub fn n_state_segments(self) -> usize {
        match self {
            Self::Pressure | Self::Saturation => 1,
            Self::PressureSaturation => 2,
        }
    }
}

impl TryFrom<u8> for UpdateMode {
    type Error = ConfigError;

    fn try_from(flag: u8) -> Result<Self, Self::Error> {
        match flag {
            1 => Ok(Self::Pressure),
            2 => Ok(Self::Saturation),
            3 => Ok(Self::PressureSaturation),
            other => Err(ConfigError::invalid(
                "update_mode",
                other,
                "合法标志为 1/2/3",
            )),
        }
    }
}

/// 参数更新模式
///
/// 决定状态向量末尾是否追加参数段。历史整数标志为 0/1/2。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParamUpdateMode {
    /// 不更新参数
    #[default]
    None,
    /// 更新 x 向渗透率（y/z 向按各向异性比派生）
    Permeability,
    /// 更新 Manning 糙率（地表二维场）
    Mannings,
}

impl ParamUpdateMode {
    /// 历史整数标志（输入卡兼容）
    pub fn flag(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Permeability => 1,
            Self::Mannings => 2,
        }
    }

    /// 是否需要参数段
    pub fn is_active(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl TryFrom<u8> for ParamUpdateMode {
    type Error = ConfigError;

    fn try_from(flag: u8) -> Result<Self, Self::Error> {
        match flag {
            0 => Ok(Self::None),
            1 => Ok(Self::Permeability),
            2 => Ok(Self::Mannings),
            other => Err(ConfigError::invalid(
                "param_update",
                other,
                "合法标志为 0/1/2",
            )),
        }
    }
}

// ============================================================
// 同化配置
// ============================================================

/// 集合同化配置
///
/// 所有字段一次读取、运行期间不可变。`dz_scale` 为必需项：
/// 缺失或长度与全局 nz 不符视为致命配置错误。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnkfConfig {
    /// 状态更新模式
    #[serde(default)]
    pub update_mode: UpdateMode,

    /// 参数更新模式
    #[serde(default)]
    pub param_update: ParamUpdateMode,

    /// y 向渗透率各向异性比 Ky = aniso_perm_y * Kx
    #[serde(default = "default_aniso")]
    pub aniso_perm_y: f64,

    /// z 向渗透率各向异性比 Kz = aniso_perm_z * Kx
    #[serde(default = "default_aniso")]
    pub aniso_perm_z: f64,

    /// 注入分析参数前是否施加 10^x 逆变换
    ///
    /// 提取时参数取 log10 进入状态向量；历史行为是注入时不做逆变换
    /// （滤波器在对数空间工作，模型直接消费对数渗透率）。
    /// 置 true 则注入前施加 10^x。
    #[serde(default)]
    pub param_inverse_transform: bool,

    /// 垂向分层缩放表，每个 z 层一个缩放值
    ///
    /// 对应输入卡 `dzScale.nzListNumber` + `Cell.{k}.dzScale.Value`；
    /// 必需项，长度必须等于全局 nz。
    #[serde(default)]
    pub dz_scale: Vec<f64>,

    /// 预热推进步长 [h]
    ///
    /// 初始化时执行一次伪推进以获得有效压力场，之后才构建索引映射。
    #[serde(default = "default_warmup_dt")]
    pub warmup_dt: f64,
}

fn default_aniso() -> f64 {
    1.0
}
fn default_warmup_dt() -> f64 {
    1.0
}

impl Default for EnkfConfig {
    fn default() -> Self {
        Self {
            update_mode: UpdateMode::default(),
            param_update: ParamUpdateMode::default(),
            aniso_perm_y: default_aniso(),
            aniso_perm_z: default_aniso(),
            param_inverse_transform: false,
            dz_scale: Vec::new(),
            warmup_dt: default_warmup_dt(),
        }
    }
}

impl EnkfConfig {
    /// 从 JSON 文件读取
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// 针对全局 nz 校验配置，任何错误都是致命的
    pub fn validate(&self, nz_glob: usize) -> Result<(), ConfigError> {
        if self.dz_scale.is_empty() {
            return Err(ConfigError::Missing(
                "dz_scale (dzScale.nzListNumber)".to_string(),
            ));
        }
        if self.dz_scale.len() != nz_glob {
            return Err(ConfigError::invalid(
                "dz_scale",
                self.dz_scale.len(),
                format!("长度必须等于全局 nz = {nz_glob}"),
            ));
        }
        if self.aniso_perm_y <= 0.0 {
            return Err(ConfigError::invalid(
                "aniso_perm_y",
                self.aniso_perm_y,
                "必须为正",
            ));
        }
        if self.aniso_perm_z <= 0.0 {
            return Err(ConfigError::invalid(
                "aniso_perm_z",
                self.aniso_perm_z,
                "必须为正",
            ));
        }
        if self.warmup_dt <= 0.0 {
            return Err(ConfigError::invalid("warmup_dt", self.warmup_dt, "必须为正"));
        }
        Ok(())
    }

    /// 生成验证报告（CLI validate 命令使用，不短路）
    pub fn validation_report(&self, nz_glob: usize) -> ValidationReport {
        let mut report = ValidationReport::new();

        if self.dz_scale.is_empty() {
            report.add_error(ValidationError::MissingKey { key: "dz_scale" });
        } else if self.dz_scale.len() != nz_glob {
            report.add_error(ValidationError::LengthMismatch {
                field: "dz_scale",
                expected: nz_glob,
                actual: self.dz_scale.len(),
            });
        }
        for (field, value) in [
            ("aniso_perm_y", self.aniso_perm_y),
            ("aniso_perm_z", self.aniso_perm_z),
        ] {
            if value <= 0.0 {
                report.add_error(ValidationError::OutOfRange {
                    field,
                    value,
                    min: f64::MIN_POSITIVE,
                    max: f64::MAX,
                });
            }
        }
        if self.param_update == ParamUpdateMode::Permeability
            && (self.aniso_perm_y == 1.0 && self.aniso_perm_z == 1.0)
        {
            report.add_warning(ValidationWarning::DefaultUsed {
                field: "aniso_perm_y/z",
                value: "1.0 (各向同性)".to_string(),
            });
        }
        if self.param_inverse_transform {
            report.add_warning(ValidationWarning::Suspicious {
                field: "param_inverse_transform",
                message: "注入前施加 10^x，偏离历史行为".to_string(),
            });
        }
        report
    }
}
