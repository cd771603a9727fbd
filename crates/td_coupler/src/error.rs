// crates/td_coupler/src/error.rs

//! 耦合层错误类型
//!
//! 错误分类（与设计文档一致）：
//! - 配置错误：必需键缺失 → 致命，透传 [`td_config::ConfigError`]
//! - 初始化错误：模型/通信层建立失败 → 致命，透传 [`td_foundation::TdError`]
//! - 契约违反：传输缓冲与索引映射大小不符 → 显式前置检查，立即失败
//! - 数值边界：非正参数取对数 → 带类型的数值错误，不传播 NaN
//!
//! 所有错误对拥有进程都是终止性的，本层不存在重试。

use td_config::ConfigError;
use td_foundation::TdError;
use thiserror::Error;

/// 耦合层结果类型
pub type CouplerResult<T> = Result<T, CouplerError>;

/// 耦合层错误
#[derive(Debug, Error)]
pub enum CouplerError {
    /// 缓冲区与场大小不匹配（调用方契约违反，立即失败）
    #[error("缓冲区大小不匹配 ({what}): 期望 {expected}, 实际 {actual}")]
    SizeMismatch {
        /// 哪个缓冲区
        what: &'static str,
        /// 期望长度（本地单元数）
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 参数非正，log10 未定义
    #[error("参数非正，无法取 log10: 字段 {field} 第 {cell} 个单元: {value}")]
    NonPositiveParameter {
        /// 字段名
        field: &'static str,
        /// 缓冲区内单元序号
        cell: usize,
        /// 非正值
        value: f64,
    },

    /// 孔隙度缓存缺失
    ///
    /// 饱和度导出模式的反编组依赖最近一次 assemble 提取的孔隙度；
    /// 该依赖是显式传递的，缺失即错误。
    #[error("孔隙度缓存缺失: 饱和度导出模式必须先 assemble 再 apply_analysis")]
    MissingPorosity,

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 模型/通信层错误
    #[error(transparent)]
    Model(#[from] TdError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch_display() {
        let err = CouplerError::SizeMismatch {
            what: "extract 缓冲",
            expected: 32,
            actual: 16,
        };
        let msg = err.to_string();
        assert!(msg.contains("32"));
        assert!(msg.contains("16"));
    }

    #[test]
    fn test_config_error_from() {
        let err: CouplerError = ConfigError::Missing("dz_scale".to_string()).into();
        assert!(err.to_string().contains("dz_scale"));
    }
}
