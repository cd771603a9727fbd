// crates/td_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `TdError` 枚举和 `TdResult` 类型别名，用于整个项目的错误处理。
//!
//! # 设计原则
//!
//! 1. **层次化**: 基础层只定义核心错误，耦合相关错误在 td_coupler 中定义
//! 2. **无重试**: 本项目中所有错误都是终止性的，错误类型不携带重试语义
//! 3. **可追溯**: IO 错误保留底层 source
//!
//! # 示例
//!
//! ```
//! use td_foundation::error::{TdError, TdResult};
//!
//! fn read_table() -> TdResult<()> {
//!     Err(TdError::config("缺少 dz_scale 表"))
//! }
//! ```

use thiserror::Error;

/// 统一结果类型
pub type TdResult<T> = Result<T, TdError>;

/// TerraDA 错误类型
///
/// 核心错误类型，用于整个项目。耦合器相关的错误在 `td_coupler` 中扩展。
#[derive(Error, Debug)]
pub enum TdError {
    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 配置错误（缺少键、非法值）
    #[error("配置错误: {0}")]
    Config(String),

    /// 模型初始化失败
    ///
    /// 对应进程退出码 1，调用方不应尝试恢复。
    #[error("模型初始化失败: {0}")]
    ModelInit(String),

    /// 进程组集合通信失败（ghost/halo 交换）
    ///
    /// 集合操作失败对整个分区进程组是致命的。
    #[error("边界交换失败: 字段 {field}: {message}")]
    Communication {
        /// 交换失败的字段名
        field: String,
        /// 失败原因
        message: String,
    },

    /// 数值错误（NaN、非正参数取对数等）
    #[error("数值错误: {0}")]
    Numeric(String),

    /// 无效输入
    #[error("无效的输入数据: {0}")]
    InvalidInput(String),
}

impl TdError {
    /// 创建 IO 错误
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 创建配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// 创建边界交换错误
    pub fn communication(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Communication {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 创建数值错误
    pub fn numeric(message: impl Into<String>) -> Self {
        Self::Numeric(message.into())
    }

    /// 是否为终止性错误
    ///
    /// 本项目中所有错误都是终止性的；保留此方法以表达语义。
    pub fn is_fatal(&self) -> bool {
        true
    }
}

impl From<std::io::Error> for TdError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}
