// crates/td_foundation/src/lib.rs

//! TerraDA Foundation Layer
//!
//! 零依赖基础层，提供整个项目的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `TdError` / `TdResult`
//! - [`validation`]: 运行时验证报告
//! - [`metrics`]: 无锁原子计数器
//!
//! # 设计原则
//!
//! 1. **零外部依赖**: 仅依赖 serde 和 thiserror
//! 2. **层次化错误**: 基础层只定义核心错误，耦合器相关错误在 td_coupler 中扩展
//! 3. **失败即终止**: 本项目的所有错误对拥有进程都是终止性的，不做重试

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod metrics;
pub mod validation;

pub use error::{TdError, TdResult};
pub use metrics::Counter;
pub use validation::{ValidationError, ValidationReport, ValidationWarning};
