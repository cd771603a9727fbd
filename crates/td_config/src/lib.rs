// crates/td_config/src/lib.rs

//! TerraDA Config Layer
//!
//! 配置层，提供同化模式选择和计算域配置。
//!
//! # 模块概览
//!
//! - [`enkf_config`]: EnkfConfig 同化配置（更新模式、参数模式、各向异性比）
//! - [`domain`]: DomainConfig 计算域配置（全局网格、间距、分块）
//! - [`error`]: 配置错误类型
//!
//! # 设计原则
//!
//! 1. **一次读取**: 所有配置在初始化时读取一次，运行期间不可变
//! 2. **全 f64 配置**: 所有数值使用 f64 存储以便 JSON 序列化
//! 3. **缺失即致命**: 必需键缺失返回 `ConfigError`，调用方直接退出

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod enkf_config;
pub mod error;

pub use domain::DomainConfig;
pub use enkf_config::{EnkfConfig, ParamUpdateMode, UpdateMode};
pub use error::ConfigError;
