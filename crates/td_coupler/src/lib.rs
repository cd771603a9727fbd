// crates/td_coupler/src/lib.rs

//! TerraDA Coupler Core
//!
//! 集合同化耦合核心：在分布式地下水流模型的空间分区网格状态
//! 与滤波器的扁平集合状态向量之间做双向编组。
//!
//! # 模块概览
//!
//! - [`layout`]: 状态向量分段布局（两个模式标志的纯函数）
//! - [`index_map`]: 本地缓冲位置 → 全局模型编号的索引映射与坐标数组
//! - [`transfer`]: 场 ↔ 扁平缓冲的双向拷贝
//! - [`assembler`]: 推进一步并提取输出到状态向量
//! - [`disassembler`]: 将分析后的状态向量写回模型场
//! - [`lifecycle`]: [`EnkfCoupler`] 上下文与初始化/终结顺序
//! - [`error`]: 耦合层错误类型
//!
//! # 正确性约定
//!
//! 每进程单线程；进程间不共享状态向量。正确性完全依赖所有传输
//! 例程使用与索引映射一致的 (z, y, x) 枚举顺序，使状态向量第 i 个
//! 分量在所有进程上指同一个物理单元。任何注入后的场在再次读取前
//! 必须完成一次边界交换。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assembler;
pub mod disassembler;
pub mod error;
pub mod index_map;
pub mod layout;
pub mod lifecycle;
pub mod transfer;

pub use error::{CouplerError, CouplerResult};
pub use index_map::{Coordinates, IndexMap, FILTER_INDEX_BASE};
pub use layout::StateLayout;
pub use lifecycle::EnkfCoupler;
pub use transfer::{extract_field, inject_field};
