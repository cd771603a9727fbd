// crates/td_model/src/lib.rs

//! TerraDA Model Layer
//!
//! 模型接缝层：定义地下水流求解器在耦合侧暴露的全部表面。
//! 求解器本身（Richards 方程数值、时间步进、MPI 初始化）是外部协作者，
//! 本层只定义其网格分区、分区场存储与访问接口。
//!
//! # 模块概览
//!
//! - [`grid`]: 全局网格与本地子网格分区
//! - [`field`]: 带 ghost 环的分区场存储
//! - [`model`]: [`SubsurfaceModel`] 协作者接口
//! - [`synthetic`]: 内存参考模型（CLI 演示与测试使用）
//!
//! # 所有权约定
//!
//! 网格分区与所有场归模型所有；耦合核心只读分区，
//! 通过接口读写场并在每次写入后立即请求边界交换。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod field;
pub mod grid;
pub mod model;
pub mod synthetic;

pub use field::{PartitionedField, Subvector};
pub use grid::{GlobalGrid, GridPartition, Subgrid};
pub use model::{FieldKind, SubsurfaceModel};
pub use synthetic::SyntheticModel;
