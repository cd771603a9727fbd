// crates/td_model/src/model.rs

//! 地下水流模型协作者接口
//!
//! 定义耦合核心对求解器的全部依赖面。求解器的物理（Richards 方程
//! 时间步进、饱和度-压力转换的本构关系）、MPI 初始化和输入卡解析
//! 都在接口背后，不属于耦合核心。
//!
//! # 同步约定
//!
//! `sync` 是分区进程组上的集合阻塞操作。任何被注入或被推进步
//! 修改过的场，在再次被读取之前必须完成一次 `sync`；
//! 这是硬性顺序不变量。`sync` 失败对整个进程组是致命的。

use crate::field::PartitionedField;
use crate::grid::GridPartition;
use td_foundation::TdResult;

/// 模型场标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// 压力场
    Pressure,
    /// 饱和度场
    Saturation,
    /// 孔隙度场
    Porosity,
    /// 密度场
    Density,
    /// x 向渗透率
    PermeabilityX,
    /// y 向渗透率
    PermeabilityY,
    /// z 向渗透率
    PermeabilityZ,
    /// Manning 糙率（地表二维场）
    Mannings,
    /// 驱动通量（陆面蒸散发）
    EvapTrans,
}

impl FieldKind {
    /// 场名（日志与错误信息使用）
    pub fn name(self) -> &'static str {
        match self {
            Self::Pressure => "pressure",
            Self::Saturation => "saturation",
            Self::Porosity => "porosity",
            Self::Density => "density",
            Self::PermeabilityX => "permeability_x",
            Self::PermeabilityY => "permeability_y",
            Self::PermeabilityZ => "permeability_z",
            Self::Mannings => "mannings",
            Self::EvapTrans => "evap_trans",
        }
    }
}

/// 地下水流模型接口
///
/// 耦合核心唯一可见的求解器表面。实现方保证：
/// - 所有场与 `partition()` 的分区几何一致（Mannings 除外，nz = 1）；
/// - `advance` 之后压力/孔隙度/饱和度场为本步输出；
/// - `saturation_to_pressure` 以当前饱和度场重建一致的压力场。
pub trait SubsurfaceModel {
    /// 本进程的网格分区（只读）
    fn partition(&self) -> &GridPartition;

    /// 只读访问场
    fn field(&self, kind: FieldKind) -> &PartitionedField;

    /// 可变访问场
    fn field_mut(&mut self, kind: FieldKind) -> &mut PartitionedField;

    /// 边界交换（集合阻塞操作，失败致命）
    fn sync(&mut self, kind: FieldKind) -> TdResult<()>;

    /// 推进一步：`start_time` 到 `stop_time`，驱动通量取自 EvapTrans 场
    fn advance(&mut self, start_time: f64, stop_time: f64) -> TdResult<()>;

    /// 由当前饱和度场重建压力场（密度与重力由模型内部提供）
    fn saturation_to_pressure(&mut self) -> TdResult<()>;

    /// 重力加速度 [m/s²]
    fn gravity(&self) -> f64;

    /// 诊断用二进制输出
    fn write_binary(&self, prefix: &str, suffix: &str, field: &PartitionedField) -> TdResult<()>;
}
