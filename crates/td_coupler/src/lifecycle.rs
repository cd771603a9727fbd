// crates/td_coupler/src/lifecycle.rs

//! 生命周期控制
//!
//! [`EnkfCoupler`] 是耦合核心的显式上下文对象：模型句柄、布局、
//! 索引映射、状态向量与全部暂存缓冲都在这里，没有进程级全局状态。
//!
//! # 顺序
//!
//! 1. `initialize`: 校验配置 → 预热推进（取得有效压力场）→
//!    构建索引映射 → 按布局分配状态向量与暂存缓冲；
//! 2. 每个同化循环: [`assemble`](EnkfCoupler::assemble) →
//!    外部滤波器读写状态向量 →
//!    [`apply_analysis`](EnkfCoupler::apply_analysis)；
//! 3. `finalize`: 输出循环统计与计时并释放资源。
//!
//! 初始化失败对进程是致命的（CLI 以退出码 1 退出），没有重试。

use std::time::Instant;

use tracing::info;

use crate::error::CouplerResult;
use crate::index_map::{Coordinates, IndexMap};
use crate::layout::StateLayout;
use crate::transfer::inject_field;
use td_config::{EnkfConfig, ParamUpdateMode};
use td_foundation::Counter;
use td_model::{FieldKind, PartitionedField, SubsurfaceModel};

/// 集合同化耦合上下文
///
/// 拥有状态向量与全部暂存缓冲；滤波器只在 `assemble` 与
/// `apply_analysis` 之间通过 [`state`](Self::state) /
/// [`state_mut`](Self::state_mut) 访问状态向量。
pub struct EnkfCoupler<M: SubsurfaceModel> {
    pub(crate) model: M,
    pub(crate) config: EnkfConfig,
    pub(crate) layout: StateLayout,
    pub(crate) index_map: IndexMap,
    /// 集合状态向量（运行期间长度不变）
    pub(crate) state: Vec<f64>,
    /// 压力暂存缓冲
    pub(crate) subvec_p: Vec<f64>,
    /// 饱和度暂存缓冲
    pub(crate) subvec_sat: Vec<f64>,
    /// 参数暂存缓冲（长度为参数段长）
    pub(crate) subvec_param: Vec<f64>,
    /// 最近一次 assemble 提取的孔隙度（显式前传给反编组）
    pub(crate) porosity_cache: Option<Vec<f64>>,
    /// 诊断输出用的暂存场
    scratch: PartitionedField,
    pub(crate) assembles: Counter,
    pub(crate) analyses: Counter,
    started: Instant,
}

impl<M: SubsurfaceModel> EnkfCoupler<M> {
    /// 初始化：预热推进一步后构建索引映射与状态向量
    ///
    /// 任何失败都是致命的；调用方应终止进程（退出码 1）。
    pub fn initialize(mut model: M, config: EnkfConfig) -> CouplerResult<Self> {
        let started = Instant::now();
        let nz_glob = model.partition().global.nz;
        config.validate(nz_glob)?;

        // 预热推进：先交换驱动通量，再伪推进一步取得有效压力场
        model.sync(FieldKind::EvapTrans)?;
        model.advance(0.0, config.warmup_dt)?;
        model.sync(FieldKind::Pressure)?;

        let partition = model.partition();
        let index_map = IndexMap::build(partition, &config.dz_scale)?;
        let subvec_len = partition.local_cell_count();
        let param_len = match config.param_update {
            ParamUpdateMode::Mannings => model.field(FieldKind::Mannings).n_interior(),
            _ => subvec_len,
        };
        let layout = StateLayout::new(config.update_mode, config.param_update, subvec_len, param_len);
        let scratch = PartitionedField::new(model.partition(), 1);

        info!(
            update_mode = ?config.update_mode,
            param_update = ?config.param_update,
            subvec_len,
            total_len = layout.total_len(),
            "耦合器初始化完成"
        );

        Ok(Self {
            state: vec![0.0; layout.total_len()],
            subvec_p: vec![0.0; subvec_len],
            subvec_sat: vec![0.0; subvec_len],
            subvec_param: vec![0.0; layout.param_segment_len()],
            porosity_cache: None,
            scratch,
            model,
            config,
            layout,
            index_map,
            assembles: Counter::new(),
            analyses: Counter::new(),
            started,
        })
    }

    // ============================================================
    // 滤波器驱动侧接口
    // ============================================================

    /// 本地单元数（每个状态段的长度）
    pub fn local_cell_count(&self) -> usize {
        self.layout.subvec_len
    }

    /// 状态向量总长度
    pub fn total_state_len(&self) -> usize {
        self.layout.total_len()
    }

    /// 状态向量布局
    pub fn layout(&self) -> &StateLayout {
        &self.layout
    }

    /// 索引映射
    pub fn index_map(&self) -> &IndexMap {
        &self.index_map
    }

    /// 坐标数组（与索引映射同序）
    pub fn coordinates(&self) -> &Coordinates {
        self.index_map.coordinates()
    }

    /// 只读访问状态向量
    pub fn state(&self) -> &[f64] {
        &self.state
    }

    /// 可变访问状态向量（滤波器分析步写入处）
    pub fn state_mut(&mut self) -> &mut [f64] {
        &mut self.state
    }

    /// 只读访问模型
    pub fn model(&self) -> &M {
        &self.model
    }

    /// 可变访问模型（驱动方在循环间设置驱动通量等强迫项）
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// 饱和度导出模式下最近一次反编组得到的压力（报告用）
    pub fn analyzed_pressure(&self) -> &[f64] {
        &self.subvec_p
    }

    // ============================================================
    // 诊断输出
    // ============================================================

    /// 将任意子向量写入诊断二进制文件
    ///
    /// 先注入暂存场再交给模型的二进制输出；暂存场不参与任何计算，
    /// 无需边界交换。
    pub fn print_subvector(&mut self, prefix: &str, suffix: &str, data: &[f64]) -> CouplerResult<()> {
        inject_field(&mut self.scratch, data)?;
        self.model.write_binary(prefix, suffix, &self.scratch)?;
        Ok(())
    }

    /// 将当前 Manning 糙率场写入诊断二进制文件
    pub fn print_mannings(&self, prefix: &str, suffix: &str) -> CouplerResult<()> {
        self.model
            .write_binary(prefix, suffix, self.model.field(FieldKind::Mannings))?;
        Ok(())
    }

    /// 终结：输出循环统计与计时，随后释放全部缓冲与模型句柄
    pub fn finalize(self) {
        info!(
            assembles = self.assembles.get(),
            analyses = self.analyses.get(),
            elapsed_s = self.started.elapsed().as_secs_f64(),
            "耦合器终结"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use td_config::{DomainConfig, UpdateMode};
    use td_model::SyntheticModel;

    fn config() -> EnkfConfig {
        EnkfConfig {
            dz_scale: vec![1.0, 1.0],
            ..Default::default()
        }
    }

    fn domain() -> DomainConfig {
        DomainConfig {
            nx: 4,
            ny: 4,
            nz: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_initialize_builds_map_after_warmup() {
        let model = SyntheticModel::build(&domain()).unwrap();
        let coupler = EnkfCoupler::initialize(model, config()).unwrap();
        assert_eq!(coupler.local_cell_count(), 32);
        assert_eq!(coupler.total_state_len(), 32);
        assert_eq!(coupler.index_map().len(), 32);
        // 预热推进发生在索引映射构建之前
        assert_eq!(coupler.model().n_advances(), 1);
        coupler.finalize();
    }

    #[test]
    fn test_initialize_rejects_bad_config() {
        let model = SyntheticModel::build(&domain()).unwrap();
        let bad = EnkfConfig::default(); // 缺 dz_scale
        assert!(EnkfCoupler::initialize(model, bad).is_err());
    }

    #[test]
    fn test_mannings_param_len_from_surface_field() {
        let model = SyntheticModel::build(&domain()).unwrap();
        let cfg = EnkfConfig {
            update_mode: UpdateMode::Pressure,
            param_update: ParamUpdateMode::Mannings,
            dz_scale: vec![1.0, 1.0],
            ..Default::default()
        };
        let coupler = EnkfCoupler::initialize(model, cfg).unwrap();
        // 32 状态 + 16 地表参数
        assert_eq!(coupler.total_state_len(), 48);
        assert_eq!(coupler.layout().param_shift(), 32);
    }
}
