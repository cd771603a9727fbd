// crates/td_coupler/src/disassembler.rs

//! 状态反编组
//!
//! 把（可能已被滤波器分析修改的）集合状态向量写回模型场。
//! 每个被注入的场在注入后立即完成一次边界交换。
//!
//! # 模式语义
//!
//! - 压力模式：状态段直接注入压力场；
//! - 饱和度导出模式：状态段除以缓存的孔隙度恢复饱和度，注入后
//!   调用模型的饱和度→压力转换，再把得到的压力提取出来供报告；
//! - 联合模式：仅第二段（原始压力）注入压力场，饱和度段不回注
//!   （压力为权威量）。
//!
//! 参数段偏移由 [`StateLayout::param_shift`](crate::layout::StateLayout::param_shift)
//! 给出；渗透率按各向异性比广播到 y/z 分量。注入前默认不做 10^x
//! 逆变换（滤波器在对数空间工作），可由配置开启。

use tracing::info;

use crate::error::{CouplerError, CouplerResult};
use crate::lifecycle::EnkfCoupler;
use crate::transfer::{extract_field, inject_field};
use td_config::{ParamUpdateMode, UpdateMode};
use td_model::{FieldKind, SubsurfaceModel};

/// 从状态向量分段填充参数缓冲
///
/// `factor` 为各向异性比；`inverse` 为真时先施加 10^x 再乘比例。
fn fill_param(dst: &mut [f64], src: &[f64], factor: f64, inverse: bool) {
    for (d, &v) in dst.iter_mut().zip(src.iter()) {
        let value = if inverse { 10f64.powf(v) } else { v };
        *d = value * factor;
    }
}

impl<M: SubsurfaceModel> EnkfCoupler<M> {
    /// 把分析后的状态向量写回模型场
    pub fn apply_analysis(&mut self) -> CouplerResult<()> {
        let n = self.layout.subvec_len;

        match self.config.update_mode {
            UpdateMode::Pressure => {
                self.subvec_p.copy_from_slice(&self.state[..n]);
                inject_field(self.model.field_mut(FieldKind::Pressure), &self.subvec_p)?;
                self.model.sync(FieldKind::Pressure)?;
            }
            UpdateMode::Saturation => {
                let poro = self
                    .porosity_cache
                    .as_ref()
                    .ok_or(CouplerError::MissingPorosity)?;
                for (dst, (&sp, &phi)) in self
                    .subvec_sat
                    .iter_mut()
                    .zip(self.state[..n].iter().zip(poro.iter()))
                {
                    *dst = sp / phi;
                }
                inject_field(self.model.field_mut(FieldKind::Saturation), &self.subvec_sat)?;
                self.model.saturation_to_pressure()?;
                // 重建的压力提取出来供报告，随后交换
                extract_field(self.model.field(FieldKind::Pressure), &mut self.subvec_p)?;
                self.model.sync(FieldKind::Pressure)?;
            }
            UpdateMode::PressureSaturation => {
                self.subvec_p.copy_from_slice(&self.state[n..2 * n]);
                inject_field(self.model.field_mut(FieldKind::Pressure), &self.subvec_p)?;
                self.model.sync(FieldKind::Pressure)?;
            }
        }

        match self.config.param_update {
            ParamUpdateMode::None => {}
            ParamUpdateMode::Permeability => {
                let shift = self.layout.param_shift();
                let inv = self.config.param_inverse_transform;
                let src = shift..shift + self.layout.param_segment_len();

                for (kind, factor) in [
                    (FieldKind::PermeabilityX, 1.0),
                    (FieldKind::PermeabilityY, self.config.aniso_perm_y),
                    (FieldKind::PermeabilityZ, self.config.aniso_perm_z),
                ] {
                    fill_param(&mut self.subvec_param, &self.state[src.clone()], factor, inv);
                    inject_field(self.model.field_mut(kind), &self.subvec_param)?;
                    self.model.sync(kind)?;
                }
            }
            ParamUpdateMode::Mannings => {
                let shift = self.layout.param_shift();
                let inv = self.config.param_inverse_transform;
                let src = shift..shift + self.layout.param_segment_len();
                fill_param(&mut self.subvec_param, &self.state[src], 1.0, inv);
                inject_field(self.model.field_mut(FieldKind::Mannings), &self.subvec_param)?;
                self.model.sync(FieldKind::Mannings)?;
            }
        }

        self.analyses.inc();
        info!(update_mode = ?self.config.update_mode, "分析写回完成");
        Ok(())
    }
}
