// crates/td_coupler/src/assembler.rs

//! 状态编组
//!
//! 推进模型一步并按活动模式把输出提取进集合状态向量。
//!
//! # 顺序不变量
//!
//! 推进前交换驱动通量；推进后对每个产出场（压力、孔隙度、饱和度）
//! 各交换一次，之后才提取。参数段的源场在提取前同样交换。
//!
//! # 数值边界
//!
//! 参数段进入状态向量前取 log10；非正参数值返回
//! [`CouplerError::NonPositiveParameter`]，不允许 NaN 进入集合。

use tracing::info;

use crate::error::{CouplerError, CouplerResult};
use crate::lifecycle::EnkfCoupler;
use crate::transfer::extract_field;
use td_config::{ParamUpdateMode, UpdateMode};
use td_model::{FieldKind, SubsurfaceModel};

impl<M: SubsurfaceModel> EnkfCoupler<M> {
    /// 推进一步并编组状态向量
    ///
    /// `current_time` 到 `current_time + dt`。完成后状态向量可交给
    /// 外部滤波器分析。
    pub fn assemble(&mut self, current_time: f64, dt: f64) -> CouplerResult<()> {
        let stop_time = current_time + dt;

        self.model.sync(FieldKind::EvapTrans)?;
        self.model.advance(current_time, stop_time)?;
        self.model.sync(FieldKind::Pressure)?;
        self.model.sync(FieldKind::Porosity)?;
        self.model.sync(FieldKind::Saturation)?;

        let n = self.layout.subvec_len;
        match self.config.update_mode {
            UpdateMode::Pressure => {
                extract_field(self.model.field(FieldKind::Pressure), &mut self.subvec_p)?;
                self.state[..n].copy_from_slice(&self.subvec_p);
            }
            UpdateMode::Saturation => {
                extract_field(self.model.field(FieldKind::Saturation), &mut self.subvec_sat)?;
                let mut poro = self
                    .porosity_cache
                    .take()
                    .unwrap_or_else(|| vec![0.0; n]);
                extract_field(self.model.field(FieldKind::Porosity), &mut poro)?;
                for (dst, (&s, &phi)) in self.state[..n]
                    .iter_mut()
                    .zip(self.subvec_sat.iter().zip(poro.iter()))
                {
                    *dst = s * phi;
                }
                self.porosity_cache = Some(poro);
            }
            UpdateMode::PressureSaturation => {
                extract_field(self.model.field(FieldKind::Pressure), &mut self.subvec_p)?;
                extract_field(self.model.field(FieldKind::Saturation), &mut self.subvec_sat)?;
                let mut poro = self
                    .porosity_cache
                    .take()
                    .unwrap_or_else(|| vec![0.0; n]);
                extract_field(self.model.field(FieldKind::Porosity), &mut poro)?;
                for (dst, (&s, &phi)) in self.state[..n]
                    .iter_mut()
                    .zip(self.subvec_sat.iter().zip(poro.iter()))
                {
                    *dst = s * phi;
                }
                // 第二段为原始压力，不乘孔隙度
                self.state[n..2 * n].copy_from_slice(&self.subvec_p);
                self.porosity_cache = Some(poro);
            }
        }

        match self.config.param_update {
            ParamUpdateMode::None => {}
            ParamUpdateMode::Permeability => {
                self.extract_param_log10(FieldKind::PermeabilityX)?;
            }
            ParamUpdateMode::Mannings => {
                self.extract_param_log10(FieldKind::Mannings)?;
            }
        }

        self.assembles.inc();
        info!(
            time = current_time,
            dt,
            update_mode = ?self.config.update_mode,
            "状态编组完成"
        );
        Ok(())
    }

    /// 提取参数场，取 log10 写入参数段
    fn extract_param_log10(&mut self, kind: FieldKind) -> CouplerResult<()> {
        self.model.sync(kind)?;
        extract_field(self.model.field(kind), &mut self.subvec_param)?;

        if let Some(range) = self.layout.param_range() {
            for (cell, (dst, &v)) in self.state[range]
                .iter_mut()
                .zip(self.subvec_param.iter())
                .enumerate()
            {
                if v <= 0.0 {
                    return Err(CouplerError::NonPositiveParameter {
                        field: kind.name(),
                        cell,
                        value: v,
                    });
                }
                *dst = v.log10();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use td_config::{DomainConfig, EnkfConfig};
    use td_model::SyntheticModel;

    fn coupler(update_mode: UpdateMode, param_update: ParamUpdateMode) -> EnkfCoupler<SyntheticModel> {
        let model = SyntheticModel::build(&DomainConfig {
            nx: 4,
            ny: 4,
            nz: 2,
            ..Default::default()
        })
        .unwrap();
        let config = EnkfConfig {
            update_mode,
            param_update,
            dz_scale: vec![1.0, 1.0],
            ..Default::default()
        };
        EnkfCoupler::initialize(model, config).unwrap()
    }

    #[test]
    fn test_assemble_pressure_mode_verbatim() {
        let mut c = coupler(UpdateMode::Pressure, ParamUpdateMode::None);
        c.model_mut()
            .field_mut(FieldKind::Pressure)
            .fill_interior(1.0);
        // 推进会改变压力，用推进后的场内实际值对照状态向量
        c.assemble(0.0, 1.0).unwrap();
        let mut expect = vec![0.0; 32];
        extract_field(c.model().field(FieldKind::Pressure), &mut expect).unwrap();
        assert_eq!(c.state()[..32], expect[..]);
    }

    #[test]
    fn test_assemble_saturation_mode_product() {
        let mut c = coupler(UpdateMode::Saturation, ParamUpdateMode::None);
        c.assemble(0.0, 1.0).unwrap();
        let mut sat = vec![0.0; 32];
        let mut poro = vec![0.0; 32];
        extract_field(c.model().field(FieldKind::Saturation), &mut sat).unwrap();
        extract_field(c.model().field(FieldKind::Porosity), &mut poro).unwrap();
        for i in 0..32 {
            assert!((c.state()[i] - sat[i] * poro[i]).abs() < 1e-14);
        }
    }

    #[test]
    fn test_nonpositive_permeability_rejected() {
        let mut c = coupler(UpdateMode::Pressure, ParamUpdateMode::Permeability);
        c.model_mut()
            .field_mut(FieldKind::PermeabilityX)
            .fill_interior(-5.0);
        let err = c.assemble(0.0, 1.0).unwrap_err();
        assert!(matches!(err, CouplerError::NonPositiveParameter { .. }));
    }
}
