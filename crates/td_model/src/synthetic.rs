// crates/td_model/src/synthetic.rs

//! 内存参考模型
//!
//! `SyntheticModel` 是 [`SubsurfaceModel`] 的进程内参考实现，
//! 供 CLI 演示与集成测试使用。它不求解 Richards 方程，
//! 只提供语义上自洽的最小物理：
//!
//! - 推进步：压力向驱动通量的平衡值松弛；
//! - 持水关系：线性曲线 s = 1 + α·ψ（ψ 为压力水头），
//!   在非饱和区间内与逆变换严格互逆；
//! - 边界交换：在本地分区内把 ghost 单元填为拥有者子网格的内部值，
//!   域边界 ghost 取最近内部单元值。
//!
//! 真实部署中该实现被求解器侧的 FFI 适配层替换；
//! 本实现保证耦合核心的全部契约可以被完整测试。

use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use crate::field::PartitionedField;
use crate::grid::GridPartition;
use crate::model::{FieldKind, SubsurfaceModel};
use td_config::DomainConfig;
use td_foundation::{Counter, TdError, TdResult};

/// 水密度 [kg/m³]
const WATER_DENSITY: f64 = 1000.0;

/// 内存参考模型
pub struct SyntheticModel {
    partition: GridPartition,
    pressure: PartitionedField,
    saturation: PartitionedField,
    porosity: PartitionedField,
    density: PartitionedField,
    perm_x: PartitionedField,
    perm_y: PartitionedField,
    perm_z: PartitionedField,
    mannings: PartitionedField,
    evap_trans: PartitionedField,
    gravity: f64,
    /// 线性持水曲线斜率 [1/m]
    alpha: f64,
    /// 残余饱和度
    s_res: f64,
    /// 推进步松弛系数 [1/h]
    relax: f64,
    output_dir: PathBuf,
    advances: Counter,
    syncs: Counter,
}

impl SyntheticModel {
    /// 从计算域配置构建，初始为非饱和静止状态
    pub fn build(domain: &DomainConfig) -> TdResult<Self> {
        domain
            .validate()
            .map_err(|e| TdError::ModelInit(e.to_string()))?;

        let partition = GridPartition::regular(domain);
        let surface = partition.surface();
        let ghost = 1;

        let mut model = Self {
            pressure: PartitionedField::new(&partition, ghost),
            saturation: PartitionedField::new(&partition, ghost),
            porosity: PartitionedField::new(&partition, ghost),
            density: PartitionedField::new(&partition, ghost),
            perm_x: PartitionedField::new(&partition, ghost),
            perm_y: PartitionedField::new(&partition, ghost),
            perm_z: PartitionedField::new(&partition, ghost),
            mannings: PartitionedField::new(&surface, ghost),
            evap_trans: PartitionedField::new(&partition, ghost),
            partition,
            gravity: 9.81,
            alpha: 0.05,
            s_res: 0.1,
            relax: 0.1,
            output_dir: PathBuf::from("output"),
            advances: Counter::new(),
            syncs: Counter::new(),
        };

        model.pressure.fill_interior(-1.0);
        model.porosity.fill_interior(0.4);
        model.density.fill_interior(WATER_DENSITY);
        model.perm_x.fill_interior(100.0);
        model.perm_y.fill_interior(100.0);
        model.perm_z.fill_interior(100.0);
        model.mannings.fill_interior(5.5e-5);
        model.update_saturation_from_pressure();
        Ok(model)
    }

    /// 设置诊断输出目录
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// 推进次数
    pub fn n_advances(&self) -> u64 {
        self.advances.get()
    }

    /// 边界交换次数
    pub fn n_syncs(&self) -> u64 {
        self.syncs.get()
    }

    /// 压力 → 饱和度（线性持水曲线）
    pub fn retention(&self, p: f64, rho: f64) -> f64 {
        if p >= 0.0 {
            1.0
        } else {
            let psi = p / (rho * self.gravity);
            (1.0 + self.alpha * psi).max(self.s_res)
        }
    }

    /// 饱和度 → 压力（持水曲线的逆）
    pub fn retention_inverse(&self, s: f64, rho: f64) -> f64 {
        if s >= 1.0 {
            0.0
        } else {
            let psi = (s - 1.0) / self.alpha;
            psi * rho * self.gravity
        }
    }

    fn update_saturation_from_pressure(&mut self) {
        for (sv_p, (sv_s, sv_rho)) in self.pressure.subvectors.iter().zip(
            self.saturation
                .subvectors
                .iter_mut()
                .zip(self.density.subvectors.iter()),
        ) {
            let sg = sv_p.subgrid;
            for k in sg.iz..sg.iz + sg.nz {
                for j in sg.iy..sg.iy + sg.ny {
                    for i in sg.ix..sg.ix + sg.nx {
                        let p = sv_p.value(i, j, k);
                        let rho = sv_rho.value(i, j, k);
                        let s = if p >= 0.0 {
                            1.0
                        } else {
                            let psi = p / (rho * self.gravity);
                            (1.0 + self.alpha * psi).max(self.s_res)
                        };
                        sv_s.set(i, j, k, s);
                    }
                }
            }
        }
    }
}

impl SubsurfaceModel for SyntheticModel {
    fn partition(&self) -> &GridPartition {
        &self.partition
    }

    fn field(&self, kind: FieldKind) -> &PartitionedField {
        match kind {
            FieldKind::Pressure => &self.pressure,
            FieldKind::Saturation => &self.saturation,
            FieldKind::Porosity => &self.porosity,
            FieldKind::Density => &self.density,
            FieldKind::PermeabilityX => &self.perm_x,
            FieldKind::PermeabilityY => &self.perm_y,
            FieldKind::PermeabilityZ => &self.perm_z,
            FieldKind::Mannings => &self.mannings,
            FieldKind::EvapTrans => &self.evap_trans,
        }
    }

    fn field_mut(&mut self, kind: FieldKind) -> &mut PartitionedField {
        match kind {
            FieldKind::Pressure => &mut self.pressure,
            FieldKind::Saturation => &mut self.saturation,
            FieldKind::Porosity => &mut self.porosity,
            FieldKind::Density => &mut self.density,
            FieldKind::PermeabilityX => &mut self.perm_x,
            FieldKind::PermeabilityY => &mut self.perm_y,
            FieldKind::PermeabilityZ => &mut self.perm_z,
            FieldKind::Mannings => &mut self.mannings,
            FieldKind::EvapTrans => &mut self.evap_trans,
        }
    }

    fn sync(&mut self, kind: FieldKind) -> TdResult<()> {
        let global = match kind {
            FieldKind::Mannings => {
                let mut g = self.partition.global;
                g.nz = 1;
                g
            }
            _ => self.partition.global,
        };

        let field = self.field_mut(kind);
        let snapshot = field.clone();

        for sv in &mut field.subvectors {
            let g = sv.ghost as i64;
            let sg = sv.subgrid;
            let (ix, iy, iz) = (sg.ix as i64, sg.iy as i64, sg.iz as i64);
            let (nx, ny, nz) = (sg.nx as i64, sg.ny as i64, sg.nz as i64);

            for k in (iz - g)..(iz + nz + g) {
                for j in (iy - g)..(iy + ny + g) {
                    for i in (ix - g)..(ix + nx + g) {
                        let interior = i >= ix
                            && i < ix + nx
                            && j >= iy
                            && j < iy + ny
                            && k >= iz
                            && k < iz + nz;
                        if interior {
                            continue;
                        }
                        // 域边界 ghost 取最近内部单元（钳制到全局域）
                        let ci = i.clamp(0, global.nx as i64 - 1) as usize;
                        let cj = j.clamp(0, global.ny as i64 - 1) as usize;
                        let ck = k.clamp(0, global.nz as i64 - 1) as usize;
                        match snapshot.interior_value(ci, cj, ck) {
                            Some(v) => {
                                let idx = sv.elt_index(i, j, k);
                                sv.data[idx] = v;
                            }
                            None => {
                                return Err(TdError::communication(
                                    kind.name(),
                                    format!("ghost 单元 ({ci},{cj},{ck}) 无拥有者"),
                                ));
                            }
                        }
                    }
                }
            }
        }

        self.syncs.inc();
        debug!(field = kind.name(), "边界交换完成");
        Ok(())
    }

    fn advance(&mut self, start_time: f64, stop_time: f64) -> TdResult<()> {
        let dt = stop_time - start_time;
        if dt <= 0.0 {
            return Err(TdError::InvalidInput(format!(
                "推进步长非正: start={start_time}, stop={stop_time}"
            )));
        }

        // 压力向驱动通量的平衡值松弛
        for (sv_p, sv_et) in self
            .pressure
            .subvectors
            .iter_mut()
            .zip(self.evap_trans.subvectors.iter())
        {
            let sg = sv_p.subgrid;
            for k in sg.iz..sg.iz + sg.nz {
                for j in sg.iy..sg.iy + sg.ny {
                    for i in sg.ix..sg.ix + sg.nx {
                        let p = sv_p.value(i, j, k);
                        let et = sv_et.value(i, j, k);
                        sv_p.set(i, j, k, p + dt * (et - self.relax * p));
                    }
                }
            }
        }

        self.update_saturation_from_pressure();
        self.advances.inc();
        debug!(start_time, stop_time, "推进步完成");
        Ok(())
    }

    fn saturation_to_pressure(&mut self) -> TdResult<()> {
        for (sv_s, (sv_p, sv_rho)) in self.saturation.subvectors.iter().zip(
            self.pressure
                .subvectors
                .iter_mut()
                .zip(self.density.subvectors.iter()),
        ) {
            let sg = sv_s.subgrid;
            for k in sg.iz..sg.iz + sg.nz {
                for j in sg.iy..sg.iy + sg.ny {
                    for i in sg.ix..sg.ix + sg.nx {
                        let s = sv_s.value(i, j, k);
                        if !(0.0..=1.0 + 1e-12).contains(&s) {
                            return Err(TdError::numeric(format!(
                                "饱和度超出 [0,1]: s={s} at ({i},{j},{k})"
                            )));
                        }
                        let rho = sv_rho.value(i, j, k);
                        let p = if s >= 1.0 {
                            0.0
                        } else {
                            (s - 1.0) / self.alpha * rho * self.gravity
                        };
                        sv_p.set(i, j, k, p);
                    }
                }
            }
        }
        Ok(())
    }

    fn gravity(&self) -> f64 {
        self.gravity
    }

    fn write_binary(&self, prefix: &str, suffix: &str, field: &PartitionedField) -> TdResult<()> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| TdError::io("创建输出目录失败", e))?;
        let name = if suffix.is_empty() {
            format!("{prefix}.bin")
        } else {
            format!("{prefix}.{suffix}.bin")
        };
        let path = self.output_dir.join(name);
        let file = std::fs::File::create(&path)
            .map_err(|e| TdError::io(format!("创建 {} 失败", path.display()), e))?;
        let mut writer = std::io::BufWriter::new(file);
        for sv in &field.subvectors {
            let sg = sv.subgrid;
            for k in sg.iz..sg.iz + sg.nz {
                for j in sg.iy..sg.iy + sg.ny {
                    for i in sg.ix..sg.ix + sg.nx {
                        writer
                            .write_all(&sv.value(i, j, k).to_le_bytes())
                            .map_err(|e| TdError::io("写入诊断文件失败", e))?;
                    }
                }
            }
        }
        Ok(())
    }
}
