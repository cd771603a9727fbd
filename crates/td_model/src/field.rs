// crates/td_model/src/field.rs

//! 分区场存储
//!
//! 本模块提供带 ghost 环的场存储：
//! - Subvector: 单个子网格的数据块（内部单元 + ghost 环）
//! - PartitionedField: 每个子网格一个 Subvector 的完整场
//!
//! # 存储布局
//!
//! 每个 Subvector 按 x 最快的 row-major 布局存储
//! `(nx + 2g) × (ny + 2g) × (nz + 2g)` 个值，g 为 ghost 宽度。
//! `elt_index` 将全局单元坐标映射到含 ghost 的数据偏移，
//! 对应求解器侧的 SubvectorEltIndex 寻址。
//!
//! # Ghost 约定
//!
//! ghost 单元的值只在边界交换（`SubsurfaceModel::sync`）之后有效；
//! 任何注入式写入后必须先交换再读取。

use crate::grid::{GridPartition, Subgrid};

// ============================================================
// 子向量
// ============================================================

/// 单个子网格的场数据块
#[derive(Debug, Clone, PartialEq)]
pub struct Subvector {
    /// 子网格几何
    pub subgrid: Subgrid,
    /// ghost 环宽度
    pub ghost: usize,
    /// 含 ghost 的数据，x 最快
    pub data: Vec<f64>,
}

impl Subvector {
    /// 为子网格分配数据块，初值为 0
    pub fn new(subgrid: Subgrid, ghost: usize) -> Self {
        let n = (subgrid.nx + 2 * ghost) * (subgrid.ny + 2 * ghost) * (subgrid.nz + 2 * ghost);
        Self {
            subgrid,
            ghost,
            data: vec![0.0; n],
        }
    }

    /// 全局单元坐标 (i, j, k) 的数据偏移
    ///
    /// 调用方保证 (i, j, k) 落在含 ghost 的扩展盒内；
    /// ghost 单元允许坐标超出子网格一圈。
    #[inline]
    pub fn elt_index(&self, i: i64, j: i64, k: i64) -> usize {
        let g = self.ghost as i64;
        let sg = &self.subgrid;
        let nx_tot = (sg.nx + 2 * self.ghost) as i64;
        let ny_tot = (sg.ny + 2 * self.ghost) as i64;
        let li = i - sg.ix as i64 + g;
        let lj = j - sg.iy as i64 + g;
        let lk = k - sg.iz as i64 + g;
        debug_assert!(li >= 0 && lj >= 0 && lk >= 0);
        (nx_tot * ny_tot * lk + nx_tot * lj + li) as usize
    }

    /// 读取全局单元 (i, j, k) 的值
    #[inline]
    pub fn value(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[self.elt_index(i as i64, j as i64, k as i64)]
    }

    /// 写入全局单元 (i, j, k) 的值
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, v: f64) {
        let idx = self.elt_index(i as i64, j as i64, k as i64);
        self.data[idx] = v;
    }

    /// 内部单元数（不含 ghost）
    pub fn n_interior(&self) -> usize {
        self.subgrid.n_cells()
    }
}

// ============================================================
// 分区场
// ============================================================

/// 分区场：每个子网格一个子向量
///
/// 模型所有；耦合核心通过 `SubsurfaceModel::field`/`field_mut` 访问。
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionedField {
    /// 子向量，与分区的子网格一一对应、顺序一致
    pub subvectors: Vec<Subvector>,
}

impl PartitionedField {
    /// 按分区几何分配场，初值为 0
    pub fn new(partition: &GridPartition, ghost: usize) -> Self {
        Self {
            subvectors: partition
                .subgrids
                .iter()
                .map(|&sg| Subvector::new(sg, ghost))
                .collect(),
        }
    }

    /// 本地内部单元总数
    pub fn n_interior(&self) -> usize {
        self.subvectors.iter().map(Subvector::n_interior).sum()
    }

    /// 将所有内部单元置为常数（ghost 保持不变）
    pub fn fill_interior(&mut self, v: f64) {
        for sv in &mut self.subvectors {
            let sg = sv.subgrid;
            for k in sg.iz..sg.iz + sg.nz {
                for j in sg.iy..sg.iy + sg.ny {
                    for i in sg.ix..sg.ix + sg.nx {
                        sv.set(i, j, k, v);
                    }
                }
            }
        }
    }

    /// 查找拥有全局单元 (i, j, k) 的子向量并读取内部值
    pub fn interior_value(&self, i: usize, j: usize, k: usize) -> Option<f64> {
        self.subvectors
            .iter()
            .find(|sv| sv.subgrid.contains(i, j, k))
            .map(|sv| sv.value(i, j, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use td_config::DomainConfig;

    fn field_2blocks() -> PartitionedField {
        let p = GridPartition::regular(&DomainConfig {
            nx: 4,
            ny: 2,
            nz: 2,
            blocks_x: 2,
            ..Default::default()
        });
        PartitionedField::new(&p, 1)
    }

    #[test]
    fn test_elt_index_ghost_offset() {
        let field = field_2blocks();
        let sv = &field.subvectors[0];
        // 内部原点 (0,0,0) 在 ghost=1 时偏移为 (1,1,1)
        let nx_tot = 2 + 2;
        let ny_tot = 2 + 2;
        assert_eq!(sv.elt_index(0, 0, 0), nx_tot * ny_tot + nx_tot + 1);
        // ghost 单元坐标允许越界一圈
        assert_eq!(sv.elt_index(-1, -1, -1), 0);
    }

    #[test]
    fn test_set_value_roundtrip() {
        let mut field = field_2blocks();
        field.subvectors[1].set(3, 1, 1, 7.5);
        assert_eq!(field.subvectors[1].value(3, 1, 1), 7.5);
        assert_eq!(field.interior_value(3, 1, 1), Some(7.5));
        assert_eq!(field.interior_value(0, 0, 0), Some(0.0));
    }

    #[test]
    fn test_fill_interior() {
        let mut field = field_2blocks();
        field.fill_interior(2.0);
        assert_eq!(field.n_interior(), 16);
        for sv in &field.subvectors {
            let sg = sv.subgrid;
            assert_eq!(sv.value(sg.ix, sg.iy, sg.iz), 2.0);
        }
        // ghost 不受 fill_interior 影响
        let sv = &field.subvectors[0];
        assert_eq!(sv.data[0], 0.0);
    }
}
