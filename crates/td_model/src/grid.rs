// crates/td_model/src/grid.rs

//! 网格分区
//!
//! 本模块提供空间域分解的几何描述：
//! - GlobalGrid: 全局网格尺寸与全局线性编号
//! - Subgrid: 本地子网格（原点、范围、物理间距）
//! - GridPartition: 本进程拥有的子网格集合
//!
//! # 编号约定
//!
//! 全局线性编号沿 x 最快、y 次之、z 最慢（row-major in x, then y, then z）：
//!
//! ```text
//! idx(i, j, k) = nx_glob * ny_glob * k + nx_glob * j + i
//! ```
//!
//! 此处为 0 基编号；滤波器消费侧的 1 基修正仅发生在索引映射边界
//! （见 td_coupler::index_map::FILTER_INDEX_BASE）。

use glam::DVec3;

use td_config::DomainConfig;

// ============================================================
// 全局网格
// ============================================================

/// 全局网格尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalGrid {
    /// x 向单元数
    pub nx: usize,
    /// y 向单元数
    pub ny: usize,
    /// z 向层数
    pub nz: usize,
}

impl GlobalGrid {
    /// 全局单元总数
    pub fn n_cells(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// 全局线性编号（0 基，x 最快）
    #[inline]
    pub fn linear_index(&self, i: usize, j: usize, k: usize) -> usize {
        self.nx * self.ny * k + self.nx * j + i
    }
}

// ============================================================
// 子网格
// ============================================================

/// 本地子网格
///
/// 进程本地分区中的一个连续矩形块。`(ix, iy, iz)` 为全局单元坐标系
/// 下的起始编号，`origin` 为该块在物理空间中的原点
/// （域原点 + `(ix, iy, iz) * spacing`）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Subgrid {
    /// x 向起始全局编号
    pub ix: usize,
    /// y 向起始全局编号
    pub iy: usize,
    /// z 向起始全局编号
    pub iz: usize,
    /// x 向单元数
    pub nx: usize,
    /// y 向单元数
    pub ny: usize,
    /// z 向层数
    pub nz: usize,
    /// 物理原点 [m]
    pub origin: DVec3,
    /// 单元尺寸 [m]
    pub spacing: DVec3,
}

impl Subgrid {
    /// 单元数
    pub fn n_cells(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// 是否包含全局单元 (i, j, k)
    #[inline]
    pub fn contains(&self, i: usize, j: usize, k: usize) -> bool {
        i >= self.ix
            && i < self.ix + self.nx
            && j >= self.iy
            && j < self.iy + self.ny
            && k >= self.iz
            && k < self.iz + self.nz
    }

    /// 全局单元 (i, j, k) 的物理坐标（单元左下角）
    ///
    /// 子网格原点加本地偏移乘单元间距。
    #[inline]
    pub fn coord(&self, i: usize, j: usize, k: usize) -> DVec3 {
        self.origin
            + DVec3::new(
                (i - self.ix) as f64 * self.spacing.x,
                (j - self.iy) as f64 * self.spacing.y,
                (k - self.iz) as f64 * self.spacing.z,
            )
    }
}

// ============================================================
// 分区
// ============================================================

/// 本进程的网格分区
///
/// 互不相交的矩形子网格集合，加上全局网格尺寸。
/// 模型所有，耦合核心只读。
#[derive(Debug, Clone, PartialEq)]
pub struct GridPartition {
    /// 全局网格尺寸
    pub global: GlobalGrid,
    /// 本地子网格
    pub subgrids: Vec<Subgrid>,
}

impl GridPartition {
    /// 本地单元总数（所有子网格之和）
    pub fn local_cell_count(&self) -> usize {
        self.subgrids.iter().map(Subgrid::n_cells).sum()
    }

    /// 从计算域配置构造规则分区
    ///
    /// 将整个域在 x/y 方向切成 `blocks_x × blocks_y` 个子网格
    /// （z 向不切分），余数单元并入各方向最后一块。
    pub fn regular(domain: &DomainConfig) -> Self {
        let global = GlobalGrid {
            nx: domain.nx,
            ny: domain.ny,
            nz: domain.nz,
        };
        let spacing = DVec3::new(domain.dx, domain.dy, domain.dz);
        let domain_origin = DVec3::from_array(domain.origin);

        let bx = domain.nx / domain.blocks_x;
        let by = domain.ny / domain.blocks_y;

        let mut subgrids = Vec::with_capacity(domain.blocks_x * domain.blocks_y);
        for jb in 0..domain.blocks_y {
            for ib in 0..domain.blocks_x {
                let ix = ib * bx;
                let iy = jb * by;
                let nx = if ib + 1 == domain.blocks_x {
                    domain.nx - ix
                } else {
                    bx
                };
                let ny = if jb + 1 == domain.blocks_y {
                    domain.ny - iy
                } else {
                    by
                };
                subgrids.push(Subgrid {
                    ix,
                    iy,
                    iz: 0,
                    nx,
                    ny,
                    nz: domain.nz,
                    origin: domain_origin
                        + DVec3::new(ix as f64 * spacing.x, iy as f64 * spacing.y, 0.0),
                    spacing,
                });
            }
        }

        Self { global, subgrids }
    }

    /// 地表分区（nz = 1）
    ///
    /// 用于地表二维参数场（Manning 糙率）：保持 x/y 分块不变，
    /// 仅保留最上层。
    pub fn surface(&self) -> Self {
        let global = GlobalGrid {
            nx: self.global.nx,
            ny: self.global.ny,
            nz: 1,
        };
        let subgrids = self
            .subgrids
            .iter()
            .map(|sg| Subgrid {
                iz: 0,
                nz: 1,
                ..*sg
            })
            .collect();
        Self { global, subgrids }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain_4x4x2() -> DomainConfig {
        DomainConfig {
            nx: 4,
            ny: 4,
            nz: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_linear_index_x_fastest() {
        let g = GlobalGrid { nx: 4, ny: 4, nz: 2 };
        assert_eq!(g.linear_index(0, 0, 0), 0);
        assert_eq!(g.linear_index(1, 0, 0), 1);
        assert_eq!(g.linear_index(0, 1, 0), 4);
        assert_eq!(g.linear_index(0, 0, 1), 16);
        assert_eq!(g.linear_index(3, 3, 1), 31);
    }

    #[test]
    fn test_regular_partition_single_block() {
        let p = GridPartition::regular(&domain_4x4x2());
        assert_eq!(p.subgrids.len(), 1);
        assert_eq!(p.local_cell_count(), 32);
    }

    #[test]
    fn test_regular_partition_blocks_cover_domain() {
        let domain = DomainConfig {
            nx: 5,
            ny: 3,
            nz: 2,
            blocks_x: 2,
            blocks_y: 2,
            ..Default::default()
        };
        let p = GridPartition::regular(&domain);
        assert_eq!(p.subgrids.len(), 4);
        // 余数并入最后一块，总单元数不变
        assert_eq!(p.local_cell_count(), 30);
        // 子网格互不相交且覆盖全域
        let mut seen = vec![false; 30];
        for sg in &p.subgrids {
            for k in sg.iz..sg.iz + sg.nz {
                for j in sg.iy..sg.iy + sg.ny {
                    for i in sg.ix..sg.ix + sg.nx {
                        let idx = p.global.linear_index(i, j, k);
                        assert!(!seen[idx]);
                        seen[idx] = true;
                    }
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_subgrid_coord() {
        let p = GridPartition::regular(&DomainConfig {
            nx: 4,
            ny: 4,
            nz: 2,
            blocks_x: 2,
            blocks_y: 1,
            dx: 2.0,
            dy: 1.0,
            dz: 0.5,
            ..Default::default()
        });
        let sg = &p.subgrids[1];
        assert_eq!(sg.ix, 2);
        // 第二块原点在 x = 2 * 2.0
        let c = sg.coord(2, 0, 1);
        assert!((c.x - 4.0).abs() < 1e-12);
        assert!((c.z - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_surface_partition() {
        let p = GridPartition::regular(&domain_4x4x2());
        let s = p.surface();
        assert_eq!(s.local_cell_count(), 16);
        assert_eq!(s.global.nz, 1);
    }
}
