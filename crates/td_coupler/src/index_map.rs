// crates/td_coupler/src/index_map.rs

//! 索引映射与坐标数组
//!
//! 每次运行构建一次：本地缓冲位置 i → 模型全局线性编号的映射，
//! 以及同序的三个物理坐标数组。枚举顺序为每个子网格内
//! z 最外、y 次之、x 最内，与所有传输例程的遍历顺序一致，
//! 因此映射第 i 项对应任何传输缓冲的第 i 项。
//!
//! 构建时机：首次推进步产生有效压力场之后；此后不可变。

use tracing::info;

use crate::error::{CouplerError, CouplerResult};
use td_config::ConfigError;
use td_model::GridPartition;

/// 滤波器侧的线性编号基
///
/// 消费方期望 1 基线性编号；0 基到 1 基的修正只发生在这里。
pub const FILTER_INDEX_BASE: usize = 1;

/// 坐标数组：与索引映射同长同序的三个平行序列
#[derive(Debug, Clone, Default)]
pub struct Coordinates {
    /// x 物理坐标 [m]
    pub x: Vec<f64>,
    /// y 物理坐标 [m]
    pub y: Vec<f64>,
    /// z 物理坐标 [m]
    pub z: Vec<f64>,
}

impl Coordinates {
    fn with_capacity(n: usize) -> Self {
        Self {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            z: Vec::with_capacity(n),
        }
    }

    /// 坐标点数
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// 索引映射
///
/// 不变量：`indices.len() == 本地单元数 == 坐标数组长度`。
#[derive(Debug, Clone)]
pub struct IndexMap {
    indices: Vec<usize>,
    coords: Coordinates,
    /// 每个子网格的本地范围 (nx, ny, nz)，供后续越界检查
    extents: Vec<(usize, usize, usize)>,
    /// 垂向分层缩放表（每 z 层一个值），供滤波器侧使用
    layer_scale: Vec<f64>,
}

impl IndexMap {
    /// 从分区与分层缩放表构建
    ///
    /// 缩放表缺失或长度与全局 nz 不符是致命配置错误。
    pub fn build(partition: &GridPartition, dz_scale: &[f64]) -> CouplerResult<Self> {
        let nz_glob = partition.global.nz;
        if dz_scale.is_empty() {
            return Err(CouplerError::Config(ConfigError::Missing(
                "dz_scale (dzScale.nzListNumber)".to_string(),
            )));
        }
        if dz_scale.len() != nz_glob {
            return Err(CouplerError::Config(ConfigError::invalid(
                "dz_scale",
                dz_scale.len(),
                format!("长度必须等于全局 nz = {nz_glob}"),
            )));
        }

        let n_local = partition.local_cell_count();
        let mut indices = Vec::with_capacity(n_local);
        let mut coords = Coordinates::with_capacity(n_local);
        let mut extents = Vec::with_capacity(partition.subgrids.len());

        for sg in &partition.subgrids {
            for k in sg.iz..sg.iz + sg.nz {
                for j in sg.iy..sg.iy + sg.ny {
                    for i in sg.ix..sg.ix + sg.nx {
                        indices.push(partition.global.linear_index(i, j, k) + FILTER_INDEX_BASE);
                        let c = sg.coord(i, j, k);
                        coords.x.push(c.x);
                        coords.y.push(c.y);
                        coords.z.push(c.z);
                    }
                }
            }
        }
        for sg in &partition.subgrids {
            extents.push((sg.nx, sg.ny, sg.nz));
        }

        debug_assert_eq!(indices.len(), n_local);
        info!(
            n_local,
            n_subgrids = partition.subgrids.len(),
            "索引映射构建完成"
        );

        Ok(Self {
            indices,
            coords,
            extents,
            layer_scale: dz_scale.to_vec(),
        })
    }

    /// 映射长度（本地单元数）
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// 全局线性编号序列（1 基）
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// 坐标数组
    pub fn coordinates(&self) -> &Coordinates {
        &self.coords
    }

    /// 各子网格本地范围
    pub fn extents(&self) -> &[(usize, usize, usize)] {
        &self.extents
    }

    /// 垂向分层缩放表
    pub fn layer_scale(&self) -> &[f64] {
        &self.layer_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use td_config::DomainConfig;

    fn partition_4x4x2() -> GridPartition {
        GridPartition::regular(&DomainConfig {
            nx: 4,
            ny: 4,
            nz: 2,
            ..Default::default()
        })
    }

    #[test]
    fn test_index_map_4x4x2() {
        let p = partition_4x4x2();
        let map = IndexMap::build(&p, &[1.0, 1.0]).unwrap();
        assert_eq!(map.len(), 32);
        assert_eq!(map.coordinates().len(), 32);

        // 全局编号 = nx*ny*k + nx*j + i + 1，(z,y,x) 枚举顺序
        let mut pos = 0;
        for k in 0..2 {
            for j in 0..4 {
                for i in 0..4 {
                    assert_eq!(map.indices()[pos], 16 * k + 4 * j + i + 1);
                    pos += 1;
                }
            }
        }
    }

    #[test]
    fn test_coordinates_order_matches_map() {
        let p = GridPartition::regular(&DomainConfig {
            nx: 4,
            ny: 4,
            nz: 2,
            dx: 2.0,
            dy: 3.0,
            dz: 0.5,
            blocks_x: 2,
            ..Default::default()
        });
        let map = IndexMap::build(&p, &[1.0, 1.0]).unwrap();
        assert_eq!(map.len(), 32);
        // 第二个子网格从 pos=16 开始，首单元 (2,0,0)
        assert!((map.coordinates().x[16] - 4.0).abs() < 1e-12);
        assert!((map.coordinates().y[16] - 0.0).abs() < 1e-12);
        assert_eq!(map.indices()[16], 2 + 1);
        assert_eq!(map.extents(), &[(2, 4, 2), (2, 4, 2)]);
    }

    #[test]
    fn test_missing_layer_table_fatal() {
        let p = partition_4x4x2();
        assert!(matches!(
            IndexMap::build(&p, &[]),
            Err(CouplerError::Config(ConfigError::Missing(_)))
        ));
        assert!(matches!(
            IndexMap::build(&p, &[1.0]),
            Err(CouplerError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_layer_scale_stored() {
        let p = partition_4x4x2();
        let map = IndexMap::build(&p, &[0.5, 2.0]).unwrap();
        assert_eq!(map.layer_scale(), &[0.5, 2.0]);
    }
}
