// crates/td_coupler/src/transfer.rs

//! 子向量传输
//!
//! 模型场与扁平本地缓冲之间的双向拷贝：
//! - [`extract_field`]: 场 → 缓冲
//! - [`inject_field`]: 缓冲 → 场
//!
//! 两个方向使用完全相同的遍历：逐子网格、单元按 (z, y, x) 嵌套
//! 顺序（x 最内），缓冲位置跨子网格连续递增。该顺序与
//! [`crate::index_map::IndexMap`] 的枚举顺序一致。
//!
//! # 前置条件
//!
//! 缓冲长度必须等于场的本地内部单元数；不符返回
//! [`CouplerError::SizeMismatch`]，绝不静默截断。
//!
//! # 注入后义务
//!
//! `inject_field` 只写内部单元。调用方必须在场被再次读取之前
//! 完成一次边界交换（`SubsurfaceModel::sync`）；
//! 本仓库的每个调用点都在注入后立即交换。

use crate::error::{CouplerError, CouplerResult};
use td_model::PartitionedField;

/// 场 → 缓冲
///
/// 按 (z, y, x) 顺序把每个子网格的内部单元值依次追加到缓冲。
pub fn extract_field(field: &PartitionedField, buf: &mut [f64]) -> CouplerResult<()> {
    let expected = field.n_interior();
    if buf.len() != expected {
        return Err(CouplerError::SizeMismatch {
            what: "extract 缓冲",
            expected,
            actual: buf.len(),
        });
    }

    let mut counter = 0;
    for sv in &field.subvectors {
        let sg = sv.subgrid;
        for k in sg.iz..sg.iz + sg.nz {
            for j in sg.iy..sg.iy + sg.ny {
                for i in sg.ix..sg.ix + sg.nx {
                    buf[counter] = sv.value(i, j, k);
                    counter += 1;
                }
            }
        }
    }
    Ok(())
}

/// 缓冲 → 场
///
/// 与 [`extract_field`] 对称的遍历，把缓冲值写入内部单元。
/// ghost 单元不被写入，调用方随后必须交换边界。
pub fn inject_field(field: &mut PartitionedField, buf: &[f64]) -> CouplerResult<()> {
    let expected = field.n_interior();
    if buf.len() != expected {
        return Err(CouplerError::SizeMismatch {
            what: "inject 缓冲",
            expected,
            actual: buf.len(),
        });
    }

    let mut counter = 0;
    for sv in &mut field.subvectors {
        let sg = sv.subgrid;
        for k in sg.iz..sg.iz + sg.nz {
            for j in sg.iy..sg.iy + sg.ny {
                for i in sg.ix..sg.ix + sg.nx {
                    sv.set(i, j, k, buf[counter]);
                    counter += 1;
                }
            }
        }
    }
    Ok(())
}
