// crates/td_coupler/src/layout.rs

//! 状态向量分段布局
//!
//! 集合状态向量是进程本地的定长 f64 序列，按连续分段划分：
//! 一或两个状态段，后接至多一个参数段。布局是两个模式标志的
//! 纯函数，在配置时确定一次，运行期间不变。
//!
//! ```text
//! Pressure             [ p(n) | 参数段? ]
//! Saturation           [ s·φ(n) | 参数段? ]
//! PressureSaturation   [ s·φ(n) | p(n) | 参数段? ]
//! ```
//!
//! 编组与反编组两侧的所有偏移量都从本模块导出，偏移算术只存在一处。

use std::ops::Range;

use td_config::{ParamUpdateMode, UpdateMode};

/// 状态向量布局
///
/// `subvec_len` 为本地三维单元数；`param_len` 为参数段长度
/// （渗透率时等于 `subvec_len`，Manning 糙率时为地表单元数）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateLayout {
    /// 状态更新模式
    pub update_mode: UpdateMode,
    /// 参数更新模式
    pub param_update: ParamUpdateMode,
    /// 本地单元数（每个状态段的长度）
    pub subvec_len: usize,
    /// 参数场本地单元数
    pub param_len: usize,
}

impl StateLayout {
    /// 构造布局
    pub fn new(
        update_mode: UpdateMode,
        param_update: ParamUpdateMode,
        subvec_len: usize,
        param_len: usize,
    ) -> Self {
        Self {
            update_mode,
            param_update,
            subvec_len,
            param_len,
        }
    }

    /// 参数段长度（无参数更新时为 0）
    pub fn param_segment_len(&self) -> usize {
        match self.param_update {
            ParamUpdateMode::None => 0,
            ParamUpdateMode::Permeability => self.subvec_len,
            ParamUpdateMode::Mannings => self.param_len,
        }
    }

    /// 状态向量总长度：活动分段长度之和
    pub fn total_len(&self) -> usize {
        self.update_mode.n_state_segments() * self.subvec_len + self.param_segment_len()
    }

    /// 第一状态段（压力或 s·φ）
    pub fn state_range(&self) -> Range<usize> {
        0..self.subvec_len
    }

    /// 原始压力所在的分段
    ///
    /// 饱和度导出模式下状态向量不含原始压力，返回 None。
    pub fn pressure_range(&self) -> Option<Range<usize>> {
        match self.update_mode {
            UpdateMode::Pressure => Some(0..self.subvec_len),
            UpdateMode::Saturation => None,
            UpdateMode::PressureSaturation => Some(self.subvec_len..2 * self.subvec_len),
        }
    }

    /// 参数段写回偏移（反编组侧算术）
    ///
    /// 压力+饱和度联合模式时状态部分占两段，否则一段。
    pub fn param_shift(&self) -> usize {
        match self.update_mode {
            UpdateMode::PressureSaturation => 2 * self.subvec_len,
            _ => self.subvec_len,
        }
    }

    /// 参数段（编组侧算术：总长减参数段长）
    pub fn param_range(&self) -> Option<Range<usize>> {
        if self.param_update.is_active() {
            let len = self.param_segment_len();
            Some(self.total_len() - len..self.total_len())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: usize = 32;
    const M: usize = 16;

    fn all_modes() -> impl Iterator<Item = (UpdateMode, ParamUpdateMode)> {
        [
            UpdateMode::Pressure,
            UpdateMode::Saturation,
            UpdateMode::PressureSaturation,
        ]
        .into_iter()
        .flat_map(|u| {
            [
                ParamUpdateMode::None,
                ParamUpdateMode::Permeability,
                ParamUpdateMode::Mannings,
            ]
            .into_iter()
            .map(move |p| (u, p))
        })
    }

    #[test]
    fn test_total_len_all_combinations() {
        for (u, p) in all_modes() {
            let layout = StateLayout::new(u, p, N, M);
            let state_part = u.n_state_segments() * N;
            let param_part = match p {
                ParamUpdateMode::None => 0,
                ParamUpdateMode::Permeability => N,
                ParamUpdateMode::Mannings => M,
            };
            assert_eq!(layout.total_len(), state_part + param_part);
        }
    }

    #[test]
    fn test_param_offsets_agree() {
        // 编组侧 (total - len) 与反编组侧 (shift) 必须逐位一致
        for (u, p) in all_modes() {
            let layout = StateLayout::new(u, p, N, M);
            if let Some(range) = layout.param_range() {
                assert_eq!(range.start, layout.param_shift(), "{u:?}/{p:?}");
                assert_eq!(range.end, layout.total_len());
            }
        }
    }

    #[test]
    fn test_pressure_range_by_mode() {
        let n = N;
        assert_eq!(
            StateLayout::new(UpdateMode::Pressure, ParamUpdateMode::None, n, n).pressure_range(),
            Some(0..n)
        );
        assert_eq!(
            StateLayout::new(UpdateMode::Saturation, ParamUpdateMode::None, n, n).pressure_range(),
            None
        );
        assert_eq!(
            StateLayout::new(UpdateMode::PressureSaturation, ParamUpdateMode::None, n, n)
                .pressure_range(),
            Some(n..2 * n)
        );
    }

    #[test]
    fn test_mannings_param_len_independent() {
        let layout = StateLayout::new(UpdateMode::Pressure, ParamUpdateMode::Mannings, N, M);
        assert_eq!(layout.total_len(), N + M);
        assert_eq!(layout.param_range(), Some(N..N + M));
        assert_eq!(layout.param_shift(), N);
    }
}
