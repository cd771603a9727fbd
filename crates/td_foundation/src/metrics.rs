// crates/td_foundation/src/metrics.rs

//! 基础性能计数器
//!
//! 提供轻量级的原子计数功能，用于统计同化循环次数、
//! 模型推进次数和边界交换次数。

use std::sync::atomic::{AtomicU64, Ordering};

/// 原子计数器（无锁）
///
/// 仅提供基础递增/读取功能。每进程单线程运行时开销可忽略。
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    /// 创建零值计数器
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// 增加计数
    #[inline]
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// 增加指定值
    #[inline]
    pub fn add(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    /// 获取当前值
    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    /// 重置为零
    #[inline]
    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

// ============================================================================
// 测试
// ============================================================================
