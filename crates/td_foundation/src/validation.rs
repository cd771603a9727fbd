// crates/td_foundation/src/validation.rs

//! 运行时验证工具
//!
//! 提供验证报告和错误/警告类型，用于配置与网格数据验证。
//!
//! # 示例
//!
//! ```
//! use td_foundation::validation::{ValidationReport, ValidationError};
//!
//! let mut report = ValidationReport::new();
//! let dz_scale_len = 3usize;
//! let nz = 5usize;
//! if dz_scale_len != nz {
//!     report.add_error(ValidationError::LengthMismatch {
//!         field: "dz_scale",
//!         expected: nz,
//!         actual: dz_scale_len,
//!     });
//! }
//! assert!(report.has_errors());
//! ```

use std::fmt;

use serde::Serialize;

/// 验证报告
///
/// 可序列化，供 CLI 以 JSON 形式输出验证结果。
#[derive(Debug, Default, Serialize)]
pub struct ValidationReport {
    /// 错误列表
    pub errors: Vec<ValidationError>,
    /// 警告列表
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// 创建空的验证报告
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加错误
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 是否有警告
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// 错误数量
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// 合并另一份报告
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "验证报告: {} 个错误, {} 个警告",
            self.errors.len(),
            self.warnings.len()
        )?;
        for e in &self.errors {
            writeln!(f, "  [错误] {e}")?;
        }
        for w in &self.warnings {
            writeln!(f, "  [警告] {w}")?;
        }
        Ok(())
    }
}

/// 验证错误
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ValidationError {
    /// 长度不匹配
    LengthMismatch {
        /// 字段名
        field: &'static str,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },
    /// 数值越界
    OutOfRange {
        /// 字段名
        field: &'static str,
        /// 实际值
        value: f64,
        /// 下界
        min: f64,
        /// 上界
        max: f64,
    },
    /// 缺少必需配置键
    MissingKey {
        /// 键名
        key: &'static str,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch {
                field,
                expected,
                actual,
            } => write!(f, "{field}: 长度不匹配, 期望 {expected}, 实际 {actual}"),
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{field}: 值 {value} 超出范围 [{min}, {max}]"),
            Self::MissingKey { key } => write!(f, "缺少必需配置键: {key}"),
        }
    }
}

/// 验证警告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ValidationWarning {
    /// 使用了默认值
    DefaultUsed {
        /// 字段名
        field: &'static str,
        /// 默认值描述
        value: String,
    },
    /// 可疑但不致命的取值
    Suspicious {
        /// 字段名
        field: &'static str,
        /// 说明
        message: String,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DefaultUsed { field, value } => {
                write!(f, "{field}: 使用默认值 {value}")
            }
            Self::Suspicious { field, message } => write!(f, "{field}: {message}"),
        }
    }
}
