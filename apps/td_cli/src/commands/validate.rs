// apps/td_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 校验域几何与同化配置的一致性，汇总错误与警告后统一报告。

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use tracing::{error, info, warn};

use td_foundation::validation::ValidationReport;

use super::{load_enkf_config, DomainArgs};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 同化配置文件路径 (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub domain: DomainArgs,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,

    /// 以 JSON 输出验证报告
    #[arg(long)]
    pub json: bool,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== TerraDA 配置验证 ===");

    let domain = match args.domain.to_domain() {
        Ok(d) => d,
        Err(e) => {
            error!("域配置: {e:#}");
            bail!("验证失败");
        }
    };
    info!("域几何: 通过");

    let config = load_enkf_config(args.config.as_deref(), domain.nz)?;
    let report: ValidationReport = config.validation_report(domain.nz);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    for e in &report.errors {
        error!("配置错误: {e}");
    }
    for w in &report.warnings {
        warn!("配置警告: {w}");
    }

    if report.has_errors() {
        bail!("验证失败: {} 个错误", report.error_count());
    }
    if args.strict && report.has_warnings() {
        bail!("严格模式: {} 个警告视为错误", report.warnings.len());
    }

    info!(
        "验证通过 ({} 个警告)",
        report.warnings.len()
    );
    Ok(())
}
