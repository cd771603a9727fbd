// apps/td_cli/src/commands/run.rs

//! 运行同化循环命令
//!
//! 在合成模型上驱动完整的同化循环序列。每个循环推进模型、
//! 提取状态向量、施加一个保均值的演示扰动（代替真实滤波器的
//! 分析步）、再把分析结果写回模型。

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{error, info};

use td_coupler::EnkfCoupler;
use td_model::SyntheticModel;

use super::{load_enkf_config, DomainArgs};

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 同化配置文件路径 (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub domain: DomainArgs,

    /// 输出目录
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// 同化循环次数
    #[arg(long, default_value = "10")]
    pub cycles: usize,

    /// 每个循环的推进时长 [秒]
    #[arg(long, default_value = "1.0")]
    pub dt: f64,

    /// 演示扰动幅度（相对于状态分量）
    #[arg(long, default_value = "0.01")]
    pub perturbation: f64,

    /// 扰动随机种子
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// 每隔多少个循环输出一次诊断快照（0 关闭）
    #[arg(long, default_value = "0")]
    pub snapshot_every: usize,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== TerraDA 同化循环启动 ===");
    info!("开始时间: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));

    let domain = args.domain.to_domain()?;
    let config = load_enkf_config(args.config.as_deref(), domain.nz)?;
    info!(
        "域: {}×{}×{} ({}×{} 子网格), 状态模式: {:?}, 参数模式: {:?}",
        domain.nx, domain.ny, domain.nz, domain.blocks_x, domain.blocks_y,
        config.update_mode, config.param_update
    );

    let model = SyntheticModel::build(&domain)
        .context("构建合成模型失败")?
        .with_output_dir(&args.output);
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("创建输出目录 {} 失败", args.output.display()))?;

    // 初始化失败对进程是致命的
    let mut coupler = match EnkfCoupler::initialize(model, config) {
        Ok(c) => c,
        Err(e) => {
            error!("耦合初始化失败: {e}");
            std::process::exit(1);
        }
    };
    info!(
        "本地单元 {} 个, 状态向量 {} 项",
        coupler.local_cell_count(),
        coupler.total_state_len()
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let start = Instant::now();

    for cycle in 0..args.cycles {
        let t = cycle as f64 * args.dt;
        coupler
            .assemble(t, args.dt)
            .with_context(|| format!("循环 {cycle}: 编组失败"))?;

        perturb_mean_preserving(coupler.state_mut(), args.perturbation, &mut rng);

        coupler
            .apply_analysis()
            .with_context(|| format!("循环 {cycle}: 写回失败"))?;

        let state = coupler.state();
        let mean = state.iter().sum::<f64>() / state.len() as f64;
        info!("循环 {cycle}: t={:.2} s, 状态均值 {:.6e}", t + args.dt, mean);

        if args.snapshot_every > 0 && (cycle + 1) % args.snapshot_every == 0 {
            let snapshot = coupler.state()[..coupler.local_cell_count()].to_vec();
            coupler
                .print_subvector("state", &format!("{:05}", cycle + 1), &snapshot)
                .with_context(|| format!("循环 {cycle}: 诊断输出失败"))?;
        }
    }

    let elapsed = start.elapsed();
    info!("=== 同化完成 ===");
    info!("循环数: {}", args.cycles);
    info!("计算时间: {:.2} s", elapsed.as_secs_f64());
    info!(
        "平均循环耗时: {:.3} ms",
        elapsed.as_secs_f64() * 1000.0 / args.cycles.max(1) as f64
    );
    info!(
        "模型统计: 推进 {} 次, 边界交换 {} 次",
        coupler.model().n_advances(),
        coupler.model().n_syncs()
    );
    coupler.finalize();

    Ok(())
}

/// 保均值扰动：每个分量加均匀噪声后整体去掉噪声均值
///
/// 代替真实滤波器的分析步，用于单进程演示与冒烟测试。
fn perturb_mean_preserving(state: &mut [f64], amplitude: f64, rng: &mut StdRng) {
    if state.is_empty() || amplitude <= 0.0 {
        return;
    }
    let noise: Vec<f64> = state
        .iter()
        .map(|&v| rng.gen_range(-amplitude..=amplitude) * v.abs().max(1e-12))
        .collect();
    let mean = noise.iter().sum::<f64>() / noise.len() as f64;
    for (v, n) in state.iter_mut().zip(&noise) {
        *v += n - mean;
    }
}
