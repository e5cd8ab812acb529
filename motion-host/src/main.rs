//! # Motion Host
//!
//! 无界面演示程序：在虚拟时钟上播放内置动画并打印播放时间线。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p motion-host
//! cargo run -p motion-host -- --scenario pulse --cycles 5
//! cargo run -p motion-host -- --config config.json --scenario tour --json
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use motion_host::{AppConfig, ConfigError, Scenario, run_scenario};
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "motion-host")]
#[command(about = "动画组合演示 - 在无界面场景上播放内置动画")]
#[command(version)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// 演示场景
    #[arg(short, long, value_enum, default_value_t = Scenario::Showcase)]
    scenario: Scenario,

    /// 播放轮数（默认使用配置文件中的值）
    #[arg(long)]
    cycles: Option<u32>,

    /// 以 JSON 输出报告
    #[arg(long)]
    json: bool,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 日志级别来自配置文件，先加载配置再初始化日志
    let loaded = AppConfig::try_load(&cli.config);
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => AppConfig::default(),
    };

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        config.debug.level_filter()
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match loaded {
        Ok(_) => info!(path = ?cli.config, "配置文件加载成功"),
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = ?cli.config, "配置文件不存在，使用默认配置")
        }
        Err(e) => warn!(path = ?cli.config, error = %e, "配置文件加载失败，使用默认配置"),
    }

    config.validate().context("配置无效")?;

    let report = run_scenario(&config, cli.scenario, cli.cycles)
        .with_context(|| format!("演示 {} 运行失败", cli.scenario))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
