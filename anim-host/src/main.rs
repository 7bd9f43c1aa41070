//! # anim-host
//!
//! 命令行运行 / 检查场景文件。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p anim-host -- run scenes/orbit.json
//! cargo run -p anim-host -- run scenes/orbit.json --frames 300 --frame-ms 10
//! cargo run -p anim-host -- run scenes/orbit.json --json
//! cargo run -p anim-host -- check scenes/orbit.json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{Level, info};

use anim_host::config::DEFAULT_CONFIG_FILE;
use anim_host::{HostConfig, SceneFile, SceneRunner};

#[derive(Parser)]
#[command(name = "anim-host")]
#[command(about = "声明式属性动画的参考宿主")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件路径（默认：anim-host.json）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 日志级别（覆盖配置文件）
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行场景并输出通知日志与最终实体状态
    Run {
        /// 场景文件
        scene: PathBuf,

        /// 运行帧数（默认取配置 default_frames）
        #[arg(short, long)]
        frames: Option<u32>,

        /// 每帧时长（毫秒，默认取配置 frame_ms）
        #[arg(long)]
        frame_ms: Option<f64>,

        /// 以 JSON 输出结果
        #[arg(long)]
        json: bool,
    },

    /// 只解析并检查场景文件
    Check {
        /// 场景文件
        scene: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // 未显式指定且默认文件不存在时直接使用默认配置
    let mut config = match &cli.config {
        Some(path) => HostConfig::load(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => HostConfig::load(DEFAULT_CONFIG_FILE),
        None => HostConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    init_tracing(&config.log_level);

    if let Err(e) = real_main(cli, config) {
        eprintln!("anim-host error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn init_tracing(level: &str) {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn real_main(cli: Cli, mut config: HostConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run {
            scene,
            frames,
            frame_ms,
            json,
        } => {
            if let Some(frame_ms) = frame_ms {
                config.frame_ms = frame_ms;
            }
            config.validate()?;

            let file = SceneFile::load(&scene)
                .with_context(|| format!("加载场景失败: {}", scene.display()))?;
            file.validate()?;

            let frames = frames.unwrap_or(config.default_frames);
            let mut runner = SceneRunner::new(&file, &config)?;
            let report = runner.run(frames)?;
            info!(
                frames,
                notifications = report.notifications.len(),
                "场景运行完成"
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
        }
        Commands::Check { scene } => {
            let file = SceneFile::load(&scene)
                .with_context(|| format!("加载场景失败: {}", scene.display()))?;
            file.validate()?;
            println!(
                "✅ {}: {} 个实体, {} 个动画, {} 条脚本",
                scene.display(),
                file.entities.len(),
                file.entities.iter().map(|e| e.animations.len()).sum::<usize>(),
                file.script.len()
            );
        }
    }

    Ok(())
}
