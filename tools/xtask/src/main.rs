//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `scene-check`: 检查场景文件（JSON 格式、实体引用、动画参数）

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anim_host::SceneFile;
use clap::{Parser, Subcommand};
use walkdir::WalkDir;
use xshell::{Shell, cmd};

/// 默认场景目录（相对于 workspace root）
const DEFAULT_SCENES_DIR: &str = "scenes";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "开发辅助工具")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行 fmt、clippy、test 门禁检查
    CheckAll,

    /// 检查场景文件
    ///
    /// 不带参数时检查 scenes/ 下所有 .json 文件。
    SceneCheck {
        /// 场景文件或目录
        path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::CheckAll => check_all()?,
        Commands::SceneCheck { path } => scene_check(path.as_deref())?,
    }

    Ok(())
}

fn check_all() -> anyhow::Result<()> {
    let sh = Shell::new()?;

    eprintln!("\n==> cargo fmt --all -- --check");
    cmd!(sh, "cargo fmt --all -- --check").run()?;

    eprintln!("\n==> cargo clippy --workspace --all-targets");
    cmd!(sh, "cargo clippy --workspace --all-targets").run()?;

    eprintln!("\n==> cargo test --workspace");
    cmd!(sh, "cargo test --workspace").run()?;

    Ok(())
}

//=============================================================================
// scene-check 命令实现
//=============================================================================

/// 场景检查结果
#[derive(Default)]
struct SceneCheckResult {
    /// 检查的场景数量
    scenes_checked: usize,
    /// 出错的场景（路径, 错误）
    failures: Vec<(String, String)>,
    /// 动画实例总数
    animations: usize,
}

/// 执行场景检查
fn scene_check(path: Option<&Path>) -> anyhow::Result<()> {
    let files = match path {
        Some(path) if path.is_file() => vec![path.to_path_buf()],
        Some(path) if path.is_dir() => collect_scene_files(path),
        Some(path) => anyhow::bail!("路径不存在: {}", path.display()),
        None => {
            let dir = Path::new(DEFAULT_SCENES_DIR);
            if !dir.exists() {
                anyhow::bail!(
                    "默认场景目录不存在: {}\n请在 workspace 根目录运行，或指定场景路径",
                    dir.display()
                );
            }
            collect_scene_files(dir)
        }
    };

    if files.is_empty() {
        eprintln!("未找到场景文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个场景文件...\n", files.len());

    let mut result = SceneCheckResult::default();
    for file in &files {
        check_scene_file(file, &mut result);
    }

    print_check_result(&result);

    if !result.failures.is_empty() {
        anyhow::bail!("场景检查发现错误");
    }

    Ok(())
}

/// 收集目录下的所有场景文件
fn collect_scene_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// 检查单个场景文件
fn check_scene_file(file: &Path, result: &mut SceneCheckResult) {
    let scene_id = file.display().to_string();
    result.scenes_checked += 1;

    let checked = SceneFile::load(file).and_then(|scene| {
        scene.validate()?;
        Ok(scene)
    });

    match checked {
        Ok(scene) => {
            result.animations += scene
                .entities
                .iter()
                .map(|e| e.animations.len())
                .sum::<usize>();
        }
        Err(e) => {
            eprintln!("[ERROR] {}: {}", scene_id, e);
            result.failures.push((scene_id, e.to_string()));
        }
    }
}

/// 输出检查结果
fn print_check_result(result: &SceneCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!(
        "检查完成: {} 个场景, {} 个动画实例",
        result.scenes_checked, result.animations
    );
    eprintln!();

    if result.failures.is_empty() {
        eprintln!("✅ 检查通过，无错误");
    } else {
        eprintln!("❌ {} 个场景有错误", result.failures.len());
        for (scene, error) in &result.failures {
            eprintln!("  - {}: {}", scene, error);
        }
    }
}
