//! # Runner 模块
//!
//! 按固定帧长运行场景文件，执行时间脚本并汇总结果。

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::HostConfig;
use crate::error::HostResult;
use crate::scene::EntitySnapshot;
use crate::scene_file::{SceneFile, ScriptStep};
use crate::world::{NotificationRecord, World};

/// 运行结果
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// 运行的帧数
    pub frames: u32,
    /// 结束时的世界时间（毫秒）
    pub time_ms: f64,
    /// 动画通知日志
    pub notifications: Vec<NotificationRecord>,
    /// 结束时的实体状态
    pub entities: Vec<EntitySnapshot>,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "frames: {} ({}ms)", self.frames, self.time_ms)?;
        writeln!(f, "notifications:")?;
        for record in &self.notifications {
            writeln!(f, "  {}", record)?;
        }
        writeln!(f, "entities:")?;
        for entity in &self.entities {
            write!(
                f,
                "  {} position=[{}] rotation=[{}] scale=[{}]",
                entity.id, entity.position, entity.rotation, entity.scale
            )?;
            for (path, value) in &entity.properties {
                write!(f, " {}={}", path, value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// 场景运行器
#[derive(Debug)]
pub struct SceneRunner {
    world: World,
    script: Vec<ScriptStep>,
    cursor: usize,
    frame_ms: f64,
    frames: u32,
}

impl SceneRunner {
    /// 创建世界并实例化场景
    pub fn new(scene: &SceneFile, config: &HostConfig) -> HostResult<Self> {
        let mut world = World::new(config);
        scene.instantiate(&mut world)?;
        info!(
            scene = %scene.name,
            entities = scene.entities.len(),
            steps = scene.script.len(),
            "场景已加载"
        );

        Ok(Self {
            world,
            script: scene.sorted_script(),
            cursor: 0,
            frame_ms: config.frame_ms,
            frames: 0,
        })
    }

    /// 世界
    pub fn world(&self) -> &World {
        &self.world
    }

    /// 可变世界
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// 执行所有已到时间的脚本动作
    fn apply_due_steps(&mut self) -> HostResult<()> {
        let now = self.world.time_ms();
        while let Some(step) = self.script.get(self.cursor) {
            if step.at_ms > now {
                break;
            }
            debug!(at_ms = step.at_ms, action = ?step.action, "执行脚本动作");
            step.action.apply(&mut self.world)?;
            self.cursor += 1;
        }
        Ok(())
    }

    /// 推进一帧：先执行到期的脚本动作，再推进世界
    ///
    /// `at_ms = t` 的动作在从 `t` 开始的那一帧执行。
    pub fn step(&mut self) -> HostResult<()> {
        self.apply_due_steps()?;
        self.world.step(self.frame_ms);
        self.frames += 1;
        Ok(())
    }

    /// 运行指定帧数
    pub fn run(&mut self, frames: u32) -> HostResult<RunReport> {
        for _ in 0..frames {
            self.step()?;
        }
        Ok(self.report())
    }

    /// 当前结果
    pub fn report(&self) -> RunReport {
        RunReport {
            frames: self.frames,
            time_ms: self.world.time_ms(),
            notifications: self.world.notifications().to_vec(),
            entities: self.world.scene().snapshot(),
        }
    }
}
