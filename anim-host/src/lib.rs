//! # Anim Host
//!
//! `anim-runtime` 的参考宿主：内存场景图、延迟事件总线、模拟时钟，
//! 以及按帧驱动动画组件的 `World`。
//!
//! ## 模块结构
//!
//! - [`scene`]：实体、变换、组件属性（属性反射 / schema 查询）
//! - [`events`]：延迟分发的事件总线
//! - [`clock`]：模拟时钟与单次计时器
//! - [`world`]：组件管理与每帧流程
//! - [`scene_file`]：JSON 场景描述
//! - [`runner`]：按帧运行场景文件
//! - [`config`]：宿主配置

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod runner;
pub mod scene;
pub mod scene_file;
pub mod transform;
pub mod world;

pub use clock::SimClock;
pub use config::{ConfigError, HostConfig};
pub use error::{HostError, HostResult};
pub use events::EventBus;
pub use runner::{RunReport, SceneRunner};
pub use scene::{EntitySnapshot, Scene};
pub use scene_file::{AnimationSpec, EntitySpec, PropertySpec, SceneFile, ScriptAction, ScriptStep};
pub use transform::Transform;
pub use world::{NotificationRecord, World};
